//! Test-only scenarios for `itinera-solver-dfs`.
//!
//! The helpers build small in-memory trips between Shanghai and Suzhou for
//! unit tests, behaviour tests, doctests and benchmarks.

use itinera_core::test_support::{FnEvaluator, MemoryEnvironment};
use itinera_core::{
    Accommodation, ActivityKind, Attraction, ClockTime, IntercityMode, IntercityTransport,
    Itinerary, Query, Restaurant,
};

/// Departure city of every scenario.
pub const START_CITY: &str = "Shanghai";
/// Destination city of every scenario.
pub const TARGET_CITY: &str = "Suzhou";
/// Hotel offered by [`multi_day_environment`].
pub const HOTEL: &str = "Pingjiang Lodge";

/// A train between the two scenario stations.
///
/// # Examples
/// ```rust
/// use itinera_core::ClockTime;
/// use itinera_solver_dfs::test_support::train;
///
/// let outbound = train("G7001", true, ClockTime::hm(8, 0), ClockTime::hm(9, 0), 100);
/// assert_eq!(outbound.to, "Suzhou Station");
/// ```
#[must_use]
pub fn train(
    id: &str,
    outbound: bool,
    depart: ClockTime,
    arrive: ClockTime,
    cost: u32,
) -> IntercityTransport {
    let (from, to) = if outbound {
        ("Shanghai Station", "Suzhou Station")
    } else {
        ("Suzhou Station", "Shanghai Station")
    };
    IntercityTransport {
        id: id.to_owned(),
        mode: IntercityMode::Train,
        from: from.to_owned(),
        to: to.to_owned(),
        depart,
        arrive,
        cost,
    }
}

/// A restaurant open from `open` to `close`.
#[must_use]
pub fn restaurant(
    name: &str,
    cuisine: &str,
    price: u32,
    open: ClockTime,
    close: ClockTime,
) -> Restaurant {
    Restaurant {
        name: name.to_owned(),
        cuisine: cuisine.to_owned(),
        price,
        open,
        close,
        location: None,
    }
}

/// An attraction open from 09:00 to 18:00.
#[must_use]
pub fn attraction(name: &str, spot_type: &str, price: u32, visit_minutes: u32) -> Attraction {
    Attraction {
        name: name.to_owned(),
        spot_type: spot_type.to_owned(),
        price,
        open: ClockTime::hm(9, 0),
        close: ClockTime::hm(18, 0),
        recommended_visit_minutes: visit_minutes,
        location: None,
    }
}

fn with_journeys(
    environment: MemoryEnvironment,
    go: IntercityTransport,
    back: IntercityTransport,
) -> MemoryEnvironment {
    environment
        .with_intercity(START_CITY, TARGET_CITY, go)
        .with_intercity(TARGET_CITY, START_CITY, back)
}

/// A day trip: one train each way, one restaurant and one garden.
///
/// The outbound train arrives at 10:00 and the return leaves at 20:00, each
/// costing 100 per person. The garden opens from 10:00 to 18:00.
#[must_use]
pub fn single_day_environment() -> MemoryEnvironment {
    with_journeys(
        MemoryEnvironment::default(),
        train("G7001", true, ClockTime::hm(8, 0), ClockTime::hm(10, 0), 100),
        train("G7010", false, ClockTime::hm(20, 0), ClockTime::hm(22, 0), 100),
    )
    .with_restaurant(
        TARGET_CITY,
        restaurant(
            "Canal Kitchen",
            "jiangsu",
            50,
            ClockTime::hm(11, 0),
            ClockTime::hm(14, 0),
        ),
    )
    .with_attraction(
        TARGET_CITY,
        Attraction {
            open: ClockTime::hm(10, 0),
            ..attraction("Lion Grove", "garden", 30, 120)
        },
    )
}

/// A two-day trip with one hotel and six three-hour attractions, at most
/// three of which fit in a day. No restaurants are offered.
#[must_use]
pub fn multi_day_environment() -> MemoryEnvironment {
    let sights = [
        ("Humble Administrator's Garden", "garden", 70),
        ("Lingering Garden", "garden", 55),
        ("Tiger Hill", "hill", 60),
        ("Suzhou Museum", "museum", 0),
        ("Pingjiang Road", "street", 0),
        ("Hanshan Temple", "temple", 20),
    ];
    let environment = with_journeys(
        MemoryEnvironment::default(),
        train("G7001", true, ClockTime::hm(8, 0), ClockTime::hm(9, 0), 100),
        train("G7020", false, ClockTime::hm(19, 0), ClockTime::hm(20, 0), 100),
    )
    .with_accommodation(
        TARGET_CITY,
        Accommodation {
            name: HOTEL.to_owned(),
            price: 300,
            beds_per_room: 2,
            location: None,
        },
    );
    sights
        .into_iter()
        .fold(environment, |environment, (name, spot_type, price)| {
            environment.with_attraction(TARGET_CITY, attraction(name, spot_type, price, 180))
        })
}

/// A query between the scenario cities.
#[must_use]
pub fn scenario_query(uid: &str, people: u32, days: u32) -> Query {
    Query::new(uid, START_CITY, TARGET_CITY, people, days)
}

/// Whether `plan` has the shape of a finished trip for `query`.
///
/// Checks the day count, that the trip opens and closes with intercity
/// journeys, that every night but the last ends at a hotel, and that no
/// activity starts before the previous one ended.
#[must_use]
pub fn is_well_formed(query: &Query, plan: &Itinerary) -> bool {
    let days_match = u32::try_from(plan.days.len()).is_ok_and(|days| days == query.days);
    let opens = plan
        .days
        .first()
        .and_then(|day| day.activities.first())
        .is_some_and(|activity| activity.kind.is_intercity());
    let closes = plan
        .days
        .last()
        .and_then(|day| day.last())
        .is_some_and(|activity| activity.kind.is_intercity());
    let nights = plan.days.iter().rev().skip(1).all(|day| {
        day.last()
            .is_some_and(|activity| matches!(activity.kind, ActivityKind::Accommodation { .. }))
    });
    let ordered = plan.days.iter().all(|day| {
        day.activities
            .iter()
            .zip(day.activities.iter().skip(1))
            .all(|(earlier, later)| later.start_time >= earlier.end_time)
    });
    days_match && opens && closes && nights && ordered
}

/// An evaluator accepting well-formed trips and passing every logical
/// constraint.
#[must_use]
pub fn structural_evaluator() -> FnEvaluator {
    FnEvaluator::new(is_well_formed, |query, _| {
        vec![true; query.logical_constraints.len()]
    })
}
