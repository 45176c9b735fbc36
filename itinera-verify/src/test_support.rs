//! Hand-built itineraries for evaluator tests.

use itinera_core::{
    Activity, ActivityKind, ClockTime, InnercityMode, InnercitySegment, IntercityMode,
    IntercityTransport, Itinerary,
};

fn train(id: &str, from: &str, to: &str, depart: ClockTime, arrive: ClockTime) -> IntercityTransport {
    IntercityTransport {
        id: id.to_owned(),
        mode: IntercityMode::Train,
        from: from.to_owned(),
        to: to.to_owned(),
        depart,
        arrive,
        cost: 100,
    }
}

/// A taxi leg between two named places, priced for `people`.
#[must_use]
pub fn taxi(from: &str, to: &str, start: ClockTime, people: u32) -> InnercitySegment {
    InnercitySegment {
        mode: InnercityMode::Taxi,
        start: from.to_owned(),
        end: to.to_owned(),
        start_time: start,
        end_time: start.add_minutes(20),
        price: 20,
        cost: 20,
        tickets: None,
        cars: None,
    }
    .for_party(people)
}

fn visit(
    kind: ActivityKind,
    position: &str,
    start: ClockTime,
    end: ClockTime,
    price: u32,
    people: u32,
) -> Activity {
    Activity {
        kind,
        position: position.to_owned(),
        start_time: start,
        end_time: end,
        price,
        cost: price.saturating_mul(people),
        transports: Vec::new(),
    }
}

/// A valid Shanghai to Suzhou day trip.
///
/// Train out at 08:00, lunch at Canal Kitchen from 11:00, Lion Grove from
/// 12:20 and the 20:00 train home, joined by taxis.
#[must_use]
pub fn day_trip(people: u32) -> Itinerary {
    let mut plan = Itinerary::new(people, "Shanghai", "Suzhou", 1);
    let go = Activity::intercity(
        &train(
            "G7001",
            "Shanghai Station",
            "Suzhou Station",
            ClockTime::hm(8, 0),
            ClockTime::hm(10, 0),
        ),
        people,
    );
    let lunch = visit(
        ActivityKind::Lunch {
            cuisine: "jiangsu".to_owned(),
        },
        "Canal Kitchen",
        ClockTime::hm(11, 0),
        ClockTime::hm(12, 0),
        50,
        people,
    )
    .with_transports(vec![taxi(
        "Suzhou Station",
        "Canal Kitchen",
        ClockTime::hm(10, 0),
        people,
    )]);
    let garden = visit(
        ActivityKind::Attraction {
            spot_type: "garden".to_owned(),
            tickets: people,
        },
        "Lion Grove",
        ClockTime::hm(12, 20),
        ClockTime::hm(14, 20),
        30,
        people,
    )
    .with_transports(vec![taxi(
        "Canal Kitchen",
        "Lion Grove",
        ClockTime::hm(12, 0),
        people,
    )]);
    let back = Activity::intercity(
        &train(
            "G7010",
            "Suzhou Station",
            "Shanghai Station",
            ClockTime::hm(20, 0),
            ClockTime::hm(22, 0),
        ),
        people,
    )
    .with_transports(vec![taxi(
        "Lion Grove",
        "Suzhou Station",
        ClockTime::hm(14, 20),
        people,
    )]);
    if let Some(day) = plan.days.first_mut() {
        day.activities.extend([go, lunch, garden, back]);
    }
    plan
}

/// A valid two-day trip with a night at Pingjiang Lodge in twin rooms.
#[must_use]
pub fn weekend_trip(people: u32) -> Itinerary {
    let mut plan = Itinerary::new(people, "Shanghai", "Suzhou", 2);
    let go = Activity::intercity(
        &train(
            "G7001",
            "Shanghai Station",
            "Suzhou Station",
            ClockTime::hm(8, 0),
            ClockTime::hm(9, 0),
        ),
        people,
    );
    let museum = visit(
        ActivityKind::Attraction {
            spot_type: "museum".to_owned(),
            tickets: people,
        },
        "Suzhou Museum",
        ClockTime::hm(9, 20),
        ClockTime::hm(12, 20),
        0,
        people,
    )
    .with_transports(vec![taxi(
        "Suzhou Station",
        "Suzhou Museum",
        ClockTime::hm(9, 0),
        people,
    )]);
    let rooms = people.div_ceil(2);
    let hotel = visit(
        ActivityKind::Accommodation {
            room_type: 2,
            rooms,
        },
        "Pingjiang Lodge",
        ClockTime::hm(12, 40),
        ClockTime::END_OF_DAY,
        300,
        rooms,
    )
    .with_transports(vec![taxi(
        "Suzhou Museum",
        "Pingjiang Lodge",
        ClockTime::hm(12, 20),
        people,
    )]);
    let breakfast = visit(
        ActivityKind::Breakfast,
        "Pingjiang Lodge",
        ClockTime::hm(8, 0),
        ClockTime::hm(8, 30),
        0,
        people,
    );
    let hill = visit(
        ActivityKind::Attraction {
            spot_type: "hill".to_owned(),
            tickets: people,
        },
        "Tiger Hill",
        ClockTime::hm(9, 0),
        ClockTime::hm(12, 0),
        60,
        people,
    )
    .with_transports(vec![taxi(
        "Pingjiang Lodge",
        "Tiger Hill",
        ClockTime::hm(8, 30),
        people,
    )]);
    let back = Activity::intercity(
        &train(
            "G7020",
            "Suzhou Station",
            "Shanghai Station",
            ClockTime::hm(19, 0),
            ClockTime::hm(20, 0),
        ),
        people,
    )
    .with_transports(vec![taxi(
        "Tiger Hill",
        "Suzhou Station",
        ClockTime::hm(12, 0),
        people,
    )]);
    if let [first, second] = plan.days.as_mut_slice() {
        first.activities.extend([go, museum, hotel]);
        second.activities.extend([breakfast, hill, back]);
    }
    plan
}
