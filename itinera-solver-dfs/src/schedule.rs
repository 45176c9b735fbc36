//! Turning a reached POI into a scheduled [`Activity`].
//!
//! These functions encode opening hours, meal service windows and the late
//! admission cutoff. A failure means the candidate is skipped, never that
//! the search stops.

use itinera_core::{
    Accommodation, Activity, ActivityError, ActivityKind, Attraction, ClockTime, InnercitySegment,
    MealKind, Restaurant,
};
use thiserror::Error;

use crate::DfsPlannerConfig;

/// Reasons a reached POI cannot be added to the day.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddActivityError {
    /// The POI closes before or when the party arrives.
    #[error("{name} is closed on arrival at {arrival}")]
    Closed {
        /// POI name.
        name: String,
        /// Arrival time.
        arrival: ClockTime,
    },
    /// The meal cannot start inside its service window.
    #[error("{} at {name} cannot start by the end of service", .meal.as_str())]
    OutsideServiceWindow {
        /// Restaurant name.
        name: String,
        /// Meal being scheduled.
        meal: MealKind,
    },
    /// The attraction is reached after the last admission.
    #[error("{name} is reached at {arrival}, after the last admission")]
    PastAdmission {
        /// Attraction name.
        name: String,
        /// Arrival time.
        arrival: ClockTime,
    },
    /// Restaurants do not serve this meal.
    #[error("restaurants do not serve {}", .meal.as_str())]
    NotServed {
        /// Meal requested.
        meal: MealKind,
    },
    /// The computed times were inconsistent.
    #[error(transparent)]
    Invalid(#[from] ActivityError),
}

/// Schedule `meal` at `restaurant` for a party arriving at `arrival`.
///
/// The meal starts at the later of arrival, opening and the start of the
/// service window, must start before the window ends, and lasts
/// [`DfsPlannerConfig::meal_minutes`] or until closing.
///
/// # Examples
/// ```
/// use itinera_core::{ClockTime, MealKind, Restaurant};
/// use itinera_solver_dfs::{DfsPlannerConfig, schedule_restaurant};
///
/// let restaurant = Restaurant::new(
///     "Noodle House",
///     "noodles",
///     40,
///     ClockTime::hm(10, 0),
///     ClockTime::hm(14, 0),
/// )
/// .unwrap();
/// let lunch = schedule_restaurant(
///     &DfsPlannerConfig::default(),
///     &restaurant,
///     MealKind::Lunch,
///     ClockTime::hm(10, 20),
///     2,
///     Vec::new(),
/// )
/// .unwrap();
/// assert_eq!(lunch.start_time, ClockTime::hm(11, 0));
/// assert_eq!(lunch.end_time, ClockTime::hm(12, 0));
/// assert_eq!(lunch.cost, 80);
/// ```
pub fn schedule_restaurant(
    config: &DfsPlannerConfig,
    restaurant: &Restaurant,
    meal: MealKind,
    arrival: ClockTime,
    people: u32,
    transports: Vec<InnercitySegment>,
) -> Result<Activity, AddActivityError> {
    let window = match meal {
        MealKind::Lunch => config.lunch,
        MealKind::Dinner => config.dinner,
        MealKind::Breakfast => return Err(AddActivityError::NotServed { meal }),
    };
    if restaurant.close <= arrival {
        return Err(AddActivityError::Closed {
            name: restaurant.name.clone(),
            arrival,
        });
    }
    let start = arrival.max(restaurant.open).max(window.earliest);
    if restaurant.close <= window.earliest || start >= window.latest {
        return Err(AddActivityError::OutsideServiceWindow {
            name: restaurant.name.clone(),
            meal,
        });
    }
    let end = start
        .add_minutes(config.meal_minutes)
        .min(restaurant.close);
    let activity = Activity::new(
        ActivityKind::meal(meal, restaurant.cuisine.clone()),
        restaurant.name.clone(),
        start,
        end,
        restaurant.price,
        restaurant.price.saturating_mul(people),
    )?;
    Ok(activity.with_transports(transports))
}

/// Start time of a visit to `attraction` for a party arriving at `arrival`.
pub fn attraction_start(
    config: &DfsPlannerConfig,
    attraction: &Attraction,
    arrival: ClockTime,
) -> Result<ClockTime, AddActivityError> {
    if arrival >= config.attraction_arrival_cutoff {
        return Err(AddActivityError::PastAdmission {
            name: attraction.name.clone(),
            arrival,
        });
    }
    if attraction.close <= arrival {
        return Err(AddActivityError::Closed {
            name: attraction.name.clone(),
            arrival,
        });
    }
    Ok(arrival.max(attraction.open))
}

/// Schedule a visit of `visit_minutes` starting at `start`, cut short at
/// closing time.
pub fn schedule_attraction(
    attraction: &Attraction,
    start: ClockTime,
    visit_minutes: u32,
    people: u32,
    transports: Vec<InnercitySegment>,
) -> Result<Activity, AddActivityError> {
    let end = start.add_minutes(visit_minutes).min(attraction.close);
    let activity = Activity::new(
        ActivityKind::Attraction {
            spot_type: attraction.spot_type.clone(),
            tickets: people,
        },
        attraction.name.clone(),
        start,
        end,
        attraction.price,
        attraction.price.saturating_mul(people),
    )?;
    Ok(activity.with_transports(transports))
}

/// Check in to `hotel` at `arrival` for the rest of the night.
#[must_use]
pub fn schedule_accommodation(
    hotel: &Accommodation,
    arrival: ClockTime,
    rooms: u32,
    transports: Vec<InnercitySegment>,
) -> Activity {
    Activity {
        kind: ActivityKind::Accommodation {
            room_type: hotel.beds_per_room,
            rooms,
        },
        position: hotel.name.clone(),
        start_time: arrival,
        end_time: ClockTime::END_OF_DAY,
        price: hotel.price,
        cost: hotel.price.saturating_mul(rooms),
        transports,
    }
}

/// Free breakfast at the hotel the party woke up in.
#[must_use]
pub fn schedule_breakfast(config: &DfsPlannerConfig, hotel: &str) -> Activity {
    Activity {
        kind: ActivityKind::Breakfast,
        position: hotel.to_owned(),
        start_time: config.breakfast_start,
        end_time: config.breakfast_start.add_minutes(config.breakfast_minutes),
        price: 0,
        cost: 0,
        transports: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn config() -> DfsPlannerConfig {
        DfsPlannerConfig::default()
    }

    #[expect(clippy::expect_used, reason = "fixture data is valid")]
    fn restaurant(open: ClockTime, close: ClockTime) -> Restaurant {
        Restaurant::new("Canal Kitchen", "jiangsu", 50, open, close).expect("valid restaurant")
    }

    #[expect(clippy::expect_used, reason = "fixture data is valid")]
    fn garden() -> Attraction {
        Attraction::new(
            "Lion Grove",
            "garden",
            30,
            ClockTime::hm(9, 0),
            ClockTime::hm(17, 0),
            120,
        )
        .expect("valid attraction")
    }

    #[rstest]
    #[case(MealKind::Lunch, ClockTime::hm(9, 0), ClockTime::hm(11, 0))]
    #[case(MealKind::Lunch, ClockTime::hm(12, 15), ClockTime::hm(12, 15))]
    #[case(MealKind::Dinner, ClockTime::hm(15, 0), ClockTime::hm(17, 0))]
    #[case(MealKind::Dinner, ClockTime::hm(19, 30), ClockTime::hm(19, 30))]
    fn meals_wait_for_service(
        config: DfsPlannerConfig,
        #[case] meal: MealKind,
        #[case] arrival: ClockTime,
        #[case] expected_start: ClockTime,
    ) {
        let venue = restaurant(ClockTime::hm(8, 0), ClockTime::hm(22, 0));
        let activity = schedule_restaurant(&config, &venue, meal, arrival, 3, Vec::new());
        assert_eq!(activity.map(|a| a.start_time), Ok(expected_start));
    }

    #[rstest]
    #[case(MealKind::Lunch, ClockTime::hm(13, 0))]
    #[case(MealKind::Dinner, ClockTime::hm(20, 0))]
    fn meals_miss_the_end_of_service(
        config: DfsPlannerConfig,
        #[case] meal: MealKind,
        #[case] arrival: ClockTime,
    ) {
        let venue = restaurant(ClockTime::hm(8, 0), ClockTime::hm(22, 0));
        let result = schedule_restaurant(&config, &venue, meal, arrival, 1, Vec::new());
        assert!(matches!(
            result,
            Err(AddActivityError::OutsideServiceWindow { .. })
        ));
    }

    #[rstest]
    fn places_closing_before_lunch_are_skipped(config: DfsPlannerConfig) {
        let venue = restaurant(ClockTime::hm(6, 0), ClockTime::hm(10, 30));
        let result =
            schedule_restaurant(&config, &venue, MealKind::Lunch, ClockTime::hm(7, 0), 1, Vec::new());
        assert!(matches!(
            result,
            Err(AddActivityError::OutsideServiceWindow { .. })
        ));
    }

    #[rstest]
    fn meals_end_at_closing(config: DfsPlannerConfig) {
        let venue = restaurant(ClockTime::hm(11, 0), ClockTime::hm(11, 40));
        let lunch =
            schedule_restaurant(&config, &venue, MealKind::Lunch, ClockTime::hm(11, 0), 2, Vec::new());
        assert_eq!(lunch.map(|a| (a.end_time, a.cost)), Ok((ClockTime::hm(11, 40), 100)));
    }

    #[rstest]
    fn closed_restaurants_are_rejected(config: DfsPlannerConfig) {
        let venue = restaurant(ClockTime::hm(11, 0), ClockTime::hm(14, 0));
        let result =
            schedule_restaurant(&config, &venue, MealKind::Lunch, ClockTime::hm(14, 0), 1, Vec::new());
        assert!(matches!(result, Err(AddActivityError::Closed { .. })));
    }

    #[rstest]
    fn restaurants_do_not_serve_breakfast(config: DfsPlannerConfig) {
        let venue = restaurant(ClockTime::hm(6, 0), ClockTime::hm(22, 0));
        let result = schedule_restaurant(
            &config,
            &venue,
            MealKind::Breakfast,
            ClockTime::hm(7, 0),
            1,
            Vec::new(),
        );
        assert_eq!(
            result,
            Err(AddActivityError::NotServed {
                meal: MealKind::Breakfast
            })
        );
    }

    #[rstest]
    #[case(ClockTime::hm(8, 0), Ok(ClockTime::hm(9, 0)))]
    #[case(ClockTime::hm(10, 0), Ok(ClockTime::hm(10, 0)))]
    fn visits_start_at_opening(
        config: DfsPlannerConfig,
        #[case] arrival: ClockTime,
        #[case] expected: Result<ClockTime, AddActivityError>,
    ) {
        assert_eq!(attraction_start(&config, &garden(), arrival), expected);
    }

    #[rstest]
    fn late_arrivals_are_turned_away(config: DfsPlannerConfig) {
        assert!(matches!(
            attraction_start(&config, &garden(), ClockTime::hm(17, 0)),
            Err(AddActivityError::Closed { .. })
        ));
        let mut night_market = garden();
        night_market.close = ClockTime::END_OF_DAY;
        assert!(matches!(
            attraction_start(&config, &night_market, ClockTime::hm(21, 0)),
            Err(AddActivityError::PastAdmission { .. })
        ));
    }

    #[rstest]
    fn visits_are_cut_at_closing() {
        let visit = schedule_attraction(&garden(), ClockTime::hm(16, 0), 120, 2, Vec::new());
        assert_eq!(
            visit.map(|a| (a.end_time, a.cost)),
            Ok((ClockTime::hm(17, 0), 60))
        );
    }

    #[rstest]
    fn hotel_stays_last_until_midnight() {
        #[expect(clippy::expect_used, reason = "fixture data is valid")]
        let hotel = Accommodation::new("Pingjiang Lodge", 300, 2).expect("valid hotel");
        let stay = schedule_accommodation(&hotel, ClockTime::hm(20, 30), 2, Vec::new());
        assert_eq!(stay.end_time, ClockTime::END_OF_DAY);
        assert_eq!(stay.cost, 600);
        assert_eq!(
            stay.kind,
            ActivityKind::Accommodation {
                room_type: 2,
                rooms: 2
            }
        );
    }

    #[rstest]
    fn breakfast_is_free(config: DfsPlannerConfig) {
        let breakfast = schedule_breakfast(&config, "Pingjiang Lodge");
        assert_eq!(breakfast.start_time, ClockTime::hm(8, 0));
        assert_eq!(breakfast.end_time, ClockTime::hm(8, 30));
        assert_eq!(breakfast.cost, 0);
    }
}
