//! Structural sanity checks for complete itineraries.

use std::collections::HashSet;
use std::fmt;

use itinera_core::{
    Activity, ActivityKind, ClockTime, CommonsenseRule, InnercityMode, Itinerary, MealKind, Query,
};

/// A broken commonsense rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The rule that failed.
    pub rule: CommonsenseRule,
    /// What was wrong.
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.rule, self.detail)
    }
}

/// Check `plan` against one rule.
///
/// # Errors
/// Returns the first [`Violation`] of `rule` found in `plan`.
pub fn check_rule(rule: CommonsenseRule, query: &Query, plan: &Itinerary) -> Result<(), Violation> {
    let outcome = match rule {
        CommonsenseRule::DayCount => day_count(query, plan),
        CommonsenseRule::IntercityEndpoints => intercity_endpoints(query, plan),
        CommonsenseRule::TimeOrder => time_order(plan),
        CommonsenseRule::TransferTiming => transfer_timing(plan),
        CommonsenseRule::MealsOncePerDay => meals_once_per_day(plan),
        CommonsenseRule::DistinctVisits => distinct_visits(plan),
        CommonsenseRule::NightlyAccommodation => nightly_accommodation(plan),
        CommonsenseRule::RoomCapacity => room_capacity(query, plan),
        CommonsenseRule::PartyCounts => party_counts(query, plan),
    };
    outcome.map_err(|detail| Violation { rule, detail })
}

fn day_count(query: &Query, plan: &Itinerary) -> Result<(), String> {
    let days = u32::try_from(plan.days.len()).unwrap_or(u32::MAX);
    if days != query.days {
        return Err(format!("{days} day plans for a {}-day trip", query.days));
    }
    for (expected, day) in (1_u32..).zip(&plan.days) {
        if day.day != expected {
            return Err(format!("day {} planned in position {expected}", day.day));
        }
    }
    Ok(())
}

fn intercity_endpoints(query: &Query, plan: &Itinerary) -> Result<(), String> {
    if plan.start_city != query.start_city || plan.target_city != query.target_city {
        return Err(format!(
            "plan runs {} -> {} instead of {} -> {}",
            plan.start_city, plan.target_city, query.start_city, query.target_city
        ));
    }
    let activities: Vec<&Activity> = plan.activities().collect();
    if !activities.first().is_some_and(|first| first.kind.is_intercity()) {
        return Err("the trip does not open with an intercity journey".to_owned());
    }
    if !activities.last().is_some_and(|last| last.kind.is_intercity()) {
        return Err("the trip does not close with an intercity journey".to_owned());
    }
    let journeys = activities
        .iter()
        .filter(|activity| activity.kind.is_intercity())
        .count();
    if journeys != 2 {
        return Err(format!("{journeys} intercity journeys instead of 2"));
    }
    Ok(())
}

fn time_order(plan: &Itinerary) -> Result<(), String> {
    for day in &plan.days {
        if let Some(activity) = day
            .activities
            .iter()
            .find(|activity| activity.end_time < activity.start_time)
        {
            return Err(format!(
                "day {}: {} ends at {} before starting at {}",
                day.day, activity.position, activity.end_time, activity.start_time
            ));
        }
        for (earlier, later) in day.activities.iter().zip(day.activities.iter().skip(1)) {
            if later.start_time < earlier.end_time {
                return Err(format!(
                    "day {}: {} starts at {} before {} ends at {}",
                    day.day, later.position, later.start_time, earlier.position, earlier.end_time
                ));
            }
        }
    }
    Ok(())
}

fn transfer_timing(plan: &Itinerary) -> Result<(), String> {
    for day in &plan.days {
        let mut previous_end = None;
        for activity in &day.activities {
            let mut cursor: ClockTime = previous_end.unwrap_or(ClockTime::MIDNIGHT);
            for leg in &activity.transports {
                if leg.start_time < cursor || leg.end_time < leg.start_time {
                    return Err(format!(
                        "day {}: {} leg {} -> {} runs {}-{} out of sequence",
                        day.day, leg.mode, leg.start, leg.end, leg.start_time, leg.end_time
                    ));
                }
                cursor = leg.end_time;
            }
            if cursor > activity.start_time && !activity.transports.is_empty() {
                return Err(format!(
                    "day {}: arrives at {} at {} after it starts at {}",
                    day.day, activity.position, cursor, activity.start_time
                ));
            }
            previous_end = Some(activity.end_time);
        }
    }
    Ok(())
}

fn meals_once_per_day(plan: &Itinerary) -> Result<(), String> {
    for day in &plan.days {
        let mut seen: HashSet<MealKind> = HashSet::new();
        for meal in day
            .activities
            .iter()
            .filter_map(|activity| activity.kind.meal_kind())
        {
            if !seen.insert(meal) {
                return Err(format!("day {}: {} served twice", day.day, meal.as_str()));
            }
        }
    }
    Ok(())
}

fn distinct_visits(plan: &Itinerary) -> Result<(), String> {
    let mut attractions = HashSet::new();
    let mut restaurants = HashSet::new();
    for activity in plan.activities() {
        let seen = match activity.kind {
            ActivityKind::Attraction { .. } => &mut attractions,
            ActivityKind::Lunch { .. } | ActivityKind::Dinner { .. } => &mut restaurants,
            _ => continue,
        };
        if !seen.insert(activity.position.as_str()) {
            return Err(format!("{} visited twice", activity.position));
        }
    }
    Ok(())
}

fn nightly_accommodation(plan: &Itinerary) -> Result<(), String> {
    let nights = plan.days.len().saturating_sub(1);
    for day in plan.days.iter().take(nights) {
        let sleeps = day
            .last()
            .is_some_and(|activity| matches!(activity.kind, ActivityKind::Accommodation { .. }));
        if !sleeps {
            return Err(format!("day {} does not end at a hotel", day.day));
        }
    }
    Ok(())
}

fn room_capacity(query: &Query, plan: &Itinerary) -> Result<(), String> {
    let requested_both = query.room_type.is_some() && query.room_count.is_some();
    for activity in plan.activities() {
        let ActivityKind::Accommodation { room_type, rooms } = activity.kind else {
            continue;
        };
        if let Some(wanted) = query.room_type
            && wanted != room_type
        {
            return Err(format!(
                "{} booked with {room_type}-bed rooms, {wanted}-bed requested",
                activity.position
            ));
        }
        if let Some(wanted) = query.room_count
            && wanted != rooms
        {
            return Err(format!(
                "{} booked with {rooms} rooms, {wanted} requested",
                activity.position
            ));
        }
        let beds = rooms.saturating_mul(u32::from(room_type));
        if !requested_both && beds < plan.people {
            return Err(format!(
                "{} sleeps {beds} of {} travellers",
                activity.position, plan.people
            ));
        }
    }
    Ok(())
}

fn party_counts(query: &Query, plan: &Itinerary) -> Result<(), String> {
    let people = query.people;
    let cars = people.div_ceil(InnercityMode::TAXI_SEATS);
    for activity in plan.activities() {
        let tickets = match &activity.kind {
            ActivityKind::Train { tickets, .. }
            | ActivityKind::Airplane { tickets, .. }
            | ActivityKind::Attraction { tickets, .. } => Some(*tickets),
            _ => None,
        };
        if let Some(tickets) = tickets
            && tickets != people
        {
            return Err(format!(
                "{} has {tickets} tickets for {people} travellers",
                activity.position
            ));
        }
        for leg in &activity.transports {
            let covered = match leg.mode {
                InnercityMode::Walk => true,
                InnercityMode::Metro => leg.tickets == Some(people),
                InnercityMode::Taxi => leg.cars == Some(cars),
            };
            if !covered {
                return Err(format!(
                    "{} leg {} -> {} does not cover {people} travellers",
                    leg.mode, leg.start, leg.end
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{day_trip, weekend_trip};
    use rstest::rstest;

    fn violations(query: &Query, plan: &Itinerary) -> Vec<CommonsenseRule> {
        CommonsenseRule::ALL
            .into_iter()
            .filter(|rule| check_rule(*rule, query, plan).is_err())
            .collect()
    }

    fn edit(plan: &mut Itinerary, day: usize, index: usize) -> &mut Activity {
        plan.days
            .get_mut(day)
            .and_then(|day_plan| day_plan.activities.get_mut(index))
            .expect("activity exists")
    }

    #[rstest]
    #[case(day_trip(2), Query::new("q", "Shanghai", "Suzhou", 2, 1))]
    #[case(weekend_trip(3), Query::new("q", "Shanghai", "Suzhou", 3, 2))]
    #[case(weekend_trip(5), Query::new("q", "Shanghai", "Suzhou", 5, 2))]
    fn hand_built_trips_pass_every_rule(#[case] plan: Itinerary, #[case] query: Query) {
        assert_eq!(violations(&query, &plan), Vec::new());
    }

    #[rstest]
    fn wrong_length_breaks_day_count() {
        let query = Query::new("q", "Shanghai", "Suzhou", 2, 2);
        assert!(violations(&query, &day_trip(2)).contains(&CommonsenseRule::DayCount));
    }

    #[rstest]
    fn missing_return_breaks_endpoints() {
        let query = Query::new("q", "Shanghai", "Suzhou", 2, 1);
        let mut plan = day_trip(2);
        if let Some(day) = plan.days.first_mut() {
            day.activities.pop();
        }
        let err = check_rule(CommonsenseRule::IntercityEndpoints, &query, &plan)
            .expect_err("no return journey");
        assert!(err.detail.contains("close"), "{err}");
    }

    #[rstest]
    fn overlapping_visits_break_time_order() {
        let query = Query::new("q", "Shanghai", "Suzhou", 2, 1);
        let mut plan = day_trip(2);
        edit(&mut plan, 0, 2).start_time = ClockTime::hm(11, 30);
        let found = violations(&query, &plan);
        assert!(found.contains(&CommonsenseRule::TimeOrder));
        assert!(found.contains(&CommonsenseRule::TransferTiming));
    }

    #[rstest]
    fn late_arrival_breaks_transfer_timing() {
        let query = Query::new("q", "Shanghai", "Suzhou", 2, 1);
        let mut plan = day_trip(2);
        edit(&mut plan, 0, 1).start_time = ClockTime::hm(10, 10);
        assert_eq!(violations(&query, &plan), vec![CommonsenseRule::TransferTiming]);
    }

    #[rstest]
    fn second_lunch_breaks_meals_and_visits() {
        let query = Query::new("q", "Shanghai", "Suzhou", 2, 1);
        let mut plan = day_trip(2);
        let lunch = edit(&mut plan, 0, 1).clone();
        if let Some(day) = plan.days.first_mut() {
            day.activities.insert(2, lunch);
        }
        let found = violations(&query, &plan);
        assert!(found.contains(&CommonsenseRule::MealsOncePerDay));
        assert!(found.contains(&CommonsenseRule::DistinctVisits));
    }

    #[rstest]
    fn sleeping_on_the_street_breaks_nightly_accommodation() {
        let query = Query::new("q", "Shanghai", "Suzhou", 2, 2);
        let mut plan = weekend_trip(2);
        if let Some(day) = plan.days.first_mut() {
            day.activities.pop();
        }
        assert_eq!(
            violations(&query, &plan),
            vec![CommonsenseRule::NightlyAccommodation]
        );
    }

    #[rstest]
    #[case(Query::new("q", "Shanghai", "Suzhou", 4, 2), true)]
    #[case(Query::new("q", "Shanghai", "Suzhou", 4, 2).with_rooms(Some(3), None), true)]
    #[case(Query::new("q", "Shanghai", "Suzhou", 4, 2).with_rooms(Some(2), Some(1)), false)]
    fn undersized_rooms_break_capacity(#[case] query: Query, #[case] broken: bool) {
        let mut plan = weekend_trip(4);
        edit(&mut plan, 0, 2).kind = ActivityKind::Accommodation {
            room_type: 2,
            rooms: 1,
        };
        let result = check_rule(CommonsenseRule::RoomCapacity, &query, &plan);
        assert_eq!(result.is_err(), broken, "{result:?}");
    }

    #[rstest]
    fn short_ticketing_breaks_party_counts() {
        let query = Query::new("q", "Shanghai", "Suzhou", 3, 1);
        let plan = day_trip(2);
        let err =
            check_rule(CommonsenseRule::PartyCounts, &query, &plan).expect_err("too few tickets");
        assert_eq!(err.rule, CommonsenseRule::PartyCounts);
        assert!(err.to_string().starts_with("PartyCounts: "));
    }
}
