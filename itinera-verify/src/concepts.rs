//! Concepts: named facts extracted from an itinerary.
//!
//! Logical constraints and preference objectives are expressions over these
//! names, for example `total_cost <= 2000` or
//! `{'museum'} <= attraction_types`.

use std::collections::BTreeMap;

use itinera_core::{Activity, ActivityKind, Itinerary};

use crate::Value;

/// Every concept [`Concepts::extract`] defines, in alphabetical order.
pub const CONCEPT_NAMES: [&str; 22] = [
    "accommodation_cost",
    "accommodation_names",
    "activity_count",
    "attraction_cost",
    "attraction_count",
    "attraction_names",
    "attraction_types",
    "days",
    "food_cost",
    "food_types",
    "innercity_cost",
    "innercity_transport",
    "intercity_cost",
    "intercity_transport",
    "people_number",
    "restaurant_count",
    "restaurant_names",
    "room_count",
    "room_type",
    "start_city",
    "target_city",
    "total_cost",
];

/// Named values describing one itinerary.
///
/// # Examples
/// ```
/// use itinera_core::Itinerary;
/// use itinera_verify::{Concepts, Value};
///
/// let concepts = Concepts::extract(&Itinerary::new(2, "Shanghai", "Suzhou", 3));
/// assert_eq!(concepts.get("days"), Some(&Value::from(3_u32)));
/// assert_eq!(concepts.get("total_cost"), Some(&Value::from(0_u32)));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Concepts {
    values: BTreeMap<String, Value>,
}

impl Concepts {
    /// Extract every concept in [`CONCEPT_NAMES`] from `plan`.
    #[must_use]
    pub fn extract(plan: &Itinerary) -> Self {
        let activities: Vec<&Activity> = plan.activities().collect();
        let attractions: Vec<&Activity> = activities
            .iter()
            .copied()
            .filter(|activity| matches!(activity.kind, ActivityKind::Attraction { .. }))
            .collect();
        let restaurants: Vec<&Activity> = activities
            .iter()
            .copied()
            .filter(|activity| {
                matches!(
                    activity.kind,
                    ActivityKind::Lunch { .. } | ActivityKind::Dinner { .. }
                )
            })
            .collect();
        let stay = activities.iter().find_map(|activity| match activity.kind {
            ActivityKind::Accommodation { room_type, rooms } => Some((room_type, rooms)),
            _ => None,
        });

        let mut concepts = Self::default()
            .with("days", Value::count(plan.days.len()))
            .with("people_number", Value::from(plan.people))
            .with("start_city", Value::from(plan.start_city.as_str()))
            .with("target_city", Value::from(plan.target_city.as_str()))
            .with("total_cost", Value::from(plan.total_cost()))
            .with("intercity_cost", Value::from(plan.intercity_cost()))
            .with("accommodation_cost", Value::from(plan.accommodation_cost()))
            .with("innercity_cost", Value::from(plan.innercity_cost()))
            .with("activity_count", Value::count(activities.len()))
            .with("attraction_count", Value::count(attractions.len()))
            .with("restaurant_count", Value::count(restaurants.len()))
            .with("attraction_cost", Value::from(sum_costs(&attractions)))
            .with(
                "food_cost",
                Value::from(sum_costs(
                    &activities
                        .iter()
                        .copied()
                        .filter(|activity| activity.kind.meal_kind().is_some())
                        .collect::<Vec<_>>(),
                )),
            )
            .with(
                "attraction_names",
                Value::set(attractions.iter().map(|activity| activity.position.as_str())),
            )
            .with(
                "attraction_types",
                Value::set(attractions.iter().filter_map(|activity| match &activity.kind {
                    ActivityKind::Attraction { spot_type, .. } => Some(spot_type.as_str()),
                    _ => None,
                })),
            )
            .with(
                "restaurant_names",
                Value::set(restaurants.iter().map(|activity| activity.position.as_str())),
            )
            .with(
                "food_types",
                Value::set(restaurants.iter().filter_map(|activity| match &activity.kind {
                    ActivityKind::Lunch { cuisine } | ActivityKind::Dinner { cuisine } => {
                        Some(cuisine.as_str())
                    }
                    _ => None,
                })),
            )
            .with(
                "accommodation_names",
                Value::set(activities.iter().filter_map(|activity| {
                    matches!(activity.kind, ActivityKind::Accommodation { .. })
                        .then_some(activity.position.as_str())
                })),
            )
            .with(
                "intercity_transport",
                Value::set(
                    activities
                        .iter()
                        .filter(|activity| activity.kind.is_intercity())
                        .map(|activity| activity.kind.tag()),
                ),
            )
            .with(
                "innercity_transport",
                Value::set(
                    activities
                        .iter()
                        .flat_map(|activity| activity.transports.iter())
                        .map(|leg| leg.mode.as_str()),
                ),
            );
        let (room_type, rooms) = stay.unwrap_or_default();
        concepts.insert("room_type", Value::from(u32::from(room_type)));
        concepts.insert("room_count", Value::from(rooms));
        concepts
    }

    /// Add or replace a concept.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace a concept in place.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// The value of `name`, if defined.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Iterate over concepts in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

fn sum_costs(activities: &[&Activity]) -> u32 {
    activities
        .iter()
        .fold(0_u32, |sum, activity| sum.saturating_add(activity.cost))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::day_trip;
    use rstest::rstest;

    #[rstest]
    fn defines_every_listed_concept() {
        let concepts = Concepts::extract(&day_trip(2));
        let names: Vec<&str> = concepts.iter().map(|(name, _)| name).collect();
        assert_eq!(names, CONCEPT_NAMES);
    }

    #[rstest]
    #[case("attraction_count", Value::from(1_u32))]
    #[case("restaurant_count", Value::from(1_u32))]
    #[case("food_cost", Value::from(100_u32))]
    #[case("intercity_cost", Value::from(400_u32))]
    #[case("attraction_types", Value::set(["garden"]))]
    #[case("food_types", Value::set(["jiangsu"]))]
    #[case("intercity_transport", Value::set(["train"]))]
    #[case("innercity_transport", Value::set(["taxi"]))]
    #[case("room_count", Value::from(0_u32))]
    fn extracts_day_trip_facts(#[case] name: &str, #[case] expected: Value) {
        let concepts = Concepts::extract(&day_trip(2));
        assert_eq!(concepts.get(name), Some(&expected));
    }

    #[rstest]
    fn with_overrides_extracted_values() {
        let concepts = Concepts::extract(&day_trip(2)).with("days", Value::from(9_u32));
        assert_eq!(concepts.get("days"), Some(&Value::from(9_u32)));
        assert_eq!(concepts.get("missing"), None);
    }
}
