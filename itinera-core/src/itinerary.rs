//! Day plans, itineraries and cost aggregation.

use crate::{Activity, ActivityKind};

/// Activities scheduled for one day of the trip.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DayPlan {
    /// One-based day index.
    pub day: u32,
    /// Activities in time order.
    pub activities: Vec<Activity>,
}

impl DayPlan {
    /// An empty plan for `day`.
    pub const fn new(day: u32) -> Self {
        Self {
            day,
            activities: Vec::new(),
        }
    }

    /// The most recently scheduled activity.
    pub fn last(&self) -> Option<&Activity> {
        self.activities.last()
    }

    /// Whether an activity with the given tag is already scheduled.
    pub fn has_activity(&self, tag: &str) -> bool {
        self.activities.iter().any(|activity| activity.kind.tag() == tag)
    }
}

/// A complete or partial trip.
///
/// # Examples
/// ```
/// use itinera_core::{Activity, ActivityKind, ClockTime, Itinerary};
///
/// let mut plan = Itinerary::new(2, "Shanghai", "Suzhou", 1);
/// let lunch = Activity::new(
///     ActivityKind::Lunch { cuisine: "noodles".into() },
///     "Noodle House",
///     ClockTime::from_hm(11, 0).unwrap(),
///     ClockTime::from_hm(12, 0).unwrap(),
///     30,
///     60,
/// )
/// .unwrap();
/// plan.days[0].activities.push(lunch);
/// assert_eq!(plan.daily_spend(), 60);
/// assert_eq!(plan.total_cost(), 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Itinerary {
    /// Party size.
    #[cfg_attr(feature = "serde", serde(rename = "people_number"))]
    pub people: u32,
    /// Departure city.
    pub start_city: String,
    /// Destination city.
    pub target_city: String,
    /// Day plans in order; may be shorter than the trip while searching.
    #[cfg_attr(feature = "serde", serde(rename = "itinerary"))]
    pub days: Vec<DayPlan>,
}

impl Itinerary {
    /// An itinerary with `days` empty day plans.
    pub fn new(
        people: u32,
        start_city: impl Into<String>,
        target_city: impl Into<String>,
        days: u32,
    ) -> Self {
        Self {
            people,
            start_city: start_city.into(),
            target_city: target_city.into(),
            days: (1..=days).map(DayPlan::new).collect(),
        }
    }

    /// Whether no activity has been scheduled.
    pub fn is_empty(&self) -> bool {
        self.days.iter().all(|day| day.activities.is_empty())
    }

    /// Iterate over every activity in order.
    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.days.iter().flat_map(|day| day.activities.iter())
    }

    /// Cost of meals and attraction tickets, the running total checked during
    /// search.
    pub fn daily_spend(&self) -> u32 {
        self.sum_costs(|activity| activity.kind.is_daily_spend())
    }

    /// Cost of trains and flights.
    pub fn intercity_cost(&self) -> u32 {
        self.sum_costs(|activity| activity.kind.is_intercity())
    }

    /// Cost of hotel nights.
    pub fn accommodation_cost(&self) -> u32 {
        self.sum_costs(|activity| matches!(activity.kind, ActivityKind::Accommodation { .. }))
    }

    /// Cost of every innercity leg.
    pub fn innercity_cost(&self) -> u32 {
        self.activities()
            .fold(0_u32, |sum, activity| sum.saturating_add(activity.transport_cost()))
    }

    /// Total cost of the trip.
    pub fn total_cost(&self) -> u32 {
        self.activities().fold(0_u32, |sum, activity| {
            sum.saturating_add(activity.cost)
                .saturating_add(activity.transport_cost())
        })
    }

    fn sum_costs(&self, include: impl Fn(&Activity) -> bool) -> u32 {
        self.activities()
            .filter(|activity| include(activity))
            .fold(0_u32, |sum, activity| sum.saturating_add(activity.cost))
    }
}
