use std::time::Duration;

use crate::{Itinerary, Query};

/// Validity level of a returned itinerary.
///
/// Ordered from worst to best, so `max` picks the strongest tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum PlanTier {
    /// No itinerary was produced.
    #[default]
    Empty,
    /// Well-formed, but violates some commonsense rule.
    SchemaValid,
    /// Passes commonsense rules, but not every logical constraint.
    CommonsenseValid,
    /// Passes commonsense rules and every logical constraint.
    LogicalValid,
}

/// Search telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Diagnostics {
    /// Wall-clock time spent searching.
    pub search_time: Duration,
    /// Time spent waiting on language models during the search.
    pub llm_inference_time: Duration,
    /// Depth-first expansions performed.
    pub nodes_expanded: u64,
    /// Complete itineraries handed to the evaluator.
    pub validations: u64,
}

/// Result of a planning request.
///
/// Always itinerary-shaped: failures carry an empty itinerary with
/// `success == false`.
///
/// # Examples
/// ```rust
/// use itinera_core::{PlanResponse, PlanTier};
///
/// let response = PlanResponse::empty();
/// assert!(!response.success);
/// assert_eq!(response.tier, PlanTier::Empty);
/// assert!(response.itinerary.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanResponse {
    /// The planned trip.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub itinerary: Itinerary,
    /// Whether the itinerary satisfies every hard constraint.
    pub success: bool,
    /// Validity level of the itinerary.
    pub tier: PlanTier,
    /// Seconds spent searching.
    pub search_time_sec: f64,
    /// Seconds spent on language-model calls during the search.
    pub llm_inference_time_sec: f64,
    /// Whether the search ran out of time.
    #[cfg_attr(feature = "serde", serde(default))]
    pub time_out_flag: bool,
    /// Best preference value found, in preference mode.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub preference_value: Option<f64>,
    /// Whether a best-effort itinerary costs more than the budget.
    #[cfg_attr(feature = "serde", serde(default))]
    pub budget_exceeded: bool,
    /// Search telemetry.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub diagnostics: Diagnostics,
}

impl PlanResponse {
    /// A failed response with no itinerary.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach telemetry, deriving the reported timings from it.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.search_time_sec = diagnostics.search_time.as_secs_f64();
        self.llm_inference_time_sec = diagnostics.llm_inference_time.as_secs_f64();
        self.diagnostics = diagnostics;
        self
    }
}

/// Produce an itinerary for a symbolic query.
///
/// Planners own their mutable search state, so planning takes `&mut self`;
/// concurrent queries need independent planners. Planning never fails
/// outright: invalid queries and exhausted searches yield an empty or
/// best-effort [`PlanResponse`].
pub trait Planner {
    /// Plan a trip for `query`.
    fn plan(&mut self, query: &Query) -> PlanResponse;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct EchoPlanner;

    impl Planner for EchoPlanner {
        fn plan(&mut self, query: &Query) -> PlanResponse {
            if query.validate().is_err() {
                return PlanResponse::empty();
            }
            PlanResponse {
                itinerary: Itinerary::new(
                    query.people,
                    query.start_city.clone(),
                    query.target_city.clone(),
                    query.days,
                ),
                success: true,
                tier: PlanTier::LogicalValid,
                ..PlanResponse::default()
            }
        }
    }

    #[rstest]
    fn invalid_queries_yield_empty_response() {
        let response = EchoPlanner.plan(&Query::new("q", "A", "B", 0, 1));
        assert_eq!(response, PlanResponse::empty());
    }

    #[rstest]
    fn tiers_order_from_worst_to_best() {
        assert!(PlanTier::LogicalValid > PlanTier::CommonsenseValid);
        assert!(PlanTier::CommonsenseValid > PlanTier::SchemaValid);
        assert!(PlanTier::SchemaValid > PlanTier::Empty);
    }

    #[rstest]
    fn diagnostics_populate_timings() {
        let response = EchoPlanner
            .plan(&Query::new("q", "A", "B", 1, 2))
            .with_diagnostics(Diagnostics {
                search_time: Duration::from_millis(1500),
                llm_inference_time: Duration::from_millis(250),
                ..Diagnostics::default()
            });
        assert!((response.search_time_sec - 1.5).abs() < f64::EPSILON);
        assert!((response.llm_inference_time_sec - 0.25).abs() < f64::EPSILON);
        assert_eq!(response.itinerary.days.len(), 2);
    }
}
