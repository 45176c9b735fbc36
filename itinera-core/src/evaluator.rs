//! Judge candidate itineraries against a query's constraints.
//!
//! The `ConstraintEvaluator` trait separates three questions: is the plan
//! structurally sane (commonsense), which of the query's logical constraints
//! hold, and what is the plan's preference value.

use crate::{Itinerary, PreferenceObjective, Query};

/// Evaluate itineraries for a query.
///
/// Implementations must be deterministic and free of side effects: the
/// planner calls them on probe itineraries during ranking as well as on
/// complete plans, and relies on repeated calls agreeing.
///
/// # Examples
///
/// ```rust
/// use itinera_core::{ConstraintEvaluator, Itinerary, PreferenceObjective, Query};
///
/// struct CountingEvaluator;
///
/// impl ConstraintEvaluator for CountingEvaluator {
///     fn commonsense(&self, _query: &Query, _plan: &Itinerary) -> bool {
///         true
///     }
///
///     fn logical(&self, query: &Query, plan: &Itinerary) -> Vec<bool> {
///         query.logical_constraints.iter().map(|_| !plan.is_empty()).collect()
///     }
///
///     fn preference(&self, _objective: &PreferenceObjective, plan: &Itinerary) -> Option<f64> {
///         Some(f64::from(plan.total_cost()))
///     }
/// }
///
/// let query = Query::new("q", "A", "B", 1, 1).with_constraint("total_cost <= 10");
/// let plan = Itinerary::new(1, "A", "B", 1);
/// assert_eq!(CountingEvaluator.logical_passes(&query, &plan), 0);
/// ```
pub trait ConstraintEvaluator {
    /// Whether `plan` satisfies every commonsense rule enabled on `query`.
    fn commonsense(&self, query: &Query, plan: &Itinerary) -> bool;

    /// Outcome of each of `query.logical_constraints`, in order.
    ///
    /// A constraint that cannot be evaluated counts as failed.
    fn logical(&self, query: &Query, plan: &Itinerary) -> Vec<bool>;

    /// Value of the preference concept for `plan`, or `None` if it cannot be
    /// computed.
    fn preference(&self, objective: &PreferenceObjective, plan: &Itinerary) -> Option<f64>;

    /// Number of logical constraints `plan` satisfies.
    fn logical_passes(&self, query: &Query, plan: &Itinerary) -> usize {
        self.logical(query, plan)
            .into_iter()
            .filter(|passed| *passed)
            .count()
    }
}
