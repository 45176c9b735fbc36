//! Least-violating itineraries retained for graceful degradation.

use itinera_core::{Itinerary, PlanTier, PreferenceDirection};

/// The itinerary a [`BestEffortTracker`] falls back to.
#[derive(Debug, Clone, PartialEq)]
pub struct BestEffort {
    /// Retained itinerary.
    pub itinerary: Itinerary,
    /// Highest tier it reached.
    pub tier: PlanTier,
    /// Preference value, for logically valid itineraries in preference mode.
    pub preference_value: Option<f64>,
}

/// Slots for the best itinerary seen at each validity tier.
///
/// * the schema slot holds the most recent itinerary validated;
/// * the commonsense slot holds the commonsense-valid itinerary satisfying
///   the most logical constraints, replaced only on strict improvement;
/// * the logical slot holds the first fully valid itinerary, replaced in
///   preference mode whenever the preference value strictly improves.
///
/// # Examples
/// ```
/// use itinera_core::{Itinerary, PlanTier};
/// use itinera_solver_dfs::BestEffortTracker;
///
/// let mut tracker = BestEffortTracker::new(None);
/// let plan = Itinerary::new(1, "Shanghai", "Suzhou", 1);
/// tracker.record_schema(&plan);
/// assert!(tracker.record_commonsense(&plan, 0));
/// assert!(!tracker.record_commonsense(&plan, 0));
/// assert_eq!(tracker.tier(), PlanTier::CommonsenseValid);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BestEffortTracker {
    direction: Option<PreferenceDirection>,
    schema: Option<Itinerary>,
    commonsense: Option<(Itinerary, usize)>,
    logical: Option<Itinerary>,
    preference_value: Option<f64>,
}

impl BestEffortTracker {
    /// Empty slots; `direction` enables preference tracking.
    #[must_use]
    pub const fn new(direction: Option<PreferenceDirection>) -> Self {
        Self {
            direction,
            schema: None,
            commonsense: None,
            logical: None,
            preference_value: None,
        }
    }

    /// Remember `plan` as the latest well-formed itinerary.
    pub fn record_schema(&mut self, plan: &Itinerary) {
        self.schema = Some(plan.clone());
    }

    /// Remember `plan` only while no itinerary has been validated.
    pub fn offer_schema(&mut self, plan: &Itinerary) {
        if self.schema.is_none() {
            self.schema = Some(plan.clone());
        }
    }

    /// Offer a commonsense-valid `plan` passing `logical_passes`
    /// constraints. Returns whether it replaced the slot.
    pub fn record_commonsense(&mut self, plan: &Itinerary, logical_passes: usize) -> bool {
        let improves = self
            .commonsense
            .as_ref()
            .is_none_or(|(_, best)| logical_passes > *best);
        if improves {
            self.commonsense = Some((plan.clone(), logical_passes));
        }
        improves
    }

    /// Offer a fully valid `plan`. Only the first one is kept.
    pub fn record_logical(&mut self, plan: &Itinerary) -> bool {
        if self.logical.is_some() {
            return false;
        }
        self.logical = Some(plan.clone());
        true
    }

    /// Offer a fully valid `plan` scoring `value`. Returns whether it
    /// strictly improved on the incumbent and replaced it.
    pub fn record_preference(&mut self, plan: &Itinerary, value: f64) -> bool {
        let Some(direction) = self.direction else {
            return false;
        };
        let improves = self
            .preference_value
            .is_none_or(|best| direction.improves(value, best));
        if improves {
            log::debug!("preference improved to {value}");
            self.preference_value = Some(value);
            self.logical = Some(plan.clone());
        }
        improves
    }

    /// Highest tier with a retained itinerary.
    #[must_use]
    pub const fn tier(&self) -> PlanTier {
        if self.logical.is_some() {
            PlanTier::LogicalValid
        } else if self.commonsense.is_some() {
            PlanTier::CommonsenseValid
        } else if self.schema.is_some() {
            PlanTier::SchemaValid
        } else {
            PlanTier::Empty
        }
    }

    /// Logical constraints passed by the commonsense-valid incumbent.
    #[must_use]
    pub fn best_logical_passes(&self) -> Option<usize> {
        self.commonsense.as_ref().map(|(_, passes)| *passes)
    }

    /// Best preference value recorded.
    #[must_use]
    pub const fn preference_value(&self) -> Option<f64> {
        self.preference_value
    }

    /// The itinerary from the highest non-empty tier.
    #[must_use]
    pub fn into_best(self) -> Option<BestEffort> {
        let tier = self.tier();
        let preference_value = self.preference_value;
        let itinerary = self
            .logical
            .or_else(|| self.commonsense.map(|(plan, _)| plan))
            .or(self.schema)?;
        Some(BestEffort {
            itinerary,
            tier,
            preference_value: preference_value.filter(|_| tier == PlanTier::LogicalValid),
        })
    }
}
