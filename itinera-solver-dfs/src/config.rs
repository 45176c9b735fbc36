//! Tunables for [`DfsPlanner`](crate::DfsPlanner).

use std::time::Duration;

use itinera_core::ClockTime;

/// Range of admissible start times for a meal.
///
/// Arrivals before `earliest` wait until it; a start at or after `latest`
/// misses the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceWindow {
    /// First time the meal may start.
    pub earliest: ClockTime,
    /// Time by which the meal must have started.
    pub latest: ClockTime,
}

impl ServiceWindow {
    /// Window from `earliest` to `latest`.
    #[must_use]
    pub const fn new(earliest: ClockTime, latest: ClockTime) -> Self {
        Self { earliest, latest }
    }
}

/// Configuration for [`DfsPlanner`](crate::DfsPlanner).
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use itinera_solver_dfs::DfsPlannerConfig;
///
/// let config = DfsPlannerConfig::default()
///     .with_time_budget(Duration::from_secs(30))
///     .with_search_width(Some(5));
/// assert_eq!(config.search_width, Some(5));
/// assert_eq!(config.meal_minutes, 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfsPlannerConfig {
    /// Wall-clock budget for one query, before language-model time is added.
    pub time_budget: Duration,
    /// Maximum ranked candidates tried per decision point.
    pub search_width: Option<usize>,
    /// Keep searching after the first valid itinerary to optimise the
    /// query's preference objective.
    pub preference_search: bool,
    /// Length of lunch and dinner.
    pub meal_minutes: u32,
    /// Visit length for attractions without a recommendation, also used by
    /// re-ranking probes.
    pub default_visit_minutes: u32,
    /// Nothing may be scheduled from this time on.
    pub day_cutoff: ClockTime,
    /// Attractions reached at or after this time are skipped.
    pub attraction_arrival_cutoff: ClockTime,
    /// Lunch start times.
    pub lunch: ServiceWindow,
    /// Dinner start times.
    pub dinner: ServiceWindow,
    /// Check-in time assumed by hotel re-ranking probes.
    pub hotel_probe_arrival: ClockTime,
    /// Per-person daily spending money that must remain once transport and
    /// hotel are paid for.
    pub daily_reserve_per_person: u32,
    /// Breakfast start at the hotel.
    pub breakfast_start: ClockTime,
    /// Length of breakfast.
    pub breakfast_minutes: u32,
}

impl Default for DfsPlannerConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(300),
            search_width: None,
            preference_search: false,
            meal_minutes: 60,
            default_visit_minutes: 90,
            day_cutoff: ClockTime::hm(23, 0),
            attraction_arrival_cutoff: ClockTime::hm(21, 0),
            lunch: ServiceWindow::new(ClockTime::hm(11, 0), ClockTime::hm(13, 0)),
            dinner: ServiceWindow::new(ClockTime::hm(17, 0), ClockTime::hm(20, 0)),
            hotel_probe_arrival: ClockTime::hm(20, 0),
            daily_reserve_per_person: 100,
            breakfast_start: ClockTime::hm(8, 0),
            breakfast_minutes: 30,
        }
    }
}

impl DfsPlannerConfig {
    /// Replace the wall-clock budget.
    #[must_use]
    pub const fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Cap the candidates tried per decision point.
    #[must_use]
    pub const fn with_search_width(mut self, width: Option<usize>) -> Self {
        self.search_width = width;
        self
    }

    /// Enable exhaustive preference optimisation.
    #[must_use]
    pub const fn with_preference_search(mut self, enabled: bool) -> Self {
        self.preference_search = enabled;
        self
    }

    /// Replace the per-person daily reserve.
    #[must_use]
    pub const fn with_daily_reserve(mut self, per_person: u32) -> Self {
        self.daily_reserve_per_person = per_person;
        self
    }

    /// Replace the lunch and dinner windows.
    #[must_use]
    pub const fn with_meal_windows(mut self, lunch: ServiceWindow, dinner: ServiceWindow) -> Self {
        self.lunch = lunch;
        self.dinner = dinner;
        self
    }
}
