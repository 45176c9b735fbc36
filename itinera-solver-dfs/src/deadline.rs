//! Wall-clock budget and search-fatal outcomes.

use std::time::{Duration, Instant};

use itinera_core::EnvironmentError;
use thiserror::Error;

/// Conditions that end a whole search rather than a single branch.
#[derive(Debug, Error)]
pub enum SearchAbort {
    /// The wall-clock budget ran out.
    #[error("search exceeded its budget after {elapsed:?}")]
    TimedOut {
        /// Time spent when the budget check failed.
        elapsed: Duration,
    },
    /// The data environment failed.
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}

/// Deadline for one planning call.
///
/// Time charged to language-model calls extends the budget, so slow
/// providers do not starve the symbolic search.
#[derive(Debug, Clone, Copy)]
pub struct SearchDeadline {
    started: Instant,
    budget: Duration,
}

impl SearchDeadline {
    /// Start the clock now.
    #[must_use]
    pub fn start(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    /// Time since the clock started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Whether the budget plus `charged` has been used up.
    #[must_use]
    pub fn is_expired(&self, charged: Duration) -> bool {
        self.elapsed() > self.budget.saturating_add(charged)
    }

    /// Fail with [`SearchAbort::TimedOut`] once the budget plus `charged` is
    /// used up.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use itinera_solver_dfs::{SearchAbort, SearchDeadline};
    ///
    /// let generous = SearchDeadline::start(Duration::from_secs(60));
    /// assert!(generous.check(Duration::ZERO).is_ok());
    ///
    /// let spent = SearchDeadline::start(Duration::ZERO);
    /// std::thread::sleep(Duration::from_millis(2));
    /// assert!(matches!(
    ///     spent.check(Duration::ZERO),
    ///     Err(SearchAbort::TimedOut { .. })
    /// ));
    /// ```
    pub fn check(&self, charged: Duration) -> Result<(), SearchAbort> {
        if self.is_expired(charged) {
            return Err(SearchAbort::TimedOut {
                elapsed: self.elapsed(),
            });
        }
        Ok(())
    }
}
