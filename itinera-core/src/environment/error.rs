use std::error::Error as StdError;

use thiserror::Error;

use crate::InnercityMode;

/// Errors from [`crate::TravelEnvironment`] calls.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// The environment holds no data for the city.
    #[error("city {city:?} is not supported")]
    UnsupportedCity {
        /// Rejected city.
        city: String,
    },
    /// `next_page` was called before any select.
    #[error("next_page called without an active selection")]
    NoActiveSelection,
    /// A page held rows of a different table than expected.
    #[error("expected {expected} rows, found {found} rows")]
    UnexpectedRows {
        /// Table the caller asked for.
        expected: &'static str,
        /// Table the page came from.
        found: &'static str,
    },
    /// No route connects the two places with the requested mode.
    #[error("no {mode} route from {from:?} to {to:?}")]
    NoRoute {
        /// Origin.
        from: String,
        /// Destination.
        to: String,
        /// Requested mode.
        mode: InnercityMode,
    },
    /// The backing store failed.
    #[error("environment backend failed: {message}")]
    Backend {
        /// Short description of the failed operation.
        message: String,
        /// Underlying error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl EnvironmentError {
    /// Wrap a backend failure.
    pub fn backend(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Backend {
            message: message.into(),
            source: source.into(),
        }
    }
}
