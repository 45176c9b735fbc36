//! Adapters connecting the Itinera planner to data and language models.
//!
//! Responsibilities:
//! - Serve points of interest and timetables from SQLite through
//!   [`itinera_core::TravelEnvironment`].
//! - Estimate innercity routes from coordinates.
//! - Issue chat completions over HTTP and translate natural-language
//!   requests into symbolic queries, with an on-disk cache.
//!
//! Boundaries:
//! - Do not encode planning rules (live in `itinera-core` and the solver).
//! - Present synchronous interfaces; async clients block on an owned runtime.
//!
//! Invariants:
//! - No global mutable state.

pub mod llm;
pub mod routing;
pub mod sqlite;

pub use llm::{CachedTranslator, HttpCompletionClient, HttpCompletionClientConfig, LlmTranslator};
pub use routing::{DistanceRouter, DistanceRouterConfig, ModeProfile};
pub use sqlite::{Dataset, ImportSummary, SqliteEnvironment, SqliteEnvironmentError};
