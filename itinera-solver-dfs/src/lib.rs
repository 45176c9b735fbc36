//! Depth-first itinerary planner for Itinera.
//!
//! This crate provides [`DfsPlanner`], the default implementation of the
//! [`Planner`](itinera_core::Planner) trait. It builds a trip one activity at
//! a time: the outbound journey, then meals, attractions and hotel nights,
//! then the return journey on the final day. Candidates at every decision
//! point are ordered by a [`SearchHeuristic`] and then re-ranked by how many
//! of the query's logical constraints a probe itinerary containing them
//! satisfies.
//!
//! Complete itineraries are handed to a
//! [`ConstraintEvaluator`](itinera_core::ConstraintEvaluator). The first one
//! passing every commonsense rule and logical constraint is returned; when
//! none does before the wall-clock budget runs out, the [`BestEffortTracker`]
//! supplies the least-violating itinerary seen.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod deadline;
mod frontier;
mod heuristic;
mod planner;
mod rerank;
mod schedule;
mod tracker;
mod transfer;

#[doc(hidden)]
pub mod test_support;

pub use config::{DfsPlannerConfig, ServiceWindow};
pub use deadline::{SearchAbort, SearchDeadline};
pub use frontier::VisitedStacks;
pub use heuristic::{
    LlmHeuristic, NextKind, RoomRequest, RuleHeuristic, SearchContext, SearchHeuristic,
    UnknownNextKind,
};
pub use planner::DfsPlanner;
pub use rerank::{bucket_by_passes, sanitize_ranking};
pub use schedule::{
    AddActivityError, attraction_start, schedule_accommodation, schedule_attraction,
    schedule_breakfast, schedule_restaurant,
};
pub use tracker::{BestEffort, BestEffortTracker};
