//! Facade crate for the Itinera travel planner.
//!
//! This crate re-exports the core domain types and exposes the depth-first
//! planner and the symbolic constraint evaluator behind feature flags.

#![forbid(unsafe_code)]

pub use itinera_core::{
    Accommodation, Activity, Attraction, ClockTime, CompletionClient, ConstraintEvaluator,
    DayPlan, Diagnostics, Itinerary, NaturalLanguageQuery, PlanResponse, PlanTier, Planner,
    PreferenceObjective, Query, QueryValidationError, Restaurant, TranslationError, Translator,
    TravelEnvironment,
};

#[cfg(feature = "solver-dfs")]
pub use itinera_solver_dfs::{DfsPlanner, DfsPlannerConfig, LlmHeuristic, RuleHeuristic};

#[cfg(feature = "verify")]
pub use itinera_verify::SymbolicEvaluator;
