//! Core domain types for the Itinera planner.
//!
//! The crate models trips (clock times, POIs, transport, activities and
//! itineraries), symbolic queries, and the collaborator traits the planner
//! consumes: a paginated [`TravelEnvironment`], a [`ConstraintEvaluator`]
//! and the language-model [`CompletionClient`] and [`Translator`]
//! capabilities. Constructors that can see invalid input return `Result`.

mod activity;
mod environment;
mod evaluator;
mod itinerary;
mod llm;
mod planner;
mod poi;
mod query;
mod time;
mod transport;

#[doc(hidden)]
pub mod test_support;

pub use activity::{Activity, ActivityError, ActivityKind, MealKind};
pub use environment::{
    EnvironmentError, RouteRequest, Rows, SelectRequest, TravelEnvironment, collect_all,
};
pub use evaluator::ConstraintEvaluator;
pub use itinerary::{DayPlan, Itinerary};
pub use llm::{
    ChatMessage, CompletionClient, CompletionError, CompletionOptions, NaturalLanguageQuery, Role,
    TranslationError, Translator, merge_repeated_roles,
};
pub use planner::{Diagnostics, PlanResponse, PlanTier, Planner};
pub use poi::{Accommodation, Attraction, PoiError, Restaurant};
pub use query::{
    CommonsenseRule, CommonsenseRules, PreferenceDirection, PreferenceObjective, Query,
    QueryValidationError,
};
pub use time::{ClockTime, TimeFormatError, add_time_delta, time_compare_if_earlier_equal};
pub use transport::{InnercityMode, InnercitySegment, IntercityMode, IntercityTransport};
