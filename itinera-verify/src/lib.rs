//! Symbolic constraint evaluation for Itinera itineraries.
//!
//! The crate provides [`SymbolicEvaluator`], an implementation of
//! [`ConstraintEvaluator`](itinera_core::ConstraintEvaluator) with three
//! parts:
//! - **Commonsense rules** check that a complete itinerary is structurally
//!   sane: the right number of days, intercity journeys at both ends,
//!   time-ordered activities, transfers that arrive on time, one meal per
//!   slot, no repeated visits, a hotel every night, rooms and tickets for
//!   the whole party.
//! - **Concepts** name facts about an itinerary, such as `total_cost`,
//!   `attraction_count` or `food_types`.
//! - **Expressions** combine concepts into logical constraints such as
//!   `total_cost <= 2000 and 'museum' in attraction_types`, and preference
//!   objectives such as `attraction_count`.
//!
//! # Examples
//!
//! ```
//! use itinera_core::{ConstraintEvaluator, Itinerary, Query};
//! use itinera_verify::{SymbolicEvaluator, Value};
//!
//! let evaluator = SymbolicEvaluator::default();
//! let plan = Itinerary::new(2, "Shanghai", "Suzhou", 1);
//! assert_eq!(evaluator.evaluate("days + people_number", &plan), Ok(Value::from(3_u32)));
//!
//! // An empty plan never opens with a journey out.
//! let query = Query::new("q", "Shanghai", "Suzhou", 2, 1);
//! assert!(!evaluator.commonsense(&query, &plan));
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod commonsense;
mod concepts;
mod error;
mod evaluator;
mod expression;
mod value;

#[doc(hidden)]
pub mod test_support;

pub use commonsense::{Violation, check_rule};
pub use concepts::{CONCEPT_NAMES, Concepts};
pub use error::ExpressionError;
pub use evaluator::SymbolicEvaluator;
pub use expression::Expression;
pub use value::Value;

#[cfg(test)]
mod tests;
