//! Shared test harness modules for the Itinera CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod helpers;
mod import_steps;
mod plan_steps;
mod plan_unit;
mod translate_steps;
