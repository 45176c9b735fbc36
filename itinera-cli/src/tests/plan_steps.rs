//! Behaviour-driven step definitions driving the plan CLI scenarios.

use super::helpers::{dataset_json, query_json, workspace, write_json_file, write_utf8};
use super::*;
use crate::plan::{DefaultPlannerBuilder, PlanConfig, PlannerBuilder, run_plan_with};
use camino::Utf8PathBuf;
use itinera_core::{PlanResponse, PlanTier, Planner, Query, QueryValidationError};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;

#[derive(Debug)]
struct PlanWorld {
    _tmp: TempDir,
    root: Utf8PathBuf,
    query_path: Utf8PathBuf,
    database: Utf8PathBuf,
    include_query: RefCell<bool>,
    cli_args: RefCell<Vec<String>>,
    response: RefCell<Option<PlanResponse>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl PlanWorld {
    fn new() -> Self {
        let (tmp, root) = workspace();
        Self {
            query_path: root.join("query.json"),
            database: root.join("itinera.db"),
            _tmp: tmp,
            root,
            include_query: RefCell::new(true),
            cli_args: RefCell::new(Vec::new()),
            response: RefCell::new(None),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn output_path(&self) -> Utf8PathBuf {
        self.root.join("results").join("q1.json")
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["itinera".to_owned(), "plan".to_owned()];
        if *self.include_query.borrow() {
            argv.push(self.query_path.as_str().to_owned());
        }
        argv.extend([
            format!("--{ARG_PLAN_DATABASE}"),
            self.database.as_str().to_owned(),
        ]);
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn run_with(&self, builder: &dyn PlannerBuilder) {
        let parsed = Cli::try_parse_from(self.build_command_line()).map_err(CliError::from);
        let outcome = parsed.and_then(|cli| match cli.command {
            Command::Plan(args) => {
                let mut buffer = self.stdout.borrow_mut();
                run_plan_with(args, builder, &mut *buffer)
            }
            other => panic!("expected plan command, found {other:?}"),
        });
        self.result.replace(Some(outcome));
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }

    fn stdout_json(&self) -> serde_json::Value {
        let borrowed = self.result.borrow();
        borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect("expected success");
        serde_json::from_slice(&self.stdout.borrow()).expect("stdout should be JSON")
    }
}

#[fixture]
fn world() -> PlanWorld {
    PlanWorld::new()
}

struct StubPlanner {
    response: PlanResponse,
}

impl Planner for StubPlanner {
    fn plan(&mut self, _query: &Query) -> PlanResponse {
        self.response.clone()
    }
}

struct StubPlannerBuilder {
    response: PlanResponse,
}

impl PlannerBuilder for StubPlannerBuilder {
    fn build(&self, _config: &PlanConfig) -> Result<Box<dyn Planner>, CliError> {
        Ok(Box::new(StubPlanner {
            response: self.response.clone(),
        }))
    }
}

#[given("a database file exists")]
fn database_file_exists(#[from(world)] world: &PlanWorld) {
    write_utf8(&world.database, b"");
}

#[given("the sample dataset has been imported")]
fn sample_dataset_imported(#[from(world)] world: &PlanWorld) {
    let mut environment =
        itinera_data::SqliteEnvironment::open(&world.database).expect("open database");
    let dataset: itinera_data::Dataset =
        serde_json::from_value(dataset_json()).expect("dataset fixture decodes");
    environment.import(&dataset).expect("import dataset");
}

#[given("a valid query exists on disk")]
fn valid_query_exists(#[from(world)] world: &PlanWorld) {
    write_json_file(&world.query_path, &query_json("Suzhou"));
}

#[given("a query for Hangzhou exists on disk")]
fn hangzhou_query_exists(#[from(world)] world: &PlanWorld) {
    write_json_file(&world.query_path, &query_json("Hangzhou"));
}

#[given("the query contains invalid JSON")]
fn query_contains_invalid_json(#[from(world)] world: &PlanWorld) {
    write_utf8(&world.query_path, b"{ not valid json");
}

#[given("the query has no travellers")]
fn query_has_no_travellers(#[from(world)] world: &PlanWorld) {
    let mut query = query_json("Suzhou");
    query["people_number"] = serde_json::json!(0);
    write_json_file(&world.query_path, &query);
}

#[given("I omit the query path")]
fn omit_query_path(#[from(world)] world: &PlanWorld) {
    *world.include_query.borrow_mut() = false;
}

#[given("the planner finds a valid itinerary")]
fn planner_finds_valid_itinerary(#[from(world)] world: &PlanWorld) {
    let response = PlanResponse {
        success: true,
        tier: PlanTier::LogicalValid,
        ..PlanResponse::empty()
    };
    world.response.replace(Some(response));
}

#[given("I ask for the plan to be written to a file")]
fn ask_for_output_file(#[from(world)] world: &PlanWorld) {
    world.cli_args.borrow_mut().extend([
        format!("--{ARG_PLAN_OUTPUT}"),
        world.output_path().as_str().to_owned(),
    ]);
}

#[when("I run the plan command")]
fn run_plan_command(#[from(world)] world: &PlanWorld) {
    let response = world.response.borrow().clone().unwrap_or_default();
    world.run_with(&StubPlannerBuilder { response });
}

#[when("I run the plan command against the database")]
fn run_plan_command_against_database(#[from(world)] world: &PlanWorld) {
    world.run_with(&DefaultPlannerBuilder);
}

#[then("the command succeeds and prints a successful plan")]
fn command_prints_successful_plan(#[from(world)] world: &PlanWorld) {
    let output = world.stdout_json();
    assert_eq!(output["success"], true);
    assert_eq!(output["tier"], "logical_valid");
}

#[then("the command succeeds and prints an empty plan")]
fn command_prints_empty_plan(#[from(world)] world: &PlanWorld) {
    let output = world.stdout_json();
    assert_eq!(output["success"], false);
    assert_eq!(output["tier"], "empty");
    assert_eq!(output["itinerary"], serde_json::json!([]));
}

#[then("the plan is written to the output file")]
fn plan_written_to_file(#[from(world)] world: &PlanWorld) {
    let borrowed = world.result.borrow();
    borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect("expected success");
    assert!(world.stdout.borrow().is_empty());
    let text = std::fs::read_to_string(world.output_path()).expect("output file written");
    let output: serde_json::Value = serde_json::from_str(&text).expect("output is JSON");
    assert_eq!(output["success"], true);
}

#[then("the command fails because the query JSON is invalid")]
fn command_fails_invalid_json(#[from(world)] world: &PlanWorld) {
    match &*world.error() {
        CliError::LoadInput { field, .. } => assert_eq!(*field, ARG_PLAN_QUERY),
        other => panic!("expected LoadInput, found {other:?}"),
    }
}

#[then("the command fails because the query is invalid")]
fn command_fails_invalid_query(#[from(world)] world: &PlanWorld) {
    match &*world.error() {
        CliError::InvalidQuery { source, .. } => {
            assert_eq!(
                *source,
                QueryValidationError::NoPeople {
                    uid: "q1".to_owned()
                }
            );
        }
        other => panic!("expected InvalidQuery, found {other:?}"),
    }
}

#[then("the command fails because the query path is missing")]
fn command_fails_missing_query_path(#[from(world)] world: &PlanWorld) {
    match &*world.error() {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_PLAN_QUERY),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

macro_rules! register_plan_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/plan_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: PlanWorld) {
            let _ = world;
        }
    };
}

register_plan_scenario!(plan_happy_path, "planning a query from JSON");
register_plan_scenario!(plan_output_file, "writing the plan to a file");
register_plan_scenario!(plan_invalid_json, "rejecting invalid JSON input");
register_plan_scenario!(plan_invalid_query, "rejecting invalid queries");
register_plan_scenario!(plan_missing_query, "rejecting missing query paths");
register_plan_scenario!(plan_unknown_city, "planning for a city the database does not hold");
