//! Behaviour-driven step definitions driving the import CLI scenarios.

use super::helpers::{dataset_json, workspace, write_json_file};
use super::*;
use crate::import::run_import_with;
use camino::Utf8PathBuf;
use itinera_data::SqliteEnvironment;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;

#[derive(Debug)]
struct ImportWorld {
    _tmp: TempDir,
    dataset_path: Utf8PathBuf,
    database: Utf8PathBuf,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

#[fixture]
fn world() -> ImportWorld {
    let (tmp, root) = workspace();
    ImportWorld {
        dataset_path: root.join("dataset.json"),
        database: root.join("data").join("itinera.db"),
        _tmp: tmp,
        stdout: RefCell::new(Vec::new()),
        result: RefCell::new(None),
    }
}

#[given("the sample dataset exists on disk")]
fn sample_dataset_exists(#[from(world)] world: &ImportWorld) {
    write_json_file(&world.dataset_path, &dataset_json());
}

#[when("I run the import command")]
fn run_import_command(#[from(world)] world: &ImportWorld) {
    let argv = [
        "itinera".to_owned(),
        "import".to_owned(),
        world.dataset_path.as_str().to_owned(),
        format!("--{ARG_IMPORT_DATABASE}"),
        world.database.as_str().to_owned(),
    ];
    let parsed = Cli::try_parse_from(argv).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Import(args) => {
            let mut buffer = world.stdout.borrow_mut();
            buffer.clear();
            run_import_with(args, &mut *buffer)
        }
        other => panic!("expected import command, found {other:?}"),
    });
    world.result.replace(Some(outcome));
}

#[then("the command reports {cities} cities and {services} services")]
fn command_reports_counts(#[from(world)] world: &ImportWorld, cities: usize, services: usize) {
    let borrowed = world.result.borrow();
    borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect("expected success");
    let summary: serde_json::Value =
        serde_json::from_slice(&world.stdout.borrow()).expect("stdout should be JSON");
    assert_eq!(summary["cities"], cities);
    assert_eq!(summary["services"], services);
    assert_eq!(summary["attractions"], 1);
}

#[then("the database knows the cities Shanghai and Suzhou")]
fn database_knows_cities(#[from(world)] world: &ImportWorld) {
    let environment = SqliteEnvironment::open(&world.database).expect("open database");
    let cities = environment.cities().expect("list cities");
    assert_eq!(cities, vec!["Shanghai".to_owned(), "Suzhou".to_owned()]);
}

#[then("the command fails because the dataset does not exist")]
fn command_fails_missing_dataset(#[from(world)] world: &ImportWorld) {
    let borrowed = world.result.borrow();
    let error = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::MissingSourceFile { field, path } => {
            assert_eq!(*field, ARG_IMPORT_DATASET);
            assert_eq!(*path, world.dataset_path);
        }
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

macro_rules! register_import_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/import_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: ImportWorld) {
            let _ = world;
        }
    };
}

register_import_scenario!(import_happy_path, "importing a dataset");
register_import_scenario!(import_twice, "importing the same dataset twice");
register_import_scenario!(import_missing_dataset, "rejecting a missing dataset");
