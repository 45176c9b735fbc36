//! Focused unit tests covering plan CLI configuration and query loading.

use super::helpers::{query_json, workspace, write_json_file, write_utf8};
use super::*;
use camino::Utf8PathBuf;
use crate::plan::{PlanArgs, PlanConfig, config_from_layers_for_test, load_query};
use itinera_solver_dfs::DfsPlannerConfig;
use rstest::rstest;
use std::time::Duration;

#[rstest]
fn converting_plan_without_query_errors() {
    let err = PlanConfig::try_from(PlanArgs::default()).expect_err("missing query should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_PLAN_QUERY);
            assert_eq!(env, ENV_PLAN_QUERY);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn plan_config_applies_defaults() {
    let args = PlanArgs {
        query_path: Some(Utf8PathBuf::from("query.json")),
        ..PlanArgs::default()
    };
    let config = PlanConfig::try_from(args).expect("config should build");
    assert_eq!(config.database, Utf8PathBuf::from(DEFAULT_DATABASE));
    assert_eq!(config.planner, DfsPlannerConfig::default());
    assert!(config.output.is_none());
    assert!(config.page_size.is_none());
    assert!(config.llm.is_none());
}

#[rstest]
fn plan_config_maps_search_settings() {
    let args = PlanArgs {
        query_path: Some(Utf8PathBuf::from("query.json")),
        time_budget_secs: Some(30),
        search_width: Some(4),
        preference_search: Some(true),
        page_size: Some(25),
        llm: Some("glm4plus".to_owned()),
        api_key: Some("secret".to_owned()),
        ..PlanArgs::default()
    };
    let config = PlanConfig::try_from(args).expect("config should build");
    assert_eq!(config.planner.time_budget, Duration::from_secs(30));
    assert_eq!(config.planner.search_width, Some(4));
    assert!(config.planner.preference_search);
    assert_eq!(config.page_size, Some(25));
    let llm = config.llm.expect("llm settings");
    assert_eq!(llm.name, "glm4plus");
    assert_eq!(llm.api_key.as_deref(), Some("secret"));
}

#[rstest]
fn validate_sources_reports_missing_database() {
    let (_tmp, root) = workspace();
    let query_path = root.join("query.json");
    write_utf8(&query_path, b"{}");
    let config = PlanConfig::try_from(PlanArgs {
        query_path: Some(query_path),
        database: Some(root.join("absent.db")),
        ..PlanArgs::default()
    })
    .expect("config should build");

    match config.validate_sources() {
        Err(CliError::MissingSourceFile { field, .. }) => assert_eq!(field, ARG_PLAN_DATABASE),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn load_query_decodes_json() {
    let (_tmp, root) = workspace();
    let path = root.join("query.json");
    write_json_file(&path, &query_json("Suzhou"));

    let query = load_query(&path).expect("query should decode");
    assert_eq!(query.uid, "q1");
    assert_eq!(query.people, 2);
    assert_eq!(query.budget, Some(1200));
    assert_eq!(query.logical_constraints, vec!["total_cost <= 1200"]);
}

#[rstest]
fn load_query_rejects_invalid_json() {
    let (_tmp, root) = workspace();
    let path = root.join("query.json");
    write_utf8(&path, b"{ not valid json");

    match load_query(&path) {
        Err(CliError::LoadInput { field, path: found, .. }) => {
            assert_eq!(field, ARG_PLAN_QUERY);
            assert_eq!(found, path);
        }
        other => panic!("expected LoadInput, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "search_width": "wide" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "database": "from-file.db",
            "time_budget_secs": 120,
            "llm": "gpt4o",
        }),
        None,
    );
    composer.push_environment(json!({
        "query_path": "from-env.json",
        "database": "from-env.db",
    }));
    composer.push_cli(json!({ "database": "from-cli.db" }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.query_path, Utf8PathBuf::from("from-env.json"));
    assert_eq!(config.database, Utf8PathBuf::from("from-cli.db"));
    assert_eq!(config.planner.time_budget, Duration::from_secs(120));
    assert_eq!(config.llm.map(|llm| llm.name), Some("gpt4o".to_owned()));
}
