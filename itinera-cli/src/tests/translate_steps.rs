//! Behaviour-driven step definitions driving the translate CLI scenarios.

use super::helpers::{query_json, request_json, translated_answer, workspace, write_json_file};
use super::*;
use crate::translate::{TranslateConfig, TranslatorBuilder, run_translate_with};
use camino::Utf8PathBuf;
use itinera_core::test_support::ScriptedCompletionClient;
use itinera_core::{TranslationError, Translator};
use itinera_data::llm::LlmTranslator;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;

#[derive(Debug)]
struct TranslateWorld {
    _tmp: TempDir,
    request_path: Utf8PathBuf,
    cache_dir: Utf8PathBuf,
    answers: RefCell<Vec<String>>,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl TranslateWorld {
    fn new() -> Self {
        let (tmp, root) = workspace();
        Self {
            request_path: root.join("request.json"),
            cache_dir: root.join("cache"),
            _tmp: tmp,
            answers: RefCell::new(Vec::new()),
            cli_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn cache_entry(&self) -> Utf8PathBuf {
        self.cache_dir
            .join("translation_DeepSeek-V3")
            .join("q1.json")
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec![
            "itinera".to_owned(),
            "translate".to_owned(),
            self.request_path.as_str().to_owned(),
            format!("--{ARG_TRANSLATE_CACHE_DIR}"),
            self.cache_dir.as_str().to_owned(),
        ];
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
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
}

#[fixture]
fn world() -> TranslateWorld {
    TranslateWorld::new()
}

struct ScriptedTranslatorBuilder {
    answers: Vec<String>,
}

impl TranslatorBuilder for ScriptedTranslatorBuilder {
    fn build(&self, config: &TranslateConfig) -> Result<Box<dyn Translator>, CliError> {
        let client = ScriptedCompletionClient::new(self.answers.clone());
        Ok(Box::new(
            LlmTranslator::new(client).with_max_attempts(config.max_attempts),
        ))
    }
}

#[given("a request exists on disk")]
fn request_exists(#[from(world)] world: &TranslateWorld) {
    write_json_file(&world.request_path, &request_json("q1"));
}

#[given("the model answers with a query for Suzhou")]
fn model_answers_suzhou(#[from(world)] world: &TranslateWorld) {
    world.answers.borrow_mut().push(translated_answer());
}

#[given("the model has no answers")]
fn model_has_no_answers(#[from(world)] world: &TranslateWorld) {
    world.answers.borrow_mut().clear();
}

#[given("the model only answers with prose")]
fn model_answers_prose(#[from(world)] world: &TranslateWorld) {
    world.answers.borrow_mut().extend(
        ["I would suggest Suzhou.", "Suzhou is lovely.", "Try Suzhou."].map(str::to_owned),
    );
}

#[given("a cached translation bound for Nanjing exists")]
fn cached_translation_exists(#[from(world)] world: &TranslateWorld) {
    write_json_file(&world.cache_entry(), &query_json("Nanjing"));
}

#[given("I ask for a refresh")]
fn ask_for_refresh(#[from(world)] world: &TranslateWorld) {
    world
        .cli_args
        .borrow_mut()
        .push(format!("--{ARG_TRANSLATE_REFRESH}"));
}

#[given("I choose the language model \"{name}\"")]
fn choose_language_model(#[from(world)] world: &TranslateWorld, name: String) {
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_TRANSLATE_LLM}"), name]);
}

#[when("I run the translate command")]
fn run_translate_command(#[from(world)] world: &TranslateWorld) {
    let builder = ScriptedTranslatorBuilder {
        answers: world.answers.borrow().clone(),
    };
    let parsed = Cli::try_parse_from(world.build_command_line()).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Translate(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_translate_with(args, &builder, &mut *buffer)
        }
        other => panic!("expected translate command, found {other:?}"),
    });
    world.result.replace(Some(outcome));
}

#[then("the command prints a query bound for {city}")]
fn command_prints_query(#[from(world)] world: &TranslateWorld, city: String) {
    let borrowed = world.result.borrow();
    borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect("expected success");
    let output: serde_json::Value =
        serde_json::from_slice(&world.stdout.borrow()).expect("stdout should be JSON");
    assert_eq!(output["uid"], "q1");
    assert_eq!(output["target_city"], city.as_str());
    assert_eq!(output["people_number"], 2);
}

#[then("the translation is cached")]
fn translation_is_cached(#[from(world)] world: &TranslateWorld) {
    let text = std::fs::read_to_string(world.cache_entry()).expect("cache entry written");
    let cached: serde_json::Value = serde_json::from_str(&text).expect("cache entry is JSON");
    assert_eq!(cached["target_city"], "Suzhou");
}

#[then("the command fails because the translation could not be parsed")]
fn command_fails_parse(#[from(world)] world: &TranslateWorld) {
    match &*world.error() {
        CliError::Translate {
            source: TranslationError::Parse { uid, .. },
            ..
        } => assert_eq!(uid, "q1"),
        other => panic!("expected a parse failure, found {other:?}"),
    }
    assert!(!world.cache_entry().exists());
}

#[then("the command fails because the language model is unknown")]
fn command_fails_unknown_model(#[from(world)] world: &TranslateWorld) {
    match &*world.error() {
        CliError::UnknownModel { name } => assert_eq!(name, "llama"),
        other => panic!("expected UnknownModel, found {other:?}"),
    }
}

macro_rules! register_translate_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/translate_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: TranslateWorld) {
            let _ = world;
        }
    };
}

register_translate_scenario!(translate_happy_path, "translating a request with a language model");
register_translate_scenario!(translate_cached, "reusing a cached translation");
register_translate_scenario!(translate_refresh, "refreshing a cached translation");
register_translate_scenario!(translate_parse_failure, "reporting answers that never parse");
register_translate_scenario!(translate_unknown_model, "rejecting unknown language models");
