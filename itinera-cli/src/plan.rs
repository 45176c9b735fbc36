//! Plan command implementation for the Itinera CLI.

use std::io::Write;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use itinera_core::{PlanResponse, Planner, Query};
use itinera_data::SqliteEnvironment;
use itinera_solver_dfs::{DfsPlanner, DfsPlannerConfig, LlmHeuristic, RuleHeuristic};
use itinera_verify::SymbolicEvaluator;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_API_KEY, ARG_LLM_BASE_URL, ARG_LLM_MODEL, ARG_PLAN_DATABASE, ARG_PLAN_LLM,
    ARG_PLAN_OUTPUT, ARG_PLAN_PAGE_SIZE, ARG_PLAN_PREFERENCE_SEARCH, ARG_PLAN_QUERY,
    ARG_PLAN_SEARCH_WIDTH, ARG_PLAN_TIME_BUDGET, CliError, DEFAULT_DATABASE, ENV_PLAN_QUERY,
    LlmSettings, emit, require_existing,
};

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan an itinerary for a symbolic query. The query is a \
                 JSON document; POIs and transports come from the SQLite \
                 environment built by `itinera import`. Candidates are ranked \
                 by fixed rules unless a language model is named with --llm.",
    about = "Plan an itinerary for a symbolic query"
)]
#[ortho_config(prefix = "ITINERA")]
pub(crate) struct PlanArgs {
    /// Path to a JSON file containing a Query.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) query_path: Option<Utf8PathBuf>,
    /// SQLite environment database (defaults to `itinera.db`).
    #[arg(long = ARG_PLAN_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Write the result here instead of standard output.
    #[arg(long = ARG_PLAN_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Wall-clock search budget in seconds, before language-model time.
    #[arg(long = ARG_PLAN_TIME_BUDGET, value_name = "seconds")]
    #[serde(default)]
    pub(crate) time_budget_secs: Option<u64>,
    /// Maximum ranked candidates tried per decision point.
    #[arg(long = ARG_PLAN_SEARCH_WIDTH, value_name = "count")]
    #[serde(default)]
    pub(crate) search_width: Option<usize>,
    /// Keep searching after the first valid itinerary to optimise the
    /// query's preference.
    #[arg(
        long = ARG_PLAN_PREFERENCE_SEARCH,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) preference_search: Option<bool>,
    /// Rows fetched per environment page.
    #[arg(long = ARG_PLAN_PAGE_SIZE, value_name = "rows")]
    #[serde(default)]
    pub(crate) page_size: Option<usize>,
    /// Rank candidates with this language model (deepseek, gpt4o, glm4plus).
    #[arg(long = ARG_PLAN_LLM, value_name = "name")]
    #[serde(default)]
    pub(crate) llm: Option<String>,
    /// Override the language model's API base URL.
    #[arg(long = ARG_LLM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) llm_base_url: Option<String>,
    /// Override the language model's model identifier.
    #[arg(long = ARG_LLM_MODEL, value_name = "model")]
    #[serde(default)]
    pub(crate) llm_model: Option<String>,
    /// API key for the language model provider.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlanConfig {
    /// Path to the JSON query.
    pub(crate) query_path: Utf8PathBuf,
    /// Path to the SQLite environment.
    pub(crate) database: Utf8PathBuf,
    /// Result destination; standard output when absent.
    pub(crate) output: Option<Utf8PathBuf>,
    /// Planner settings.
    pub(crate) planner: DfsPlannerConfig,
    /// Environment page size, when overridden.
    pub(crate) page_size: Option<usize>,
    /// Language-model ranking, when requested.
    pub(crate) llm: Option<LlmSettings>,
}

impl PlanConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.query_path, ARG_PLAN_QUERY)?;
        require_existing(&self.database, ARG_PLAN_DATABASE)?;
        Ok(())
    }
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let query_path = args.query_path.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_QUERY,
            env: ENV_PLAN_QUERY,
        })?;
        let database = args
            .database
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE));

        let mut planner = DfsPlannerConfig::default()
            .with_search_width(args.search_width)
            .with_preference_search(args.preference_search.unwrap_or(false));
        if let Some(seconds) = args.time_budget_secs {
            planner = planner.with_time_budget(Duration::from_secs(seconds));
        }

        let llm = args.llm.map(|name| LlmSettings {
            name,
            base_url: args.llm_base_url,
            model: args.llm_model,
            api_key: args.api_key,
        });

        Ok(Self {
            query_path,
            database,
            output: args.output,
            planner,
            page_size: args.page_size,
            llm,
        })
    }
}

/// Builds a planner instance for the current plan invocation.
pub(super) trait PlannerBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn Planner>, CliError>;
}

pub(super) struct DefaultPlannerBuilder;

impl PlannerBuilder for DefaultPlannerBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn Planner>, CliError> {
        let mut environment = SqliteEnvironment::open(&config.database)
            .map_err(|source| CliError::database(&config.database, source))?;
        if let Some(page_size) = config.page_size {
            environment = environment.with_page_size(page_size);
        }
        let evaluator = SymbolicEvaluator::default();
        let planner_config = config.planner.clone();
        match &config.llm {
            Some(settings) => {
                let client = settings.build_client()?;
                log::info!("ranking candidates with {}", settings.name);
                Ok(Box::new(DfsPlanner::with_config(
                    environment,
                    evaluator,
                    LlmHeuristic::new(client),
                    planner_config,
                )))
            }
            None => Ok(Box::new(DfsPlanner::with_config(
                environment,
                evaluator,
                RuleHeuristic::default(),
                planner_config,
            ))),
        }
    }
}

pub(super) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultPlannerBuilder;
    run_plan_with(args, &builder, &mut stdout)
}

pub(super) fn run_plan_with(
    args: PlanArgs,
    builder: &dyn PlannerBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_plan_config(args)?;
    let response = execute_plan(&config, builder)?;
    emit(writer, config.output.as_deref(), &response)
}

fn execute_plan(config: &PlanConfig, builder: &dyn PlannerBuilder) -> Result<PlanResponse, CliError> {
    let query = load_query(&config.query_path)?;
    query.validate().map_err(|source| CliError::InvalidQuery {
        path: config.query_path.clone(),
        source,
    })?;
    let mut planner = builder.build(config)?;
    let response = planner.plan(&query);
    log::info!(
        "{}: success={} tier={:?} in {:.2}s",
        query.uid,
        response.success,
        response.tier,
        response.search_time_sec
    );
    Ok(response)
}

fn resolve_plan_config(args: PlanArgs) -> Result<PlanConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Loads a JSON-encoded [`Query`] from disk.
pub(super) fn load_query(path: &Utf8Path) -> Result<Query, CliError> {
    itinera_fs::read_json(path).map_err(|source| CliError::LoadInput {
        field: ARG_PLAN_QUERY,
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
