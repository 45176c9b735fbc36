//! Command-line interface for the Itinera planner.
//!
//! Three subcommands share one configuration story: every option can come
//! from a configuration file, an `ITINERA_CMDS_*` environment variable or a
//! flag, merged by `ortho_config` and then resolved into a validated config.
//!
//! - `plan` runs the depth-first planner over a symbolic query.
//! - `translate` turns a natural-language request into a symbolic query.
//! - `import` loads a JSON dataset into the SQLite environment.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use itinera_data::llm::{HttpCompletionClient, HttpCompletionClientConfig};
use serde::Serialize;

mod error;
mod import;
mod plan;
mod translate;

pub use error::CliError;

use import::{ImportArgs, run_import};
use plan::{PlanArgs, run_plan};
use translate::{TranslateArgs, run_translate};

pub(crate) const ARG_PLAN_QUERY: &str = "query";
pub(crate) const ARG_PLAN_DATABASE: &str = "database";
pub(crate) const ARG_PLAN_OUTPUT: &str = "output";
pub(crate) const ARG_PLAN_TIME_BUDGET: &str = "time-budget-secs";
pub(crate) const ARG_PLAN_SEARCH_WIDTH: &str = "search-width";
pub(crate) const ARG_PLAN_PREFERENCE_SEARCH: &str = "preference-search";
pub(crate) const ARG_PLAN_PAGE_SIZE: &str = "page-size";
pub(crate) const ARG_PLAN_LLM: &str = "llm";
pub(crate) const ENV_PLAN_QUERY: &str = "ITINERA_CMDS_PLAN_QUERY_PATH";

pub(crate) const ARG_TRANSLATE_REQUEST: &str = "request";
pub(crate) const ARG_TRANSLATE_CACHE_DIR: &str = "cache-dir";
pub(crate) const ARG_TRANSLATE_REFRESH: &str = "refresh";
pub(crate) const ARG_TRANSLATE_MAX_ATTEMPTS: &str = "max-attempts";
pub(crate) const ARG_TRANSLATE_OUTPUT: &str = "output";
pub(crate) const ARG_TRANSLATE_LLM: &str = "llm";
pub(crate) const ENV_TRANSLATE_REQUEST: &str = "ITINERA_CMDS_TRANSLATE_REQUEST_PATH";

pub(crate) const ARG_IMPORT_DATASET: &str = "dataset";
pub(crate) const ARG_IMPORT_DATABASE: &str = "database";
pub(crate) const ENV_IMPORT_DATASET: &str = "ITINERA_CMDS_IMPORT_DATASET_PATH";

pub(crate) const ARG_LLM_BASE_URL: &str = "llm-base-url";
pub(crate) const ARG_LLM_MODEL: &str = "llm-model";
pub(crate) const ARG_API_KEY: &str = "api-key";

pub(crate) const DEFAULT_DATABASE: &str = "itinera.db";
pub(crate) const DEFAULT_CACHE_DIR: &str = "cache";
pub(crate) const DEFAULT_LLM: &str = "deepseek";

/// Run the Itinera CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Plan(args) => run_plan(args),
        Command::Translate(args) => run_translate(args),
        Command::Import(args) => run_import(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "itinera",
    about = "Neuro-symbolic travel itinerary planning",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Plan an itinerary for a symbolic query.
    Plan(PlanArgs),
    /// Translate a natural-language request into a symbolic query.
    Translate(TranslateArgs),
    /// Load a JSON dataset into the SQLite environment.
    Import(ImportArgs),
}

/// Fail unless `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match itinera_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Provider settings shared by the commands that talk to a language model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LlmSettings {
    /// Preset name, such as `deepseek`.
    pub(crate) name: String,
    /// Overrides the preset endpoint.
    pub(crate) base_url: Option<String>,
    /// Overrides the preset model.
    pub(crate) model: Option<String>,
    /// Bearer token.
    pub(crate) api_key: Option<String>,
}

impl LlmSettings {
    /// Resolve the preset and apply overrides.
    ///
    /// Unknown names are accepted when both a base URL and a model are
    /// given, describing a custom OpenAI-compatible provider.
    pub(crate) fn client_config(&self) -> Result<HttpCompletionClientConfig, CliError> {
        let preset = HttpCompletionClientConfig::preset(&self.name);
        let mut config = match (preset, &self.base_url, &self.model) {
            (Some(config), _, _) => config,
            (None, Some(base_url), Some(model)) => {
                HttpCompletionClientConfig::new(self.name.clone(), base_url.clone(), model.clone())
            }
            (None, _, _) => {
                return Err(CliError::UnknownModel {
                    name: self.name.clone(),
                });
            }
        };
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        if let Some(api_key) = &self.api_key {
            config = config.with_api_key(api_key.clone());
        }
        Ok(config)
    }

    /// Build the HTTP client for these settings.
    pub(crate) fn build_client(&self) -> Result<HttpCompletionClient, CliError> {
        let config = self.client_config()?;
        HttpCompletionClient::with_config(config).map_err(|source| {
            CliError::BuildCompletionClient {
                name: self.name.clone(),
                source,
            }
        })
    }
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json_output<T: Serialize>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

/// Write `value` to `output` when given, otherwise to `writer`.
pub(crate) fn emit<T: Serialize>(
    writer: &mut dyn Write,
    output: Option<&Utf8Path>,
    value: &T,
) -> Result<(), CliError> {
    match output {
        Some(path) => {
            itinera_fs::write_json(path, value).map_err(|source| CliError::WriteOutputFile {
                path: path.to_path_buf(),
                source,
            })?;
            log::info!("wrote {path}");
            Ok(())
        }
        None => write_json_output(writer, value),
    }
}

#[cfg(test)]
mod tests;
