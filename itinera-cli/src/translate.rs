//! Translate command implementation for the Itinera CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use itinera_core::{NaturalLanguageQuery, Query, Translator};
use itinera_data::llm::{CachedTranslator, DEFAULT_MAX_ATTEMPTS, LlmTranslator};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_API_KEY, ARG_LLM_BASE_URL, ARG_LLM_MODEL, ARG_TRANSLATE_CACHE_DIR,
    ARG_TRANSLATE_LLM, ARG_TRANSLATE_MAX_ATTEMPTS, ARG_TRANSLATE_OUTPUT, ARG_TRANSLATE_REFRESH,
    ARG_TRANSLATE_REQUEST, CliError, DEFAULT_CACHE_DIR, DEFAULT_LLM, ENV_TRANSLATE_REQUEST,
    LlmSettings, emit, require_existing,
};

/// CLI arguments for the `translate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Translate a natural-language request into a symbolic \
                 query with a language model. The request is a JSON object \
                 with `uid` and `text` fields. Translations are cached per \
                 model under the cache directory and reused unless \
                 --refresh is given.",
    about = "Translate a natural-language request into a query"
)]
#[ortho_config(prefix = "ITINERA")]
pub(crate) struct TranslateArgs {
    /// Path to a JSON file containing the request.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Language model preset (deepseek, gpt4o, glm4plus).
    #[arg(long = ARG_TRANSLATE_LLM, value_name = "name")]
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
    /// Root of the translation cache (defaults to `cache`).
    #[arg(long = ARG_TRANSLATE_CACHE_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) cache_dir: Option<Utf8PathBuf>,
    /// Translate again even when a cached query exists.
    #[arg(
        long = ARG_TRANSLATE_REFRESH,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) refresh: Option<bool>,
    /// Answers the model may give before translation fails.
    #[arg(long = ARG_TRANSLATE_MAX_ATTEMPTS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_attempts: Option<usize>,
    /// Write the query here instead of standard output.
    #[arg(long = ARG_TRANSLATE_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TranslateArgs {
    pub(crate) fn into_config(self) -> Result<TranslateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        TranslateConfig::try_from(merged)
    }
}

/// Resolved `translate` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TranslateConfig {
    /// Path to the JSON request.
    pub(crate) request_path: Utf8PathBuf,
    /// Provider settings.
    pub(crate) llm: LlmSettings,
    /// Root of the translation cache.
    pub(crate) cache_dir: Utf8PathBuf,
    /// Whether cached queries are ignored.
    pub(crate) refresh: bool,
    /// Attempt limit for the translator.
    pub(crate) max_attempts: usize,
    /// Query destination; standard output when absent.
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TranslateConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.request_path, ARG_TRANSLATE_REQUEST)?;
        match itinera_fs::path_is_dir(&self.cache_dir) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::CacheDirectoryNotDirectory {
                path: self.cache_dir.clone(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CliError::InspectSourcePath {
                field: ARG_TRANSLATE_CACHE_DIR,
                path: self.cache_dir.clone(),
                source,
            }),
        }
    }
}

impl TryFrom<TranslateArgs> for TranslateConfig {
    type Error = CliError;

    fn try_from(args: TranslateArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_TRANSLATE_REQUEST,
            env: ENV_TRANSLATE_REQUEST,
        })?;
        let llm = LlmSettings {
            name: args.llm.unwrap_or_else(|| DEFAULT_LLM.to_owned()),
            base_url: args.llm_base_url,
            model: args.llm_model,
            api_key: args.api_key,
        };
        Ok(Self {
            request_path,
            llm,
            cache_dir: args
                .cache_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CACHE_DIR)),
            refresh: args.refresh.unwrap_or(false),
            max_attempts: args.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            output: args.output,
        })
    }
}

/// Builds a translator for the current translate invocation.
pub(super) trait TranslatorBuilder {
    fn build(&self, config: &TranslateConfig) -> Result<Box<dyn Translator>, CliError>;
}

pub(super) struct DefaultTranslatorBuilder;

impl TranslatorBuilder for DefaultTranslatorBuilder {
    fn build(&self, config: &TranslateConfig) -> Result<Box<dyn Translator>, CliError> {
        let client = config.llm.build_client()?;
        Ok(Box::new(
            LlmTranslator::new(client).with_max_attempts(config.max_attempts),
        ))
    }
}

pub(super) fn run_translate(args: TranslateArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultTranslatorBuilder;
    run_translate_with(args, &builder, &mut stdout)
}

pub(super) fn run_translate_with(
    args: TranslateArgs,
    builder: &dyn TranslatorBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_translate_config(args)?;
    let query = execute_translate(&config, builder)?;
    emit(writer, config.output.as_deref(), &query)
}

fn execute_translate(
    config: &TranslateConfig,
    builder: &dyn TranslatorBuilder,
) -> Result<Query, CliError> {
    let request = load_request(&config.request_path)?;
    let label = config.llm.client_config()?.name;
    let translator = CachedTranslator::new(builder.build(config)?, &config.cache_dir, &label)
        .with_load_cache(!config.refresh);
    log::debug!("translation cache at {}", translator.dir());
    translator
        .translate(&request)
        .map_err(|source| CliError::Translate {
            path: config.request_path.clone(),
            source,
        })
}

fn resolve_translate_config(args: TranslateArgs) -> Result<TranslateConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Loads a JSON-encoded [`NaturalLanguageQuery`] from disk.
pub(super) fn load_request(path: &Utf8Path) -> Result<NaturalLanguageQuery, CliError> {
    itinera_fs::read_json(path).map_err(|source| CliError::LoadInput {
        field: ARG_TRANSLATE_REQUEST,
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<TranslateConfig, CliError> {
    let merged = TranslateArgs::merge_from_layers(layers).map_err(CliError::from)?;
    TranslateConfig::try_from(merged)
}
