//! Error types emitted by the Itinera CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use itinera_core::{QueryValidationError, TranslationError};
use itinera_data::llm::HttpClientBuildError;
use itinera_data::sqlite::SqliteEnvironmentError;
use itinera_fs::JsonFileError;
use thiserror::Error;

/// Errors emitted by the Itinera CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The cache directory exists but is not a directory.
    #[error("cache directory {path:?} is not a directory")]
    CacheDirectoryNotDirectory { path: Utf8PathBuf },
    /// No completion provider is known by this name.
    #[error("unknown language model {name:?} (expected deepseek, gpt4o or glm4plus, or set a base URL and model)")]
    UnknownModel { name: String },
    /// An input document could not be read or decoded.
    #[error("failed to load {field} from {path:?}: {source}")]
    LoadInput {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: JsonFileError,
    },
    /// The query failed validation.
    #[error("query in {path:?} failed validation: {source}")]
    InvalidQuery {
        path: Utf8PathBuf,
        #[source]
        source: QueryValidationError,
    },
    /// Constructing the completion client failed.
    #[error("failed to build completion client for {name:?}: {source}")]
    BuildCompletionClient {
        name: String,
        #[source]
        source: HttpClientBuildError,
    },
    /// The SQLite data environment could not be opened or filled.
    #[error("database {path:?}: {source}")]
    Database {
        path: Utf8PathBuf,
        #[source]
        source: Box<SqliteEnvironmentError>,
    },
    /// Translation of a natural-language request failed.
    #[error("failed to translate {path:?}: {source}")]
    Translate {
        path: Utf8PathBuf,
        #[source]
        source: TranslationError,
    },
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
    /// Writing command output to a file failed.
    #[error("failed to write output to {path:?}: {source}")]
    WriteOutputFile {
        path: Utf8PathBuf,
        #[source]
        source: JsonFileError,
    },
}

impl CliError {
    pub(crate) fn database(path: &camino::Utf8Path, source: SqliteEnvironmentError) -> Self {
        Self::Database {
            path: path.to_path_buf(),
            source: Box::new(source),
        }
    }
}
