//! Import command implementation for the Itinera CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use itinera_data::{Dataset, ImportSummary, SqliteEnvironment};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_IMPORT_DATABASE, ARG_IMPORT_DATASET, CliError, DEFAULT_DATABASE, ENV_IMPORT_DATASET,
    require_existing, write_json_output,
};

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load a JSON dataset of cities, POIs and intercity \
                 timetables into the SQLite environment, creating the \
                 database when needed. Rows already present are replaced.",
    about = "Load a dataset into the SQLite environment"
)]
#[ortho_config(prefix = "ITINERA")]
pub(crate) struct ImportArgs {
    /// Path to a JSON dataset.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) dataset_path: Option<Utf8PathBuf>,
    /// SQLite environment database (defaults to `itinera.db`).
    #[arg(long = ARG_IMPORT_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl ImportArgs {
    pub(crate) fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Resolved `import` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) dataset_path: Utf8PathBuf,
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let dataset_path = args.dataset_path.ok_or(CliError::MissingArgument {
            field: ARG_IMPORT_DATASET,
            env: ENV_IMPORT_DATASET,
        })?;
        Ok(Self {
            dataset_path,
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
        })
    }
}

pub(super) fn run_import(args: ImportArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_import_with(args, &mut stdout)
}

pub(super) fn run_import_with(args: ImportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.dataset_path, ARG_IMPORT_DATASET)?;
    let summary = execute_import(&config)?;
    write_json_output(writer, &summary)
}

fn execute_import(config: &ImportConfig) -> Result<ImportSummary, CliError> {
    let dataset = load_dataset(&config.dataset_path)?;
    let mut environment = SqliteEnvironment::open(&config.database)
        .map_err(|source| CliError::database(&config.database, source))?;
    let summary = environment
        .import(&dataset)
        .map_err(|source| CliError::database(&config.database, source))?;
    log::info!(
        "imported {} cities and {} services into {}",
        summary.cities,
        summary.services,
        config.database
    );
    Ok(summary)
}

fn load_dataset(path: &Utf8Path) -> Result<Dataset, CliError> {
    itinera_fs::read_json(path).map_err(|source| CliError::LoadInput {
        field: ARG_IMPORT_DATASET,
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ImportConfig, CliError> {
    let merged = ImportArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ImportConfig::try_from(merged)
}
