// ⚙️ Configuration
// Command-line / environment options shared by the CLI and the server

use crate::loader::{DataPaths, DataSource};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Requested data source. `Auto` is resolved to a concrete `DataSource` once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceMode {
    Raw,
    Cleaned,
    /// Cleaned snapshot if one exists, raw extracts otherwise
    Auto,
}

#[derive(Debug, Clone, Args)]
pub struct DataConfig {
    /// Directory the input and snapshot paths are relative to
    #[arg(long, env = "YT_DATA_ROOT", default_value = ".")]
    pub data_root: PathBuf,

    #[arg(long, default_value = "biometric_data/api_data_aadhar_biometric")]
    pub biometric_dir: PathBuf,

    #[arg(long, default_value = "demographic_data/api_data_aadhar_demographic")]
    pub demographic_dir: PathBuf,

    #[arg(long, default_value = "enrolment_data/api_data_aadhar_enrolment")]
    pub enrolment_dir: PathBuf,

    /// Where the cleaning utility writes (and the server reads) the snapshot
    #[arg(long, default_value = "cleaned_data")]
    pub cleaned_dir: PathBuf,

    #[arg(long, env = "YT_SOURCE", value_enum, default_value_t = SourceMode::Auto)]
    pub source: SourceMode,
}

impl DataConfig {
    pub fn paths(&self) -> DataPaths {
        DataPaths {
            biometric_dir: self.data_root.join(&self.biometric_dir),
            demographic_dir: self.data_root.join(&self.demographic_dir),
            enrolment_dir: self.data_root.join(&self.enrolment_dir),
            cleaned_dir: self.data_root.join(&self.cleaned_dir),
        }
    }

    /// Resolve the source mode against the filesystem. Called once; never per request.
    pub fn resolve_source(&self, paths: &DataPaths) -> DataSource {
        match self.source {
            SourceMode::Raw => DataSource::Raw,
            SourceMode::Cleaned => DataSource::Cleaned,
            SourceMode::Auto if paths.has_cleaned_snapshot() => DataSource::Cleaned,
            SourceMode::Auto => DataSource::Raw,
        }
    }
}
