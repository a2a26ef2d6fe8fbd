//! Shared data model and configuration for the battery news pipeline.
//!
//! Every other crate in the workspace depends on the types defined here:
//! the [`CandidateItem`] record produced by collectors, the [`AppConfig`]
//! built once at process start, and the source-tier table loaded from YAML.

pub mod app_config;
pub mod config;
pub mod markup;
pub mod sources;
pub mod types;

pub use app_config::AppConfig;
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use markup::strip_markup;
pub use sources::{load_sources, SourceTier, SourcesFile};
pub use types::{reference_offset, CandidateItem, Provider};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("sources validation failed: {0}")]
    Validation(String),
}
