//! Shared configuration for brandpulse.
//!
//! Holds the environment-driven [`AppConfig`] and the [`AnalysisProfile`]
//! (lexicons, channel rules, query expansion terms) that the mention pipeline
//! is parameterised with.

pub mod app_config;
pub mod config;
pub mod profile;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use profile::{load_profile, AnalysisProfile, ChannelRule};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read analysis profile {path}: {source}")]
    ProfileFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse analysis profile: {0}")]
    ProfileFileParse(#[from] serde_yaml::Error),

    #[error("invalid analysis profile: {0}")]
    InvalidProfile(String),
}
