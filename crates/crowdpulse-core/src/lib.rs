//! Shared domain records and configuration for crowdpulse.
//!
//! Everything here is plain data: the canonical post shape every source
//! adapter normalizes into, the scored form produced by the lexicon scorer,
//! and the environment / YAML configuration consumed by the CLI.

pub mod app_config;
pub mod config;
pub mod lexicon;
pub mod posts;
pub mod targets;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use lexicon::{load_lexicon, LexiconTerms};
pub use posts::{
    source_offset, Author, CanonicalPost, Engagement, ScoredPost, Sentiment, SourceType, Target,
    TargetKind,
};
pub use targets::{load_targets, EastmoneyTargets, TargetsFile, XueqiuTargets};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    FileParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unknown source: {0}")]
    UnknownSource(String),
}
