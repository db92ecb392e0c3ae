//! Configuration management for the newsflow content pipeline
//!
//! Supports loading configuration from:
//! - TOML files
//! - Environment variables (NEWSFLOW_ prefix)
//! - Runtime overrides

pub mod answer;
pub mod egress;
pub mod rag;
pub mod settings;
pub mod summarize;

pub use answer::AnswerConfig;
pub use egress::EgressConfig;
pub use rag::{IndexerConfig, RetrieverConfig};
pub use settings::{load_settings, Settings};
pub use summarize::{JudgeConfig, SummarizeConfig, WorkerConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for newsflow_core::Error {
    fn from(err: ConfigError) -> Self {
        newsflow_core::Error::Config(err.to_string())
    }
}
