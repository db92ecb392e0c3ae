//! Root settings with file + environment layering

use serde::{Deserialize, Serialize};

use crate::{
    AnswerConfig, ConfigError, EgressConfig, IndexerConfig, JudgeConfig, RetrieverConfig,
    SummarizeConfig, WorkerConfig,
};

/// Top-level application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub egress: EgressConfig,
    pub summarize: SummarizeConfig,
    pub worker: WorkerConfig,
    pub judge: JudgeConfig,
    pub retriever: RetrieverConfig,
    pub indexer: IndexerConfig,
    pub answer: AnswerConfig,
}

impl Settings {
    /// Cross-section validation; egress is validated separately by the
    /// client factory so a bad proxy config degrades to a stub client
    /// instead of failing startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.summarize.validate()?;
        self.retriever.validate()?;
        self.answer.validate()?;
        Ok(())
    }
}

/// Load settings from an optional TOML file plus `NEWSFLOW_` environment
/// overrides (e.g. `NEWSFLOW_ANSWER__HEARTBEAT_SECS=10`).
pub fn load_settings(path: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        if !std::path::Path::new(path).exists() {
            return Err(ConfigError::FileNotFound(path.to_string()));
        }
        builder = builder.add_source(config::File::from(std::path::Path::new(path)));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("NEWSFLOW")
            .separator("__")
            .try_parsing(true),
    );

    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.validate()?;

    tracing::debug!(
        batch_size = settings.summarize.batch_size,
        use_proxy = settings.egress.use_proxy,
        "settings loaded"
    );

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_load_without_file() {
        let settings = load_settings(None).unwrap();
        assert_eq!(settings.summarize.max_failures, 3);
        assert_eq!(settings.retriever.search_limit, 50);
    }

    #[test]
    fn test_missing_file_errors() {
        let err = load_settings(Some("/nonexistent/newsflow.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_file_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[summarize]\nbatch_size = 7\n\n[answer]\nheartbeat_secs = 10\n"
        )
        .unwrap();

        let settings = load_settings(file.path().to_str()).unwrap();
        assert_eq!(settings.summarize.batch_size, 7);
        assert_eq!(settings.answer.heartbeat_secs, 10);
        // Untouched sections keep their defaults
        assert_eq!(settings.retriever.quota_original, 5);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[retriever]\nquota_original = 30\n").unwrap();

        let err = load_settings(file.path().to_str()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
