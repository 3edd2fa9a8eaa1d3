use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::{
    RelevanceFilter, DEFAULT_ENTROPY_THRESHOLD, DEFAULT_PIXEL_THRESHOLD,
};
use crate::graph::RemoteGraphConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),
}

/// Everything a run needs beyond the input directory itself. Deserialized
/// from a TOML file; individual fields can be overridden by CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Which relevance signal gates candidate images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    #[default]
    PixelCount,
    HistogramEntropy,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub scorer: ScorerKind,
    /// Falls back to the scorer's own default when unset.
    #[serde(default)]
    pub threshold: Option<f64>,
}

impl FilterConfig {
    #[must_use]
    pub fn build(&self) -> RelevanceFilter {
        match self.scorer {
            ScorerKind::PixelCount => {
                RelevanceFilter::pixel_count(self.threshold.unwrap_or(DEFAULT_PIXEL_THRESHOLD))
            }
            ScorerKind::HistogramEntropy => RelevanceFilter::histogram_entropy(
                self.threshold.unwrap_or(DEFAULT_ENTROPY_THRESHOLD),
            ),
        }
    }
}

/// Backend selection. The in-memory backend serializes its result; the
/// remote backend talks to a live property-graph service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    Memory {
        #[serde(default)]
        graphml_out: Option<PathBuf>,
        #[serde(default)]
        json_out: Option<PathBuf>,
    },
    Remote(RemoteStoreConfig),
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Memory {
            graphml_out: None,
            json_out: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteStoreConfig {
    pub uri: String,
    #[serde(default = "default_database")]
    pub database: String,
    pub username: String,
    /// Name of the environment variable holding the password. The
    /// credential itself never lives in the config file.
    pub password_env: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_database() -> String {
    "neo4j".to_string()
}

const fn default_connect_timeout() -> u64 {
    10
}

const fn default_request_timeout() -> u64 {
    30
}

impl RemoteStoreConfig {
    /// Resolve the credential from the environment and produce the
    /// connection config for [`crate::graph::RemoteGraph`].
    pub fn resolve(&self) -> Result<RemoteGraphConfig, ConfigError> {
        let password = std::env::var(&self.password_env)
            .map_err(|_| ConfigError::MissingCredential(self.password_env.clone()))?;

        Ok(RemoteGraphConfig {
            uri: self.uri.clone(),
            database: self.database.clone(),
            username: self.username.clone(),
            password,
            connect_timeout_seconds: self.connect_timeout_seconds,
            request_timeout_seconds: self.request_timeout_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_config_from_toml() {
        let config: PipelineConfig = toml::from_str(
            r#"
            data_dir = "./papers_data"

            [store]
            kind = "memory"
            graphml_out = "paper_graph.graphml"
            json_out = "paper_graph.json"

            [filter]
            scorer = "histogram_entropy"
            threshold = 2.5
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("./papers_data"));
        assert!(matches!(
            config.store,
            StoreConfig::Memory { graphml_out: Some(_), json_out: Some(_) }
        ));
        assert_eq!(config.filter.scorer, ScorerKind::HistogramEntropy);

        let filter = config.filter.build();
        assert_eq!(filter.scorer_name(), "histogram_entropy");
        assert!((filter.threshold() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_remote_config_from_toml() {
        let config: PipelineConfig = toml::from_str(
            r#"
            data_dir = "/srv/extracted"

            [store]
            kind = "remote"
            uri = "http://localhost:7474"
            username = "neo4j"
            password_env = "PAPERGRAPH_STORE_PASSWORD"
            "#,
        )
        .unwrap();

        let StoreConfig::Remote(remote) = config.store else {
            panic!("expected remote store config");
        };
        assert_eq!(remote.database, "neo4j");
        assert_eq!(remote.connect_timeout_seconds, 10);
    }

    #[test]
    fn test_defaults() {
        let config: PipelineConfig = toml::from_str(r#"data_dir = "x""#).unwrap();

        assert!(matches!(config.store, StoreConfig::Memory { .. }));
        assert_eq!(config.filter.scorer, ScorerKind::PixelCount);

        let filter = config.filter.build();
        assert!((filter.threshold() - DEFAULT_PIXEL_THRESHOLD).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_credential_is_an_error() {
        let remote = RemoteStoreConfig {
            uri: "http://localhost:7474".to_string(),
            database: default_database(),
            username: "neo4j".to_string(),
            password_env: "PAPERGRAPH_TEST_UNSET_VARIABLE".to_string(),
            connect_timeout_seconds: default_connect_timeout(),
            request_timeout_seconds: default_request_timeout(),
        };

        assert!(matches!(
            remote.resolve(),
            Err(ConfigError::MissingCredential(_))
        ));
    }
}
