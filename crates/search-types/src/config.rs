//! Configuration loading for workspace search.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `<config dir>/workspace-search/config.toml`.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::types::{IndexTarget, SearchMode};

/// Files larger than this are skipped during indexing (2 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 2 * 1024 * 1024;

/// Snippet window in characters.
pub const DEFAULT_SNIPPET_LENGTH: usize = 240;

/// BM25 tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Settings {
    /// Term-frequency saturation
    #[serde(default = "default_k1")]
    pub k1: f32,

    /// Length normalization strength, 0.0-1.0
    #[serde(default = "default_b")]
    pub b: f32,
}

fn default_k1() -> f32 {
    1.5
}

fn default_b() -> f32 {
    0.75
}

impl Default for Bm25Settings {
    fn default() -> Self {
        Self {
            k1: default_k1(),
            b: default_b(),
        }
    }
}

/// Default fusion weights for hybrid queries.
///
/// Missing values follow the per-query rule: one given weight implies
/// `1 - given` for the other, none given means 0.5 each.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HybridSettings {
    #[serde(default)]
    pub lexical_weight: Option<f32>,
    #[serde(default)]
    pub vector_weight: Option<f32>,
}

/// Embedding endpoint settings (OpenAI-compatible `/embeddings`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Model id sent to the endpoint
    pub model: String,

    /// API base URL
    #[serde(default)]
    pub base_url: Option<String>,

    /// Environment variable holding the API key (never stored in config)
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Requested output dimensions, if the model supports truncation
    #[serde(default)]
    pub dimensions: Option<usize>,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_embedding_timeout() -> u64 {
    60
}

/// Main search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub bm25: Bm25Settings,

    /// Per-file size limit in bytes; 0 disables the limit
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    #[serde(default = "default_snippet_length")]
    pub snippet_length: usize,

    /// Mode used when a query names none (hybrid if vectors are configured, else bm25)
    #[serde(default)]
    pub default_mode: Option<SearchMode>,

    #[serde(default)]
    pub hybrid: HybridSettings,

    /// Targets indexed lazily on first use
    #[serde(default)]
    pub auto_index: Vec<IndexTarget>,

    #[serde(default)]
    pub embedding: Option<EmbeddingSettings>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_file_bytes() -> u64 {
    DEFAULT_MAX_FILE_BYTES
}

fn default_snippet_length() -> usize {
    DEFAULT_SNIPPET_LENGTH
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            bm25: Bm25Settings::default(),
            max_file_bytes: default_max_file_bytes(),
            snippet_length: default_snippet_length(),
            default_mode: None,
            hybrid: HybridSettings::default(),
            auto_index: Vec::new(),
            embedding: None,
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (<config dir>/workspace-search/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (WORKSPACE_SEARCH_*, `__` between nested keys)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ConfigError> {
        let default_config_path = default_config_dir().join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())?
            .set_default("max_file_bytes", default_max_file_bytes())?
            .set_default("snippet_length", default_snippet_length() as u64)?
            .set_default("bm25.k1", default_k1() as f64)?
            .set_default("bm25.b", default_b() as f64)?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: WORKSPACE_SEARCH_LOG_LEVEL, WORKSPACE_SEARCH_BM25__K1, ...
        builder = builder.add_source(
            Environment::with_prefix("WORKSPACE_SEARCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bm25.k1 < 0.0 || !self.bm25.k1.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "bm25.k1 must be >= 0, got {}",
                self.bm25.k1
            )));
        }
        if !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(ConfigError::Invalid(format!(
                "bm25.b must be 0.0-1.0, got {}",
                self.bm25.b
            )));
        }
        for (name, weight) in [
            ("hybrid.lexical_weight", self.hybrid.lexical_weight),
            ("hybrid.vector_weight", self.hybrid.vector_weight),
        ] {
            if let Some(w) = weight {
                if !(0.0..=1.0).contains(&w) {
                    return Err(ConfigError::Invalid(format!(
                        "{name} must be 0.0-1.0, got {w}"
                    )));
                }
            }
        }
        if self.snippet_length == 0 {
            return Err(ConfigError::Invalid(
                "snippet_length must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_config_dir() -> PathBuf {
    ProjectDirs::from("", "", "workspace-search")
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.max_file_bytes, 2 * 1024 * 1024);
        assert_eq!(settings.snippet_length, 240);
        assert!((settings.bm25.k1 - 1.5).abs() < f32::EPSILON);
        assert!((settings.bm25.b - 0.75).abs() < f32::EPSILON);
        assert!(settings.default_mode.is_none());
        assert!(settings.embedding.is_none());
    }

    #[test]
    fn test_load_with_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.snippet_length, 240);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
snippet_length = 80
default_mode = "bm25"
auto_index = ["/notes", {{ path = "/src", glob = "**/*.rs" }}]

[bm25]
k1 = 1.2

[hybrid]
lexical_weight = 0.3
"#
        )
        .unwrap();

        let settings = Settings::load(Some(&file.path().to_string_lossy())).unwrap();
        assert_eq!(settings.snippet_length, 80);
        assert_eq!(settings.default_mode, Some(SearchMode::Bm25));
        assert!((settings.bm25.k1 - 1.2).abs() < 1e-6);
        assert!((settings.bm25.b - 0.75).abs() < 1e-6);
        assert_eq!(settings.hybrid.lexical_weight, Some(0.3));
        assert_eq!(settings.auto_index.len(), 2);
        assert_eq!(settings.auto_index[1].glob.as_deref(), Some("**/*.rs"));
    }

    #[test]
    fn test_validation() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.bm25.b = 1.5;
        assert!(settings.validate().is_err());

        settings.bm25.b = 0.5;
        settings.hybrid.vector_weight = Some(-0.1);
        assert!(settings.validate().is_err());

        settings.hybrid.vector_weight = Some(1.0);
        settings.snippet_length = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_embedding_settings_defaults() {
        let settings: EmbeddingSettings =
            serde_json::from_str(r#"{"model": "text-embedding-3-small"}"#).unwrap();
        assert_eq!(settings.api_key_env, "OPENAI_API_KEY");
        assert_eq!(settings.timeout_secs, 60);
        assert!(settings.base_url.is_none());
    }
}
