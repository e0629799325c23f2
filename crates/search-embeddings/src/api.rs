//! Embedder for OpenAI-compatible `/embeddings` endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use search_types::EmbeddingSettings;

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingAdapter};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for [`ApiEmbedder`].
#[derive(Debug, Clone)]
pub struct ApiEmbedderConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Model id (e.g., "text-embedding-3-small")
    pub model: String,

    /// Bearer token; omitted from requests when `None`
    pub api_key: Option<SecretString>,

    /// Requested output size; responses of another size are rejected
    pub dimensions: Option<usize>,

    /// Request timeout
    pub timeout: Duration,
}

impl ApiEmbedderConfig {
    /// Config for the OpenAI API with an explicit key.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key: Some(SecretString::from(api_key.into())),
            dimensions: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Config for a bare model id, with the key taken from `OPENAI_API_KEY`.
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key: key_from_env("OPENAI_API_KEY"),
            dimensions: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Build from loaded settings, reading the key from `api_key_env`.
    pub fn from_settings(settings: &EmbeddingSettings) -> Self {
        Self {
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: settings.model.clone(),
            api_key: key_from_env(&settings.api_key_env),
            dimensions: settings.dimensions,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

fn key_from_env(var: &str) -> Option<SecretString> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Some(SecretString::from(key)),
        _ => {
            debug!(var = %var, "No embedding API key in environment");
            None
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

/// HTTP embedding adapter. Each call is a single request; failures are not retried.
pub struct ApiEmbedder {
    client: Client,
    config: ApiEmbedderConfig,
}

impl ApiEmbedder {
    pub fn new(config: ApiEmbedderConfig) -> Result<Self, EmbeddingError> {
        if config.model.trim().is_empty() {
            return Err(EmbeddingError::Config("model id is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiEmbedderConfig {
        &self.config
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));
        let body = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
            dimensions: self.config.dimensions,
        };

        debug!(model = %self.config.model, count = texts.len(), "Requesting embeddings");

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {}", key.expose_secret()));
        }
        let response = request.send().await?;

        if response.status() == 429 {
            return Err(EmbeddingError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api { status, body });
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Parse(e.to_string()))?;

        if parsed.data.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: parsed.data.len(),
            });
        }

        let mut data = parsed.data;
        if data.iter().all(|d| d.index.is_some()) {
            data.sort_by_key(|d| d.index);
        }

        data.into_iter()
            .map(|d| {
                if let Some(expected) = self.config.dimensions {
                    if d.embedding.len() != expected {
                        return Err(EmbeddingError::DimensionMismatch {
                            expected,
                            actual: d.embedding.len(),
                        });
                    }
                }
                Ok(Embedding::new(d.embedding))
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingAdapter for ApiEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut out = self.request(&[text.to_string()]).await?;
        out.pop()
            .ok_or_else(|| EmbeddingError::Parse("No embedding in response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }
}
