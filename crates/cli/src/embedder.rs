use async_trait::async_trait;
use docqa_vector_store::{Embedding, EmbeddingProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ENV_EMBEDDING_URL: &str = "DOCQA_EMBEDDING_URL";
pub const DEFAULT_EMBEDDING_URL: &str = "http://127.0.0.1:8000/get-embedding";

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Embedding provider backed by an HTTP endpoint.
///
/// Sends `POST {"text": ...}` and expects `{"embedding": [...]}` back.
pub struct HttpEmbedder {
    client: reqwest::Client,
    url: String,
}

impl HttpEmbedder {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn request(&self, text: &str) -> reqwest::Result<Embedding> {
        let response = self
            .client
            .post(&self.url)
            .json(&EmbeddingRequest { text })
            .send()
            .await?
            .error_for_status()?;
        let body: EmbeddingResponse = response.json().await?;
        Ok(body.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedder {
    async fn embed(&self, text: &str) -> Option<Embedding> {
        match self.request(text).await {
            Ok(embedding) if embedding.is_empty() => {
                log::error!("Embedding endpoint {} returned an empty vector", self.url);
                None
            }
            Ok(embedding) => {
                log::debug!("Generated embedding of length {}", embedding.len());
                Some(embedding)
            }
            Err(err) => {
                log::error!("Error getting embedding from {}: {err}", self.url);
                None
            }
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
