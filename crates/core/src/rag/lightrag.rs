use super::{RagClient, composite_query};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Connection settings for a LightRAG server.
#[derive(Debug, Clone)]
pub struct LightRagConfig {
    /// Base URL, e.g. `http://localhost:9621`.
    pub base_url: String,
    pub api_key: Option<String>,
    /// Retrieval mode: `naive`, `local`, `global`, `hybrid` or `mix`.
    pub mode: String,
    pub timeout: Option<Duration>,
}

impl LightRagConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            mode: "hybrid".to_string(),
            timeout: None,
        }
    }
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    mode: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    response: String,
}

/// A `RagClient` backed by the LightRAG HTTP API.
pub struct LightRagClient {
    http: reqwest::Client,
    config: LightRagConfig,
    ready: OnceCell<()>,
}

impl LightRagClient {
    pub fn new(config: LightRagConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            config,
            ready: OnceCell::new(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header("X-API-Key", key),
            None => request,
        }
    }
}

#[async_trait]
impl RagClient for LightRagClient {
    async fn initialize(&self) -> Result<()> {
        self.ready
            .get_or_try_init(|| async {
                let url = self.endpoint("health");
                self.authorized(self.http.get(&url))
                    .send()
                    .await
                    .with_context(|| format!("LightRAG server unreachable at {}", url))?
                    .error_for_status()
                    .context("LightRAG health check failed")?;
                info!(base_url = %self.config.base_url, "LightRAG server is ready");
                Ok::<(), anyhow::Error>(())
            })
            .await?;
        Ok(())
    }

    async fn query(&self, query: &str, instruction: &str) -> Result<String> {
        let composite = composite_query(query, instruction);
        debug!(
            query_len = query.len(),
            instruction_len = instruction.len(),
            "Sending LightRAG query"
        );

        let body = QueryRequest {
            query: &composite,
            mode: &self.config.mode,
        };
        let response: QueryResponse = self
            .authorized(self.http.post(self.endpoint("query")).json(&body))
            .send()
            .await
            .context("LightRAG query request failed")?
            .error_for_status()
            .context("LightRAG returned an error status")?
            .json()
            .await
            .context("LightRAG response was not valid JSON")?;

        Ok(response.response)
    }
}
