//! Retrieval-Augmented Generation Clients
//!
//! The controller only ever sees the `RagClient` trait: hand it a query and an
//! instruction, get generated text back. Retrieval, embeddings and the LLM
//! transport live behind it.
//!
//! - `lightrag`: a LightRAG server reached over HTTP.
//! - `completion`: any OpenAI-compatible chat endpoint, without retrieval.
//! - `scripted`: deterministic replies for development and tests.

pub mod completion;
pub mod lightrag;
pub mod scripted;

use anyhow::Result;
use async_trait::async_trait;

pub use completion::CompletionRagClient;
pub use lightrag::{LightRagClient, LightRagConfig};
pub use scripted::{RecordedQuery, ScriptedRagClient};

/// Defines the contract for any retrieval-plus-generation backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RagClient: Send + Sync {
    /// One-time setup. Calling it again after a success must be a no-op.
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Answers `query`, steered by `instruction`.
    async fn query(&self, query: &str, instruction: &str) -> Result<String>;
}

/// Folds the instruction into the query the way LightRAG expects a
/// user-prompt prefix: `/[instruction] query`.
pub fn composite_query(query: &str, instruction: &str) -> String {
    format!("/[{}] {}", instruction, query)
}
