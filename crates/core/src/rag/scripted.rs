use super::RagClient;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One call received by a `ScriptedRagClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedQuery {
    pub query: String,
    pub instruction: String,
}

/// A `RagClient` that replays queued replies.
///
/// Useful for development and integration testing without a RAG server or
/// API costs. Every call is recorded so prompts can be inspected afterwards.
#[derive(Default)]
pub struct ScriptedRagClient {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<RecordedQuery>>,
    init_calls: AtomicUsize,
}

impl ScriptedRagClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queues a collaborator failure.
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    pub fn push(&self, reply: Result<String, String>) {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<RecordedQuery> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RagClient for ScriptedRagClient {
    async fn initialize(&self) -> Result<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn query(&self, query: &str, instruction: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedQuery {
                query: query.to_string(),
                instruction: instruction.to_string(),
            });

        let next = self
            .replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no scripted reply left")),
        }
    }
}
