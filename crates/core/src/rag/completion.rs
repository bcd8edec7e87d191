use super::RagClient;
use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use tracing::debug;

/// A `RagClient` for any OpenAI-compatible API (OpenRouter, OpenAI, Gemini).
///
/// There is no retrieval step: the instruction becomes the system message and
/// the query the user message. Useful when no LightRAG server is running.
pub struct CompletionRagClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl CompletionRagClient {
    /// Creates a new completion client.
    ///
    /// # Arguments
    ///
    /// * `config` - API key and base URL of the service.
    /// * `model` - Model identifier, e.g. `"google/gemini-2.5-flash"`.
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl RagClient for CompletionRagClient {
    async fn query(&self, query: &str, instruction: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(instruction)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(query)
                    .build()?
                    .into(),
            ])
            .build()?;

        debug!(model = %self.model, "Sending chat completion");
        let response = self.client.chat().create(request).await?;

        let answer = response
            .choices
            .first()
            .context("No response choice from LLM")?
            .message
            .content
            .clone()
            .context("No content in LLM response")?;

        Ok(answer)
    }
}
