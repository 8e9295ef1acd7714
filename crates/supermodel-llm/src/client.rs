//! Perplexity chat-completions client.
//!
//! Hand-addressed REST client for the Perplexity API (an OpenAI-style
//! chat/completions endpoint). Non-streaming: SQL generation wants the
//! complete statement, not deltas.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use supermodel_core::{AgentError, Message};
use tracing::debug;

use crate::{prompt, GeneratedSql, SqlGenerator};

const PERPLEXITY_API_URL: &str = "https://api.perplexity.ai/chat/completions";

/// A single message on the wire.
#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Converts any error into an AgentError::LlmError.
fn llm_err(e: impl ToString) -> AgentError {
    AgentError::LlmError(e.to_string())
}

/// Client for the Perplexity chat-completions API.
pub struct PerplexityClient {
    http: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl PerplexityClient {
    /// Creates a new client for the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            api_base: PERPLEXITY_API_URL.to_string(),
        }
    }

    /// Overrides the endpoint URL (mock servers in tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sends a completion request and returns the first choice's content.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AgentError> {
        let response = self
            .http
            .post(&self.api_base)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest { model: &self.model, messages })
            .send()
            .await
            .map_err(llm_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::LlmError(format!("API returned {status}")));
        }

        let body: ChatResponse = response.json().await.map_err(llm_err)?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| AgentError::ParseError("no choices in response".into()))
    }
}

#[async_trait]
impl SqlGenerator for PerplexityClient {
    async fn generate_sql(
        &self,
        question: &str,
        history: &[Message],
        user_id: i64,
    ) -> Result<GeneratedSql, AgentError> {
        let system = prompt::system_prompt(user_id);
        let messages = prompt::build_messages(&system, history, question);
        debug!("sending {} messages to {}", messages.len(), self.model);

        let raw = self.complete(&messages).await?;
        Ok(GeneratedSql::from_model_output(&raw))
    }
}
