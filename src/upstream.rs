//! The upstream vision model behind a narrow submit-prompt/receive-text seam.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::AnalyzeError;
use crate::prompt::ChatRequest;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// A chat-completion capable vision model.
///
/// Implementations return the raw reply text; interpreting it is the
/// caller's job.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, AnalyzeError>;
}

/// OpenAI-compatible chat completions endpoint.
pub struct OpenAiVision {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiVision {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[async_trait]
impl VisionModel for OpenAiVision {
    async fn complete(&self, request: &ChatRequest) -> Result<String, AnalyzeError> {
        debug!(model = %request.model, "Sending request to vision model");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "Vision model responded");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzeError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AnalyzeError::EmptyReply)
    }
}

/// Deterministic stand-in that answers every prompt the same way.
pub struct ScriptedModel {
    outcome: Outcome,
}

enum Outcome {
    Reply(String),
    Status(u16),
}

impl ScriptedModel {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Reply(text.into()),
        }
    }

    pub fn failing_with(status: u16) -> Self {
        Self {
            outcome: Outcome::Status(status),
        }
    }
}

#[async_trait]
impl VisionModel for ScriptedModel {
    async fn complete(&self, _request: &ChatRequest) -> Result<String, AnalyzeError> {
        match &self.outcome {
            Outcome::Reply(text) => Ok(text.clone()),
            Outcome::Status(status) => Err(AnalyzeError::UpstreamStatus {
                status: *status,
                body: String::new(),
            }),
        }
    }
}
