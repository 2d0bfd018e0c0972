//! OpenAI-compatible chat completions, as served by GitHub Models.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use super::RemoteError;

/// One text-completion call.
#[derive(Clone, Copy, Debug)]
pub struct CompletionRequest<'a> {
    /// System message.
    pub system_message: &'a str,
    /// User message.
    pub user_message: &'a str,
    /// Model to run.
    pub model_id: &'a str,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token cap.
    pub max_tokens: u32,
}

/// Something that can turn a [`CompletionRequest`] into completion text.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Runs one completion. Any error means "this model failed".
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, RemoteError>;
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct ChatCompletionsRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
}

impl<'a> From<&CompletionRequest<'a>> for ChatCompletionsRequest<'a> {
    fn from(request: &CompletionRequest<'a>) -> Self {
        Self {
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system_message,
                },
                ChatMessage {
                    role: "user",
                    content: request.user_message,
                },
            ],
            model: request.model_id,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Deserialize, Debug)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Pulls `choices[0].message.content` out of a chat completions body.
fn first_choice_content(bytes: &[u8]) -> Result<String, RemoteError> {
    let parsed: ChatCompletionsResponse = serde_json::from_slice(bytes)
        .map_err(|err| RemoteError::Malformed(format!("Invalid completion JSON: {err}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| RemoteError::Malformed("Completion has no message content".to_string()))
}

/// Chat completions client authenticated with a bearer token.
#[derive(Clone, Debug)]
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl ChatCompletionsClient {
    /// Builds a client for `endpoint`.
    pub fn new(client: reqwest::Client, endpoint: Url, token: String) -> Self {
        Self {
            client,
            endpoint,
            token,
        }
    }
}

#[async_trait]
impl TextCompletion for ChatCompletionsClient {
    #[instrument(level = "debug", skip_all, fields(model = request.model_id))]
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, RemoteError> {
        let body = ChatCompletionsRequest::from(request);
        let resp = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        debug!("Completion response {status}, {} bytes", bytes.len());
        if !status.is_success() {
            return Err(RemoteError::from_status(
                status,
                String::from_utf8_lossy(&bytes).to_string(),
            ));
        }
        first_choice_content(&bytes)
    }
}
