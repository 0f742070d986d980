//! OpenAI chat-completions meal generator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::traits::MealGenerator;
use super::{
    SYSTEM_PROMPT, check_response, decode_error, finish_completion, require_credential,
    transport_error,
};
use crate::Result;

/// Default base URL for the OpenAI API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Meal generator backed by OpenAI chat completions.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: Option<String>,
    model: String,
    temperature: f32,
    base_url: String,
    http: Client,
}

impl OpenAiClient {
    /// Create a client. A missing key is reported when generating, not here.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl MealGenerator for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, prompt), fields(provider = "openai", model = %self.model))]
    async fn generate_meal_json(&self, prompt: &str) -> Result<String> {
        let api_key = require_credential(self.api_key.as_deref(), "OpenAI")?;
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages: [
                    ChatMessage {
                        role: "system",
                        content: SYSTEM_PROMPT,
                    },
                    ChatMessage {
                        role: "user",
                        content: prompt,
                    },
                ],
                temperature: self.temperature,
                response_format: ResponseFormat {
                    kind: "json_object",
                },
            })
            .send()
            .await
            .map_err(transport_error)?;

        let body: ChatResponse = check_response(response)
            .await?
            .json()
            .await
            .map_err(decode_error)?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);
        finish_completion(content)
    }
}
