//! Provider implementations.
//!
//! - [`SpoonacularClient`]: recipe API ([`RecipeSource`]).
//! - [`OpenAiClient`], [`GeminiClient`]: interchangeable AI meal generators
//!   ([`MealGenerator`]), selected explicitly through [`AiProvider`].

pub mod fences;
pub mod gemini;
pub mod openai;
pub mod spoonacular;
pub mod traits;

pub use fences::strip_code_fences;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use spoonacular::SpoonacularClient;
pub use traits::{FindOptions, MealGenerator, RecipeSource};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Error as ReqwestError, Response};
use serde::{Deserialize, Serialize};

use crate::{LarderError, Result};

/// System instruction sent with every meal-generation prompt.
pub(crate) const SYSTEM_PROMPT: &str = "You are a nutrition assistant that designs meals and \
recipes. Reply with a single JSON document and nothing else: no prose, no markdown.";

/// Known AI meal-generation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    OpenAi,
    Gemini,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::OpenAi => "openai",
            AiProvider::Gemini => "gemini",
        }
    }

    /// Environment variable conventionally holding this provider's key.
    pub fn env_var(&self) -> &'static str {
        match self {
            AiProvider::OpenAi => "OPENAI_API_KEY",
            AiProvider::Gemini => "GEMINI_API_KEY",
        }
    }

    /// Build the generator for this provider against its public endpoint.
    pub fn build(self, credential: Option<String>) -> Arc<dyn MealGenerator> {
        match self {
            AiProvider::OpenAi => Arc::new(OpenAiClient::new(credential)),
            AiProvider::Gemini => Arc::new(GeminiClient::new(credential)),
        }
    }

    /// Build the generator for this provider against `base_url`.
    pub fn build_with_base_url(
        self,
        credential: Option<String>,
        base_url: impl Into<String>,
    ) -> Arc<dyn MealGenerator> {
        match self {
            AiProvider::OpenAi => Arc::new(OpenAiClient::with_base_url(credential, base_url)),
            AiProvider::Gemini => Arc::new(GeminiClient::with_base_url(credential, base_url)),
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiProvider {
    type Err = LarderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(AiProvider::OpenAi),
            "gemini" | "google" => Ok(AiProvider::Gemini),
            other => Err(LarderError::Configuration(format!(
                "unknown AI provider '{other}'"
            ))),
        }
    }
}

/// Map a non-success status to the matching error; pass successes through.
pub(crate) async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        code @ (401 | 403) => Err(LarderError::AuthenticationFailed { status: code }),
        429 => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(LarderError::RateLimited { retry_after })
        }
        code => {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            };
            Err(LarderError::Api {
                status: code,
                message,
            })
        }
    }
}

/// Transport failure. The URL is dropped so credentials never reach the message.
pub(crate) fn transport_error(err: ReqwestError) -> LarderError {
    LarderError::Http(err.without_url().to_string())
}

/// Body decoding failure, without the request URL.
pub(crate) fn decode_error(err: ReqwestError) -> LarderError {
    LarderError::Parse(err.without_url().to_string())
}

/// The credential, or a configuration error if it is absent or blank.
pub(crate) fn require_credential<'a>(key: Option<&'a str>, provider: &str) -> Result<&'a str> {
    key.map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| LarderError::Configuration(format!("{provider} API key is not configured")))
}

/// Strip fences from a completion and reject empty ones.
pub(crate) fn finish_completion(content: Option<String>) -> Result<String> {
    let content = content.ok_or(LarderError::EmptyResponse)?;
    let stripped = strip_code_fences(&content);
    if stripped.is_empty() {
        return Err(LarderError::EmptyResponse);
    }
    Ok(stripped.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_round_trip() {
        for provider in [AiProvider::OpenAi, AiProvider::Gemini] {
            assert_eq!(provider.as_str().parse::<AiProvider>().unwrap(), provider);
        }
        assert!("claude".parse::<AiProvider>().is_err());
    }

    #[test]
    fn factory_builds_named_generators() {
        assert_eq!(AiProvider::OpenAi.build(None).name(), "openai");
        assert_eq!(AiProvider::Gemini.build(None).name(), "gemini");
    }

    #[test]
    fn blank_credentials_rejected() {
        assert!(require_credential(None, "OpenAI").is_err());
        assert!(require_credential(Some("   "), "OpenAI").is_err());
        assert_eq!(require_credential(Some(" sk-1 "), "OpenAI").unwrap(), "sk-1");
    }

    #[test]
    fn completion_is_fence_stripped() {
        let out = finish_completion(Some("```json\n{\"meals\": []}\n```".into())).unwrap();
        assert_eq!(out, "{\"meals\": []}");
    }

    #[test]
    fn empty_completion_rejected() {
        assert!(matches!(
            finish_completion(None),
            Err(LarderError::EmptyResponse)
        ));
        assert!(matches!(
            finish_completion(Some("```json\n```".into())),
            Err(LarderError::EmptyResponse)
        ));
    }
}
