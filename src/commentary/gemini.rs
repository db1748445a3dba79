//! HTTP commentary source speaking the `generateContent` JSON format.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::time::Duration;

use super::{prompt_for, CommentaryError, CommentarySource};
use crate::config::CommentaryConfig;
use crate::domains::tracker::Stats;

/// Largest response body read from the service.
const MAX_BODY_BYTES: u64 = 256 * 1024;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Commentary from a `generateContent`-compatible endpoint.
#[derive(Debug)]
pub struct GeminiCommentary {
    endpoint: String,
    api_key_env: String,
    api_key: Option<String>,
    agent: ureq::Agent,
}

impl GeminiCommentary {
    /// Build from configuration, reading the API key from the environment.
    #[must_use]
    pub fn from_config(config: &CommentaryConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::new(
            config.resolved_endpoint(),
            config.api_key_env.clone(),
            api_key,
            Duration::from_millis(config.timeout_ms),
        )
    }

    /// Create a source with an explicit key.
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        api_key_env: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key_env: api_key_env.into(),
            api_key,
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    /// Endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether an API key is available.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// JSON request body for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn request_body(prompt: &str) -> Result<String, CommentaryError> {
        let request = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };
        serde_json::to_string(&request).map_err(|e| CommentaryError::Malformed(e.to_string()))
    }

    /// Extract the generated text from a response body.
    ///
    /// # Errors
    ///
    /// Returns error if the body is not the expected JSON or holds no text.
    pub fn parse_response(body: &str) -> Result<String, CommentaryError> {
        let response: GenerateResponse =
            serde_json::from_str(body).map_err(|e| CommentaryError::Malformed(e.to_string()))?;
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(CommentaryError::EmptyText);
        }
        Ok(text.to_string())
    }
}

impl CommentarySource for GeminiCommentary {
    fn commentary(&self, stats: &Stats) -> Result<String, CommentaryError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CommentaryError::MissingApiKey {
                var: self.api_key_env.clone(),
            })?;
        let body = Self::request_body(&prompt_for(stats))?;

        let response = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .set("x-goog-api-key", key)
            .send_string(&body)
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => CommentaryError::Status { code },
                ureq::Error::Transport(t) => CommentaryError::Transport(t.to_string()),
            })?;

        let mut text = String::new();
        response
            .into_reader()
            .take(MAX_BODY_BYTES)
            .read_to_string(&mut text)
            .map_err(|e| CommentaryError::Transport(e.to_string()))?;

        Self::parse_response(&text)
    }
}
