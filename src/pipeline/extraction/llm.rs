use serde::{Deserialize, Serialize};

use super::ExtractionError;
use crate::config::LlmConfig;

/// LLM completion client abstraction (allows mocking).
pub trait LlmClient: Send + Sync {
    fn complete(&self, system: &str, prompt: &str) -> Result<String, ExtractionError>;

    /// Whether a credential is present. Checked by the pre-flight so callers
    /// can skip the request cycle entirely.
    fn is_configured(&self) -> bool;
}

/// HTTP client for an OpenAI-compatible chat-completions endpoint.
pub struct ChatApiClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

/// Near-deterministic sampling: consistency over creativity.
const COMPLETION_TEMPERATURE: f32 = 0.1;

impl ChatApiClient {
    pub fn new(config: &LlmConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            model: config.model.clone(),
            client,
            timeout_secs: config.timeout_secs,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl LlmClient for ChatApiClient {
    fn complete(&self, system: &str, prompt: &str) -> Result<String, ExtractionError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ExtractionError::ServiceUnavailable("no API credential configured".into())
        })?;

        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: COMPLETION_TEMPERATURE,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractionError::ServiceUnavailable(format!(
                        "request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    ExtractionError::ServiceUnavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            // Auth, quota, and upstream outages all land here; the upload
            // itself must not be blocked by any of them.
            let body = response.text().unwrap_or_default();
            return Err(ExtractionError::ServiceUnavailable(format!(
                "completion endpoint returned {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ExtractionError::MalformedResponse("no completion choices".into()))
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Mock LLM client for testing — returns a configurable response.
pub struct MockLlmClient {
    response: String,
    configured: bool,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            configured: true,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            response: String::new(),
            configured: false,
        }
    }
}

impl LlmClient for MockLlmClient {
    fn complete(&self, _system: &str, _prompt: &str) -> Result<String, ExtractionError> {
        if !self.configured {
            return Err(ExtractionError::ServiceUnavailable(
                "no API credential configured".into(),
            ));
        }
        Ok(self.response.clone())
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}
