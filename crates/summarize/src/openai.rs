use crate::error::{Result, SummarizeError};
use crate::prompt::{user_prompt, SYSTEM_PROMPT};
use crate::service::SummarizationService;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI chat-completions settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpenAiConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,

    /// Sent as `OpenAI-Organization` when set
    pub organization: Option<String>,

    /// Never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4-1106-preview".to_string(),
            temperature: 0.0,
            organization: None,
            api_key: None,
            timeout_secs: 120,
        }
    }
}

impl OpenAiConfig {
    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("endpoint must not be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            ));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}

/// [`SummarizationService`] backed by OpenAI chat completions in JSON mode
pub struct OpenAiSummarizer {
    config: OpenAiConfig,
    api_key: String,
    client: Client,
}

impl OpenAiSummarizer {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        config.validate().map_err(SummarizeError::invalid_config)?;
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| SummarizeError::invalid_config("OPENAI_API_KEY is not set"))?
            .to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request_body<'a>(&'a self, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        }
    }
}

#[async_trait]
impl SummarizationService for OpenAiSummarizer {
    async fn summarize(&self, position: &str, text: &str) -> Result<String> {
        let user = user_prompt(position, text);
        let body = self.request_body(&user);

        let mut request = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body);
        if let Some(org) = &self.config.organization {
            request = request.header("OpenAI-Organization", org);
        }

        log::debug!(
            "Requesting summary for {position:?} ({} chars)",
            text.chars().count()
        );
        let response = request
            .send()
            .await
            .map_err(|err| SummarizeError::service(format!("request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(SummarizeError::service(format!(
                "OpenAI returned {status}: {detail}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| SummarizeError::service(format!("unreadable response: {err}")))?;
        Ok(completion_content(parsed))
    }
}

/// First non-null message content. A completion without any content comes back
/// empty and fails summary parsing, which is not retried.
fn completion_content(response: ChatResponse) -> String {
    let content = response
        .choices
        .into_iter()
        .find_map(|choice| choice.message.content);
    content.unwrap_or_else(|| {
        log::warn!("Completion has no content");
        String::new()
    })
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}
