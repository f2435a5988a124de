use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MISTRAL_URL: &str = "https://api.mistral.ai";
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

const USER_AGENT: &str = "Uplift/1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 500;

// --- Error taxonomy ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    Timeout,
    QuotaExceeded,
    SafetyBlocked,
    Malformed,
    Unknown,
}

impl std::fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            GenerationErrorKind::Timeout => "timeout",
            GenerationErrorKind::QuotaExceeded => "quota exceeded",
            GenerationErrorKind::SafetyBlocked => "safety blocked",
            GenerationErrorKind::Malformed => "malformed response",
            GenerationErrorKind::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
#[error("generation failed ({kind}): {message}")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub message: String,
}

impl GenerationError {
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn malformed(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Malformed, message)
    }

    fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(GenerationErrorKind::Timeout, "provider request timed out")
        } else {
            Self::new(GenerationErrorKind::Unknown, err.to_string())
        }
    }

    fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let kind = if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            GenerationErrorKind::QuotaExceeded
        } else {
            GenerationErrorKind::Unknown
        };
        Self::new(kind, format!("provider returned status {status}: {body}"))
    }
}

// --- Generator capability ---

/// Output of a generation call. Adapters return raw text with `title` unset;
/// splitting a headline out of the text is the refresh gate's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub title: Option<String>,
    pub body: String,
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedContent, GenerationError>;
}

/// Which provider backs the `Generator`, selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Provider {
    Gemini,
    Mistral,
}

impl Provider {
    pub fn base_url(self) -> &'static str {
        match self {
            Provider::Gemini => GEMINI_URL,
            Provider::Mistral => MISTRAL_URL,
        }
    }

    pub fn build(
        self,
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        model: String,
    ) -> Arc<dyn Generator> {
        match self {
            Provider::Gemini => Arc::new(GeminiGenerator {
                client,
                base_url,
                api_key,
                model,
            }),
            Provider::Mistral => Arc::new(MistralGenerator {
                client,
                base_url,
                api_key,
                model,
            }),
        }
    }
}

// --- Mistral-style chat completions ---

pub struct MistralGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[async_trait]
impl Generator for MistralGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedContent, GenerationError> {
        let request_body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("User-Agent", USER_AGENT)
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| GenerationError::from_transport(&e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(unreadable body)".to_string());
            return Err(GenerationError::from_status(status, &body));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::malformed(format!("failed to parse response: {e}")))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        text_to_content(&content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

// --- Gemini generateContent ---

pub struct GeminiGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedContent, GenerationError> {
        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_TOKENS,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .header("User-Agent", USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| GenerationError::from_transport(&e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(unreadable body)".to_string());
            return Err(GenerationError::from_status(status, &body));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::malformed(format!("failed to parse response: {e}")))?;

        gemini_text(gemini_response).and_then(|text| text_to_content(&text))
    }
}

fn gemini_text(response: GeminiResponse) -> Result<String, GenerationError> {
    if let Some(feedback) = &response.prompt_feedback
        && let Some(reason) = &feedback.block_reason
    {
        return Err(GenerationError::new(
            GenerationErrorKind::SafetyBlocked,
            format!("prompt blocked by provider: {reason}"),
        ));
    }

    let Some(candidate) = response.candidates.into_iter().flatten().next() else {
        return Err(GenerationError::malformed("response had no candidates"));
    };

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(GenerationError::new(
            GenerationErrorKind::SafetyBlocked,
            "candidate blocked for safety",
        ));
    }

    let text = candidate
        .content
        .and_then(|c| c.parts.into_iter().flatten().next())
        .and_then(|p| p.text)
        .unwrap_or_default();

    Ok(text)
}

fn text_to_content(text: &str) -> Result<GeneratedContent, GenerationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::malformed(
            "provider returned an empty response",
        ));
    }
    Ok(GeneratedContent {
        title: None,
        body: trimmed.to_string(),
    })
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Option<Vec<GeminiCandidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Option<Vec<GeminiResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiPromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}
