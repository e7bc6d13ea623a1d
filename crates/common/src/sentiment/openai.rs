//! Remote classifier over an OpenAI-compatible chat-completion API
//!
//! The model is asked for `{"label": ..., "confidence": ...}`. Replies are
//! parsed defensively and every failure, including transport errors and the
//! call timeout, degrades to the neutral fallback.

use super::{Classification, FallbackReason, Sentiment, SentimentClassifier};
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are a sentiment classifier for movie reviews. \
Answer with one JSON object and nothing else, in the form \
{\"label\": \"POSITIVE\" | \"NEUTRAL\" | \"NEGATIVE\", \"confidence\": <number from 0 to 1>}.";

/// OpenAI chat-completion classifier
pub struct OpenAIClassifier {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Loosely typed verdict; the model does not always follow the schema
#[derive(Deserialize)]
struct RawVerdict {
    #[serde(default)]
    label: Option<Value>,
    #[serde(default)]
    confidence: Option<Value>,
}

impl OpenAIClassifier {
    /// Create a new classifier; `timeout` bounds each call end to end
    pub fn new(api_key: String, model: String, base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to build classifier HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn timeout_error(&self) -> AppError {
        AppError::ClassifierTimeout {
            timeout_ms: self.timeout.as_millis() as u64,
        }
    }

    /// Send the prompt and return the raw reply text
    async fn request(&self, text: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!(
                        "Classify the sentiment of this movie review.\n\nReview:\n\"\"\"\n{}\n\"\"\"",
                        text
                    ),
                },
            ],
            temperature: 0.0,
        };

        let response = self.client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.timeout_error()
                } else {
                    AppError::ClassifierError {
                        message: format!("Request failed: {}", e),
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ClassifierError {
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: ChatResponse = response.json().await.map_err(|e| {
            AppError::ClassifierError {
                message: format!("Failed to parse response: {}", e),
            }
        })?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::ClassifierError {
                message: "Empty response".to_string(),
            })
    }

    fn fallback(&self, reason: FallbackReason, detail: &str) -> Classification {
        tracing::warn!(
            provider = "openai",
            reason = reason.as_str(),
            detail = %detail,
            "Classifier fell back to neutral default"
        );
        metrics::record_classifier_fallback("openai", reason.as_str());
        Classification::fallback()
    }
}

#[async_trait]
impl SentimentClassifier for OpenAIClassifier {
    async fn classify(&self, text: &str) -> Classification {
        let reply = match tokio::time::timeout(self.timeout, self.request(text)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e @ AppError::ClassifierTimeout { .. })) => {
                return self.fallback(FallbackReason::Timeout, &e.to_string());
            }
            Ok(Err(e)) => return self.fallback(FallbackReason::Transport, &e.to_string()),
            Err(_) => {
                return self.fallback(FallbackReason::Timeout, &self.timeout_error().to_string());
            }
        };

        match parse_reply(&reply) {
            Ok(classification) => classification,
            Err(reason) => self.fallback(reason, &reply),
        }
    }

    fn provider(&self) -> &str {
        "openai"
    }

    /// Lists models to confirm the endpoint is reachable and the key accepted
    async fn ping(&self) -> Result<()> {
        let url = format!("{}/models", self.base_url);

        let request = self.client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send();

        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| AppError::ClassifierError {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(AppError::ClassifierError {
                message: format!("API error {}", response.status()),
            });
        }

        Ok(())
    }
}

/// Extract a classification from the model's reply.
///
/// The JSON object may be surrounded by prose or code fences. Labels match
/// case-insensitively; confidence may be a number or a numeric string and is
/// clamped into 0.0..=1.0.
pub fn parse_reply(reply: &str) -> std::result::Result<Classification, FallbackReason> {
    let start = reply.find('{').ok_or(FallbackReason::Malformed)?;
    let end = reply.rfind('}').ok_or(FallbackReason::Malformed)?;
    if end < start {
        return Err(FallbackReason::Malformed);
    }

    let verdict: RawVerdict =
        serde_json::from_str(&reply[start..=end]).map_err(|_| FallbackReason::Malformed)?;

    let label = match verdict.label {
        None => return Err(FallbackReason::MissingField),
        Some(Value::String(label)) => {
            Sentiment::from_label(&label).ok_or(FallbackReason::UnknownLabel)?
        }
        Some(_) => return Err(FallbackReason::UnknownLabel),
    };

    let confidence = match verdict.confidence {
        None => return Err(FallbackReason::MissingField),
        Some(Value::Number(n)) => n.as_f64().ok_or(FallbackReason::InvalidConfidence)?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| FallbackReason::InvalidConfidence)?,
        Some(_) => return Err(FallbackReason::InvalidConfidence),
    };

    if !confidence.is_finite() {
        return Err(FallbackReason::InvalidConfidence);
    }

    Ok(Classification::new(label, confidence))
}
