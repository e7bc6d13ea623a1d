//! Sentiment classifier abstraction
//!
//! Turns review text into a coarse label and a confidence score. Providers:
//! - `lexicon`: in-process word-list scoring (default)
//! - `openai`: prompted chat-completion call with defensive reply parsing
//! - `fixed`: constant answer for tests and offline runs
//!
//! Classification is best-effort enrichment, so `classify` has no error path:
//! anything unusable collapses into [`Classification::fallback`].

mod lexicon;
mod openai;

pub use crate::db::models::Sentiment;
pub use lexicon::LexiconClassifier;
pub use openai::{parse_reply, OpenAIClassifier};

use crate::config::ClassifierConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Confidence reported with the fallback label
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Label and confidence produced for one text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: Sentiment,
    /// Always within 0.0..=1.0
    pub confidence: f64,
}

impl Classification {
    /// Build a classification, clamping the confidence into range
    pub fn new(label: Sentiment, confidence: f64) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            DEFAULT_CONFIDENCE
        };

        Self { label, confidence }
    }

    /// `(NEUTRAL, 0.5)`
    pub fn fallback() -> Self {
        Self {
            label: Sentiment::Neutral,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

/// Why a classifier answered with the fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    Malformed,
    MissingField,
    UnknownLabel,
    InvalidConfidence,
    Transport,
    Timeout,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::Malformed => "malformed",
            FallbackReason::MissingField => "missing_field",
            FallbackReason::UnknownLabel => "unknown_label",
            FallbackReason::InvalidConfidence => "invalid_confidence",
            FallbackReason::Transport => "transport",
            FallbackReason::Timeout => "timeout",
        }
    }
}

/// Capability to classify review text
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify one text; never fails
    async fn classify(&self, text: &str) -> Classification;

    /// Provider name for logs and metrics
    fn provider(&self) -> &str;

    /// Readiness check; in-process providers are always ready
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Classifier that always gives the same answer
pub struct FixedClassifier {
    classification: Classification,
}

impl FixedClassifier {
    pub fn new(label: Sentiment, confidence: f64) -> Self {
        Self {
            classification: Classification::new(label, confidence),
        }
    }
}

impl Default for FixedClassifier {
    fn default() -> Self {
        Self {
            classification: Classification::fallback(),
        }
    }
}

#[async_trait]
impl SentimentClassifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> Classification {
        self.classification
    }

    fn provider(&self) -> &str {
        "fixed"
    }
}

/// Create a classifier based on configuration
pub fn create_classifier(config: &ClassifierConfig) -> Result<Arc<dyn SentimentClassifier>> {
    match config.provider.as_str() {
        "lexicon" => {
            let classifier = match config.lexicon_path.as_deref() {
                Some(path) => LexiconClassifier::with_lexicon_file(path)?,
                None => LexiconClassifier::new(),
            };
            Ok(Arc::new(classifier))
        }
        "openai" => {
            let key = config.api_key.clone().ok_or_else(|| AppError::Configuration {
                message: "classifier.api_key (or OPENAI_API_KEY) is required for the openai provider".to_string(),
            })?;
            Ok(Arc::new(OpenAIClassifier::new(
                key,
                config.model.clone(),
                config.api_base.clone(),
                config.timeout(),
            )?))
        }
        "fixed" => Ok(Arc::new(FixedClassifier::default())),
        other => Err(AppError::Configuration {
            message: format!("Unknown classifier provider: {}", other),
        }),
    }
}
