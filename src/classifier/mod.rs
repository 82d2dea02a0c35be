//! Zero-shot text classification capability.
//!
//! The annotator only depends on the [`Classifier`] trait; the concrete
//! backend is an implementation detail. The shipped provider speaks the
//! Hugging Face inference API over HTTP, but anything that can score a
//! text against a fixed label set independently per label (multi-label,
//! scores need not sum to one) is substitutable.

mod config;
mod http;

use async_trait::async_trait;
use thiserror::Error;

pub use config::ClassifierConfig;
pub use http::HttpClassifier;

/// One label's score for a classified text.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Errors that can occur during classification.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Failed to reach the classification service
    #[error("Connection error: {0}")]
    Connection(String),

    /// Service returned an error
    #[error("API error: {0}")]
    Api(String),

    /// Failed to parse the service response
    #[error("Parse error: {0}")]
    Parse(String),

    /// Input text was empty; the backing model rejects empty sequences
    #[error("Empty input text")]
    EmptyInput,
}

/// A zero-shot classifier scoring a text against candidate labels.
///
/// Implementations must return one score per requested label. Callers
/// pair results by label identity, so output order is unconstrained.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<Vec<LabelScore>, ClassifierError>;
}
