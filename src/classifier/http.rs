//! HTTP zero-shot classifier client.
//!
//! Speaks the Hugging Face inference API shape for zero-shot
//! classification: `POST {endpoint}/models/{model}` with the text and
//! candidate labels, response carries parallel `labels`/`scores`
//! sequences. Works against the hosted API or any local server exposing
//! the same routes.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Classifier, ClassifierConfig, ClassifierError, LabelScore};

/// Classifier client backed by a Hugging Face style inference endpoint.
pub struct HttpClassifier {
    config: ClassifierConfig,
    client: Client,
}

/// Zero-shot request format.
#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [String],
    multi_label: bool,
}

/// Zero-shot response format: labels and scores are parallel sequences.
#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

/// Error payload returned by the inference API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: String,
}

impl HttpClassifier {
    /// Create a new classifier client with the given configuration.
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClassifierError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Check if the classification service is reachable.
    pub async fn is_available(&self) -> bool {
        let url = self.model_url();
        let mut request = self.client.get(&url);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }
        match request.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model_url(&self) -> String {
        format!(
            "{}/models/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<Vec<LabelScore>, ClassifierError> {
        if text.trim().is_empty() {
            return Err(ClassifierError::EmptyInput);
        }

        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: labels,
                multi_label: true,
            },
        };

        debug!("Classifying {} chars against {} labels", text.len(), labels.len());

        let url = self.model_url();
        let mut builder = self.client.post(&url).json(&request);
        if let Some(ref key) = self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| ClassifierError::Connection(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(ClassifierError::Api(format!("HTTP {status}: {detail}")));
        }

        let parsed: ZeroShotResponse = resp
            .json()
            .await
            .map_err(|e| ClassifierError::Parse(e.to_string()))?;

        if parsed.labels.len() != parsed.scores.len() {
            return Err(ClassifierError::Parse(format!(
                "{} labels but {} scores in response",
                parsed.labels.len(),
                parsed.scores.len()
            )));
        }

        Ok(parsed
            .labels
            .into_iter()
            .zip(parsed.scores)
            .map(|(label, score)| LabelScore { label, score })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let labels = vec!["myself".to_string(), "other people".to_string()];
        let request = ZeroShotRequest {
            inputs: "I felt anxious",
            parameters: ZeroShotParameters {
                candidate_labels: &labels,
                multi_label: true,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["inputs"], "I felt anxious");
        assert_eq!(json["parameters"]["multi_label"], true);
        assert_eq!(json["parameters"]["candidate_labels"][1], "other people");
    }

    #[test]
    fn test_response_deserialization() {
        let body = r#"{
            "sequence": "I felt anxious about my own performance",
            "labels": ["myself", "in general", "other people", "specific situations"],
            "scores": [0.8, 0.1, 0.05, 0.05]
        }"#;
        let parsed: ZeroShotResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.labels.len(), 4);
        assert_eq!(parsed.scores[0], 0.8);
    }

    #[test]
    fn test_model_url_trims_trailing_slash() {
        let classifier = HttpClassifier::new(ClassifierConfig {
            endpoint: "http://localhost:8090/".to_string(),
            ..ClassifierConfig::default()
        })
        .unwrap();
        assert_eq!(
            classifier.model_url(),
            "http://localhost:8090/models/facebook/bart-large-mnli"
        );
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let classifier = HttpClassifier::new(ClassifierConfig::default()).unwrap();
        let labels = vec!["myself".to_string()];
        let err = classifier.classify("   ", &labels).await.unwrap_err();
        assert!(matches!(err, ClassifierError::EmptyInput));
    }
}
