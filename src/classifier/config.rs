//! Classifier client configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP zero-shot classifier client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// API endpoint base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model to use for zero-shot classification
    #[serde(default = "default_model")]
    pub model: String,
    /// Bearer token for hosted endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_model() -> String {
    "facebook/bart-large-mnli".to_string()
}

fn default_timeout_secs() -> u64 {
    // Generous timeout; cold models can take a while to load
    120
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClassifierConfig {
    /// Pick up an API key from the environment if the config has none.
    pub fn with_env_api_key(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var("SURVCLASS_API_TOKEN").ok();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.model, "facebook/bart-large-mnli");
        assert_eq!(config.timeout_secs, 120);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let config: ClassifierConfig =
            toml::from_str("endpoint = \"http://localhost:8090\"").unwrap();
        assert_eq!(config.endpoint, "http://localhost:8090");
        assert_eq!(config.model, "facebook/bart-large-mnli");
    }
}
