//! Ollama generate-API client.
//!
//! Talks to a locally-hosted Ollama server over its non-streaming
//! `/api/generate` endpoint.

use crate::config::OllamaConfig;
use crate::error::{GraderError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Generation options forwarded to the model.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateOptions {
    /// Context window size hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
}

/// A single generate request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
    /// Always false; the grader consumes whole replies.
    pub stream: bool,
}

impl GenerateRequest {
    /// Build a request with no system prompt and no options.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: false,
        }
    }

    /// Attach a system instruction.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Attach a context window hint.
    pub fn with_num_ctx(mut self, num_ctx: u32) -> Self {
        self.options = Some(GenerateOptions {
            num_ctx: Some(num_ctx),
        });
        self
    }
}

/// Response from the generate endpoint.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    #[allow(dead_code)]
    done: bool,
}

/// Ollama API error response.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: String,
}

/// Client for the Ollama generate API.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    /// Create a new client with the given configuration.
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Get the generate endpoint URL.
    fn endpoint(&self) -> String {
        let base = self.config.host.trim_end_matches('/');
        format!("{}/api/generate", base)
    }

    /// The configured context window hint.
    pub fn num_ctx(&self) -> u32 {
        self.config.num_ctx
    }

    /// Send a generate request and return the raw reply text.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Try to parse as API error
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&body) {
                return Err(GraderError::OllamaApi(format!(
                    "API error ({}): {}",
                    status, api_error.error
                )));
            }
            return Err(GraderError::OllamaApi(format!(
                "Request failed ({}): {}",
                status, body
            )));
        }

        let generated: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| GraderError::OllamaApi(format!("Malformed response body: {}", e)))?;

        Ok(generated.response)
    }

    /// Test connectivity to the server.
    pub async fn test_connection(&self, model: &str) -> Result<()> {
        let request = GenerateRequest::new(model, "Say 'hello' and nothing else.");

        let response = self.generate(&request).await?;

        if response.to_lowercase().contains("hello") {
            Ok(())
        } else {
            Err(GraderError::OllamaApi(format!(
                "Unexpected response: {}",
                response
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_construction() {
        let config = OllamaConfig {
            host: "http://localhost:11434/".to_string(),
            num_ctx: 4096,
        };
        let client = OllamaClient::new(config);
        assert_eq!(client.endpoint(), "http://localhost:11434/api/generate");

        // Without trailing slash
        let config2 = OllamaConfig {
            host: "http://localhost:11434".to_string(),
            num_ctx: 4096,
        };
        let client2 = OllamaClient::new(config2);
        assert_eq!(client2.endpoint(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateRequest::new("gemma3:27b", "grade this")
            .with_system("you are a teacher")
            .with_num_ctx(40950);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gemma3:27b");
        assert_eq!(json["system"], "you are a teacher");
        assert_eq!(json["options"]["num_ctx"], 40950);
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_request_omits_empty_fields() {
        let request = GenerateRequest::new("gemma3:27b", "grade this");
        let json = serde_json::to_value(&request).unwrap();

        assert!(json.get("system").is_none());
        assert!(json.get("options").is_none());
    }
}
