use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{GenerationError, TextGenerator};
use crate::config::PanelConfig;

/// Ollama HTTP client bound to a single model.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a client for `model` on the Ollama instance at `base_url`.
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn from_config(config: &PanelConfig) -> Result<Self, GenerationError> {
        Self::new(&config.ollama_url, &config.model, config.request_timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Names of every model the instance has pulled.
    pub fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    /// Whether the bound model (or a tagged variant of it) is pulled.
    pub fn is_model_available(&self) -> Result<bool, GenerationError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|m| m.starts_with(&self.model)))
    }

    fn map_send_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_connect() {
            GenerationError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            GenerationError::Http(format!("Request timed out after {}s", self.timeout_secs))
        } else {
            GenerationError::Http(e.to_string())
        }
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl TextGenerator for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "Ollama generate");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            if status.as_u16() == 404 {
                return Err(GenerationError::NoModel(self.model.clone()));
            }
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;

        if parsed.response.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_keeps_model_and_timeout() {
        let client = OllamaClient::new("http://localhost:11434", "medllama2", 120).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.model(), "medllama2");
        assert_eq!(client.timeout_secs, 120);
    }

    #[test]
    fn trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", "medllama2", 60).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn from_config_uses_configured_endpoint() {
        let config = PanelConfig {
            ollama_url: "http://10.0.0.5:11434".into(),
            model: "meditron".into(),
            ..PanelConfig::default()
        };
        let client = OllamaClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://10.0.0.5:11434");
        assert_eq!(client.model(), "meditron");
    }

    #[test]
    fn generate_request_serializes_without_streaming() {
        let body = OllamaGenerateRequest {
            model: "medllama2",
            prompt: "hello",
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "medllama2");
        assert_eq!(json["prompt"], "hello");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn tags_response_parses_model_names() {
        let parsed: OllamaTagsResponse = serde_json::from_str(
            r#"{"models":[{"name":"medllama2:latest","size":1},{"name":"llama3:8b"}]}"#,
        )
        .unwrap();
        let names: Vec<String> = parsed.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["medllama2:latest", "llama3:8b"]);
    }

    #[test]
    fn unreachable_instance_is_a_generation_error() {
        // Port 9 (discard) is not an Ollama instance; the call must fail, not panic.
        let client = OllamaClient::new("http://127.0.0.1:9", "medllama2", 1).unwrap();
        assert!(client.generate("ping").is_err());
    }
}
