use crate::config::LlmConfig;
use crate::llm::prompts::ChatPrompt;
use crate::llm::{LlmBackend, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

pub struct OllamaProvider {
    client: reqwest::Client,
    api_url: String,
    model: String,
}

#[derive(Serialize, Debug)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    format: &'static str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize, Debug)]
struct OllamaMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct OllamaResponse {
    message: OllamaReply,
}

#[derive(Deserialize, Debug)]
struct OllamaReply {
    #[serde(default)]
    content: String,
}

impl OllamaProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_url = config
            .api_url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434/api/chat".to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            api_url,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl LlmBackend for OllamaProvider {
    async fn complete_json(&self, prompt: &ChatPrompt) -> Result<String, LlmError> {
        info!("Sending request to Ollama with model: {}", self.model);
        debug!("API URL: {}", self.api_url);

        let request = OllamaRequest {
            model: &self.model,
            messages: vec![
                OllamaMessage {
                    role: "system",
                    content: &prompt.system,
                },
                OllamaMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            format: "json",
            stream: false,
            options: OllamaOptions {
                temperature: prompt.temperature,
            },
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = match response.text().await {
                Ok(body) => format!(" - Response body: {}", body),
                Err(_) => String::new(),
            };

            error!("Ollama API responded with status code: {}{}", status, error_body);
            return Err(LlmError::ResponseError(format!(
                "Ollama API responded with status code: {}{}",
                status, error_body
            )));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| LlmError::ResponseError(format!("Failed to read response body: {}", e)))?;

        debug!("Raw response from Ollama: {}", response_text);

        let ollama_response: OllamaResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!("Failed to parse Ollama response: {} - Response was: {}", e, response_text);
                LlmError::ResponseError(format!("Failed to parse Ollama response: {}", e))
            })?;

        Ok(ollama_response.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn defaults_to_local_chat_endpoint() {
        let mut config = AppConfig::default().llm;
        config.backend = "ollama".to_string();
        config.model = "llama3".to_string();

        let provider = OllamaProvider::new(&config).unwrap();
        assert_eq!(provider.api_url, "http://localhost:11434/api/chat");
        assert_eq!(provider.model, "llama3");
    }

    #[test]
    fn request_disables_streaming_and_asks_for_json() {
        let request = OllamaRequest {
            model: "llama3",
            messages: vec![OllamaMessage {
                role: "user",
                content: "hi",
            }],
            format: "json",
            stream: false,
            options: OllamaOptions { temperature: 0.3 },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["format"], "json");
        assert_eq!(value["stream"], false);
        assert!((value["options"]["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn reply_content_is_read_from_message() {
        let parsed: OllamaResponse = serde_json::from_str(
            r#"{"model": "llama3", "message": {"role": "assistant", "content": "{\"sql\": \"SELECT 1\"}"}, "done": true}"#,
        )
        .unwrap();
        assert_eq!(parsed.message.content, "{\"sql\": \"SELECT 1\"}");
    }
}
