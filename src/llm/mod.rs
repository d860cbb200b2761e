pub mod models;
pub mod prompts;
pub mod providers;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::LlmConfig;
use models::{
    ExplainSqlRequest, ExplainSqlResponse, GenerateSqlRequest, GenerateSqlResponse,
    TransformSqlRequest,
};
use prompts::{ChatPrompt, PromptTemplates};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM connection error: {0}")]
    ConnectionError(String),
    #[error("LLM response error: {0}")]
    ResponseError(String),
    #[error("LLM configuration error: {0}")]
    ConfigError(String),
    #[error("Prompt template error: {0}")]
    TemplateError(#[from] minijinja::Error),
}

/// A chat-completion provider running in JSON mode. Returns the raw assistant text.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete_json(&self, prompt: &ChatPrompt) -> Result<String, LlmError>;
}

pub struct LlmManager {
    backend: Box<dyn LlmBackend>,
    prompts: PromptTemplates,
}

impl LlmManager {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let backend: Box<dyn LlmBackend> = match config.backend.as_str() {
            "openai" | "remote" => Box::new(providers::remote::RemoteLlmProvider::new(config)?),
            "ollama" => Box::new(providers::ollama::OllamaProvider::new(config)?),
            _ => {
                return Err(LlmError::ConfigError(format!(
                    "Unsupported LLM backend: {}",
                    config.backend
                )))
            }
        };

        Self::with_backend(backend)
    }

    pub fn with_backend(backend: Box<dyn LlmBackend>) -> Result<Self, LlmError> {
        Ok(Self {
            backend,
            prompts: PromptTemplates::new()?,
        })
    }

    pub async fn generate_sql(
        &self,
        request: &GenerateSqlRequest,
    ) -> Result<GenerateSqlResponse, LlmError> {
        info!("Generating {} SQL", request.database());
        let prompt = self.prompts.generate(request)?;
        self.complete(&prompt).await
    }

    pub async fn transform_sql(
        &self,
        request: &TransformSqlRequest,
    ) -> Result<GenerateSqlResponse, LlmError> {
        info!("Transforming SQL for {}", request.target_database);
        let prompt = self.prompts.transform(request)?;
        self.complete(&prompt).await
    }

    pub async fn explain_sql(
        &self,
        request: &ExplainSqlRequest,
    ) -> Result<ExplainSqlResponse, LlmError> {
        info!("Explaining SQL ({} chars)", request.sql.len());
        let prompt = self.prompts.explain(request)?;
        self.complete(&prompt).await
    }

    async fn complete<T: DeserializeOwned>(&self, prompt: &ChatPrompt) -> Result<T, LlmError> {
        let raw = self.backend.complete_json(prompt).await?;
        debug!("Raw LLM reply: {}", raw);
        parse_reply(&raw)
    }
}

/// Parses the JSON object in a model reply. An empty reply parses as `{}`.
fn parse_reply<T: DeserializeOwned>(raw: &str) -> Result<T, LlmError> {
    let json = extract_json(raw);
    let json = if json.is_empty() { "{}" } else { json };

    serde_json::from_str(json).map_err(|e| {
        LlmError::ResponseError(format!("Model reply is not the expected JSON: {}", e))
    })
}

/// Pulls the JSON payload out of a reply that may be wrapped in a markdown
/// code fence or surrounded by prose.
pub fn extract_json(content: &str) -> &str {
    let content = content.trim();

    if let Some(start) = content.find("```json") {
        let after = &content[start + 7..];
        if let Some(end) = after.find("```") {
            return after[..end].trim();
        }
    }

    if let Some(start) = content.find("```") {
        let after = &content[start + 3..];
        if let Some(end) = after.find("```") {
            return after[..end].trim();
        }
    }

    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => content,
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Backend that replays a canned reply and records every prompt it receives.
    pub struct StubBackend {
        reply: Result<String, String>,
        pub prompts: Mutex<Vec<ChatPrompt>>,
    }

    impl StubBackend {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmBackend for StubBackend {
        async fn complete_json(&self, prompt: &ChatPrompt) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.clone());
            self.reply.clone().map_err(LlmError::ConnectionError)
        }
    }

    #[async_trait]
    impl<T: LlmBackend> LlmBackend for std::sync::Arc<T> {
        async fn complete_json(&self, prompt: &ChatPrompt) -> Result<String, LlmError> {
            self.as_ref().complete_json(prompt).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StubBackend;
    use super::*;
    use crate::config::AppConfig;
    use crate::llm::models::Complexity;
    use std::sync::Arc;

    fn manager(backend: StubBackend) -> LlmManager {
        LlmManager::with_backend(Box::new(backend)).unwrap()
    }

    fn generate_request(query: &str) -> GenerateSqlRequest {
        GenerateSqlRequest {
            natural_language_query: query.to_string(),
            database: Some("PostgreSQL".to_string()),
            subject: None,
            analysis_type: None,
            options: None,
        }
    }

    #[test]
    fn extract_json_handles_fences_and_prose() {
        assert_eq!(extract_json("{\"sql\": \"x\"}"), "{\"sql\": \"x\"}");
        assert_eq!(extract_json("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(extract_json("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(extract_json("Sure! {\"a\": {\"b\": 2}} Hope it helps."), "{\"a\": {\"b\": 2}}");
        assert_eq!(extract_json("   "), "");
    }

    #[tokio::test]
    async fn generate_parses_reply_with_defaults() {
        let backend = Arc::new(StubBackend::replying(
            r#"{"sql": "SELECT * FROM users", "complexity": "simple", "estimatedExecutionTime": 0, "usedTables": ["users"]}"#,
        ));
        let llm = LlmManager::with_backend(Box::new(backend.clone())).unwrap();

        let response = llm.generate_sql(&generate_request("all users")).await.unwrap();
        assert_eq!(response.sql, "SELECT * FROM users");
        assert_eq!(response.complexity, Complexity::Simple);
        assert_eq!(response.estimated_execution_time, 1000);
        assert_eq!(response.used_tables, vec!["users"]);
        assert!(response.suggestions.is_empty());

        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].user.contains("all users"));
    }

    #[tokio::test]
    async fn empty_reply_yields_all_defaults() {
        let llm = manager(StubBackend::replying(""));
        let response = llm.explain_sql(&ExplainSqlRequest { sql: "SELECT 1".into() }).await.unwrap();
        assert_eq!(response.explanation, "");
        assert_eq!(response.complexity, Complexity::Medium);
        assert_eq!(response.performance.rating, 5.0);
    }

    #[tokio::test]
    async fn non_json_reply_is_a_response_error() {
        let llm = manager(StubBackend::replying("I cannot help with that"));
        let err = llm.generate_sql(&generate_request("x")).await.unwrap_err();
        assert!(matches!(err, LlmError::ResponseError(_)));
    }

    #[tokio::test]
    async fn backend_failures_propagate() {
        let llm = manager(StubBackend::failing("connection refused"));
        let err = llm
            .transform_sql(&TransformSqlRequest {
                original_sql: "SELECT 1".into(),
                target_database: "SQLite".into(),
                optimization_level: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "LLM connection error: connection refused");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let mut config = AppConfig::default().llm;
        config.backend = "carrier-pigeon".to_string();
        let err = LlmManager::new(&config).err().unwrap();
        assert!(matches!(err, LlmError::ConfigError(_)));
    }
}
