use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::llm::models::{
    BreakdownSection, Complexity, GenerateOptions, OptimizationLevel, PerformanceReport,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Generate,
    Transform,
    Explain,
}

/// Per-type details saved alongside a query. Serialized as a plain object.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QueryMetadata {
    Generated(GenerationMetadata),
    Transformed(TransformationMetadata),
    Explained(ExplanationMetadata),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub explanation: String,
    pub suggestions: Vec<String>,
    pub used_tables: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationMetadata {
    pub original_sql: String,
    pub explanation: String,
    pub suggestions: Vec<String>,
    pub used_tables: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimization_level: Option<OptimizationLevel>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationMetadata {
    pub explanation: String,
    pub breakdown: Vec<BreakdownSection>,
    pub performance: PerformanceReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlQuery {
    pub id: i64,
    pub user_id: i64,
    pub natural_language_query: String,
    pub generated_sql: String,
    pub query_type: QueryType,
    pub database: String,
    pub complexity: Option<Complexity>,
    /// Estimated execution time in milliseconds
    pub execution_time: Option<u64>,
    pub is_favorite: bool,
    pub metadata: QueryMetadata,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSqlQuery {
    pub user_id: i64,
    pub natural_language_query: String,
    pub generated_sql: String,
    pub query_type: QueryType,
    pub database: String,
    pub complexity: Option<Complexity>,
    pub execution_time: Option<u64>,
    pub metadata: QueryMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub database: String,
    pub schema_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSchema {
    pub user_id: i64,
    pub name: String,
    pub database: String,
    pub schema_data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedQuery {
    pub id: i64,
    pub query_id: i64,
    pub share_token: String,
    pub is_public: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SharedQuery {
    /// A link stays usable up to and including `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }
}

#[derive(Debug, Clone)]
pub struct NewSharedQuery {
    pub query_id: i64,
    pub share_token: String,
    pub is_public: bool,
    pub expires_at: Option<DateTime<Utc>>,
}
