use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::llm::models::{
    ExplainSqlRequest, ExplainSqlResponse, GenerateSqlRequest, GenerateSqlResponse,
    TransformSqlRequest,
};
use crate::sql::{extract_tables, format_sql, highlight_sql, validate_sql, ValidationResult};
use crate::storage::{
    ExplanationMetadata, GenerationMetadata, NewSqlQuery, QueryMetadata, QueryType,
    TransformationMetadata,
};
use crate::web::error::ApiError;
use crate::web::state::AppState;

/// Model output plus the id of the history record it was saved under.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSqlResponse {
    #[serde(flatten)]
    pub result: GenerateSqlResponse,
    pub query_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct FormatSqlRequest {
    #[serde(default)]
    pub sql: String,
}

#[derive(Debug, Serialize)]
pub struct FormatSqlResponse {
    pub formatted: String,
    pub highlighted: String,
    pub tables: Vec<String>,
    pub validation: ValidationResult,
}

pub async fn generate_sql(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateSqlRequest>, JsonRejection>,
) -> Result<Json<SavedSqlResponse>, ApiError> {
    let Json(request) = payload?;

    if request.natural_language_query.trim().is_empty() {
        return Err(ApiError::bad_request("Natural language query is required"));
    }

    let result = state
        .llm_manager
        .generate_sql(&request)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to generate SQL: {}", e)))?;

    let saved = state
        .storage
        .create_sql_query(NewSqlQuery {
            user_id: state.default_user_id,
            natural_language_query: request.natural_language_query.clone(),
            generated_sql: result.sql.clone(),
            query_type: QueryType::Generate,
            database: request.database().to_string(),
            complexity: Some(result.complexity),
            execution_time: Some(result.estimated_execution_time),
            metadata: QueryMetadata::Generated(GenerationMetadata {
                explanation: result.explanation.clone(),
                suggestions: result.suggestions.clone(),
                used_tables: result.used_tables.clone(),
                subject: request.subject,
                analysis_type: request.analysis_type,
                options: request.options,
            }),
        })
        .await?;

    info!("Generated SQL saved as query {}", saved.id);
    Ok(Json(SavedSqlResponse {
        result,
        query_id: saved.id,
    }))
}

pub async fn transform_sql(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TransformSqlRequest>, JsonRejection>,
) -> Result<Json<SavedSqlResponse>, ApiError> {
    let Json(request) = payload?;

    if request.original_sql.trim().is_empty() {
        return Err(ApiError::bad_request("Original SQL is required"));
    }
    if request.target_database.trim().is_empty() {
        return Err(ApiError::bad_request("Target database is required"));
    }

    let result = state
        .llm_manager
        .transform_sql(&request)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to transform SQL: {}", e)))?;

    let saved = state
        .storage
        .create_sql_query(NewSqlQuery {
            user_id: state.default_user_id,
            natural_language_query: format!("Transform to {}", request.target_database),
            generated_sql: result.sql.clone(),
            query_type: QueryType::Transform,
            database: request.target_database.clone(),
            complexity: Some(result.complexity),
            execution_time: Some(result.estimated_execution_time),
            metadata: QueryMetadata::Transformed(TransformationMetadata {
                original_sql: request.original_sql,
                explanation: result.explanation.clone(),
                suggestions: result.suggestions.clone(),
                used_tables: result.used_tables.clone(),
                optimization_level: request.optimization_level,
            }),
        })
        .await?;

    info!("Transformed SQL saved as query {}", saved.id);
    Ok(Json(SavedSqlResponse {
        result,
        query_id: saved.id,
    }))
}

pub async fn explain_sql(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExplainSqlRequest>, JsonRejection>,
) -> Result<Json<ExplainSqlResponse>, ApiError> {
    let Json(request) = payload?;

    if request.sql.trim().is_empty() {
        return Err(ApiError::bad_request("SQL query is required"));
    }

    let result = state
        .llm_manager
        .explain_sql(&request)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to explain SQL: {}", e)))?;

    state
        .storage
        .create_sql_query(NewSqlQuery {
            user_id: state.default_user_id,
            natural_language_query: "Explain SQL query".to_string(),
            generated_sql: request.sql,
            query_type: QueryType::Explain,
            database: "General".to_string(),
            complexity: Some(result.complexity),
            execution_time: None,
            metadata: QueryMetadata::Explained(ExplanationMetadata {
                explanation: result.explanation.clone(),
                breakdown: result.breakdown.clone(),
                performance: result.performance.clone(),
            }),
        })
        .await?;

    Ok(Json(result))
}

// Purely local; never touches the model or the store.
pub async fn format_sql_handler(
    payload: Result<Json<FormatSqlRequest>, JsonRejection>,
) -> Result<Json<FormatSqlResponse>, ApiError> {
    let Json(request) = payload?;

    if request.sql.trim().is_empty() {
        return Err(ApiError::bad_request("SQL query is required"));
    }

    let formatted = format_sql(&request.sql);
    let highlighted = highlight_sql(&formatted);

    Ok(Json(FormatSqlResponse {
        formatted,
        highlighted,
        tables: extract_tables(&request.sql),
        validation: validate_sql(&request.sql),
    }))
}
