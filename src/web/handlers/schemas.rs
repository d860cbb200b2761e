use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::{parse_id, success};
use crate::schema::{
    analyze_schema, generate_ddl, validate_schema, DatabaseSchema, Dialect, SchemaAnalysis,
    SchemaValidation,
};
use crate::storage::{NewSchema, Schema};
use crate::web::error::ApiError;
use crate::web::state::AppState;

const SCHEMA_NOT_FOUND: &str = "Schema not found";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchemaRequest {
    pub name: Option<String>,
    pub database: Option<String>,
    pub schema_data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct SchemaReport {
    pub analysis: SchemaAnalysis,
    pub validation: SchemaValidation,
}

#[derive(Debug, Deserialize)]
pub struct DdlParams {
    pub dialect: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DdlResponse {
    pub dialect: &'static str,
    pub ddl: String,
}

pub async fn list_schemas(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Schema>>, ApiError> {
    let schemas = state
        .storage
        .get_schemas_by_user(state.default_user_id)
        .await?;
    Ok(Json(schemas))
}

pub async fn create_schema(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateSchemaRequest>, JsonRejection>,
) -> Result<Json<Schema>, ApiError> {
    let Json(request) = payload?;

    let name = request.name.filter(|n| !n.trim().is_empty());
    let database = request.database.filter(|d| !d.trim().is_empty());
    let schema_data = request
        .schema_data
        .filter(|data| !data.is_null() && data.as_str() != Some(""));

    let (Some(name), Some(database), Some(schema_data)) = (name, database, schema_data) else {
        return Err(ApiError::bad_request(
            "Name, database, and schema data are required",
        ));
    };

    let schema = state
        .storage
        .create_schema(NewSchema {
            user_id: state.default_user_id,
            name,
            database,
            schema_data,
        })
        .await?;

    info!("Created schema {} ({})", schema.id, schema.name);
    Ok(Json(schema))
}

pub async fn get_schema(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Schema>, ApiError> {
    load_schema(&state, &id).await.map(Json)
}

pub async fn delete_schema(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, SCHEMA_NOT_FOUND)?;

    if !state.storage.delete_schema(id).await? {
        return Err(ApiError::not_found(SCHEMA_NOT_FOUND));
    }

    info!("Deleted schema {}", id);
    Ok(Json(success()))
}

pub async fn analyze_schema_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SchemaReport>, ApiError> {
    let document = parse_document(&load_schema(&state, &id).await?)?;

    Ok(Json(SchemaReport {
        analysis: analyze_schema(&document),
        validation: validate_schema(&document),
    }))
}

pub async fn schema_ddl(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DdlParams>,
) -> Result<Json<DdlResponse>, ApiError> {
    let dialect = match params.dialect.as_deref() {
        Some(name) => name.parse::<Dialect>().map_err(ApiError::bad_request)?,
        None => Dialect::default(),
    };

    let document = parse_document(&load_schema(&state, &id).await?)?;

    Ok(Json(DdlResponse {
        dialect: dialect.as_str(),
        ddl: generate_ddl(&document, dialect),
    }))
}

async fn load_schema(state: &AppState, id: &str) -> Result<Schema, ApiError> {
    let id = parse_id(id, SCHEMA_NOT_FOUND)?;
    state
        .storage
        .get_schema(id)
        .await?
        .ok_or_else(|| ApiError::not_found(SCHEMA_NOT_FOUND))
}

fn parse_document(schema: &Schema) -> Result<DatabaseSchema, ApiError> {
    serde_json::from_value(schema.schema_data.clone()).map_err(|e| {
        ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Schema data is not a valid schema document: {}", e),
        )
    })
}
