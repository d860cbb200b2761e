use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use super::success;
use crate::storage::SqlQuery;
use crate::web::error::ApiError;
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedQueryResponse {
    pub query: SqlQuery,
    pub shared_at: DateTime<Utc>,
    pub is_public: bool,
}

pub async fn get_shared_query(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<SharedQueryResponse>, ApiError> {
    let shared = state
        .storage
        .get_shared_query(&token)
        .await?
        .ok_or_else(|| ApiError::not_found("Shared query not found"))?;

    if shared.is_expired_at(Utc::now()) {
        debug!("Share link {} expired at {:?}", token, shared.expires_at);
        return Err(ApiError::new(StatusCode::GONE, "Shared query has expired"));
    }

    let query = state
        .storage
        .get_sql_query(shared.query_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Original query not found"))?;

    Ok(Json(SharedQueryResponse {
        query,
        shared_at: shared.created_at,
        is_public: shared.is_public,
    }))
}

pub async fn revoke_shared_query(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.storage.delete_shared_query(&token).await? {
        return Err(ApiError::not_found("Shared query not found"));
    }

    info!("Revoked share link {}", token);
    Ok(Json(success()))
}
