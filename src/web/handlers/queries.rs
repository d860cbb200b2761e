use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::{parse_id, success};
use crate::config::WebConfig;
use crate::storage::{NewSharedQuery, SqlQuery};
use crate::web::error::ApiError;
use crate::web::state::AppState;

const QUERY_NOT_FOUND: &str = "Query not found";
const SHARE_TOKEN_LEN: usize = 12;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub is_favorite: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    #[serde(default)]
    pub is_public: bool,
    /// Lifetime of the link in seconds. Absent or zero means the link never expires.
    pub expires_in: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub share_token: String,
    pub share_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

pub async fn list_queries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SqlQuery>>, ApiError> {
    let queries = state
        .storage
        .get_sql_queries_by_user(state.default_user_id)
        .await?;
    Ok(Json(queries))
}

pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SqlQuery>>, ApiError> {
    let queries = state
        .storage
        .get_favorite_queries(state.default_user_id)
        .await?;
    Ok(Json(queries))
}

pub async fn get_query(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SqlQuery>, ApiError> {
    let id = parse_id(&id, QUERY_NOT_FOUND)?;
    state
        .storage
        .get_sql_query(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(QUERY_NOT_FOUND))
}

pub async fn update_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<FavoriteRequest>, JsonRejection>,
) -> Result<Json<SqlQuery>, ApiError> {
    let id = parse_id(&id, QUERY_NOT_FOUND)?;
    let Json(request) = payload?;

    state
        .storage
        .update_favorite(id, request.is_favorite)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(QUERY_NOT_FOUND))
}

pub async fn delete_query(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, QUERY_NOT_FOUND)?;

    if !state.storage.delete_sql_query(id).await? {
        return Err(ApiError::not_found(QUERY_NOT_FOUND));
    }

    info!("Deleted query {}", id);
    Ok(Json(success()))
}

pub async fn share_query(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<ShareRequest>, JsonRejection>,
) -> Result<Json<ShareResponse>, ApiError> {
    let query_id = parse_id(&id, QUERY_NOT_FOUND)?;
    let Json(request) = payload?;

    if state.storage.get_sql_query(query_id).await?.is_none() {
        return Err(ApiError::not_found(QUERY_NOT_FOUND));
    }

    let expires_at = match request.expires_in {
        Some(seconds) if seconds < 0 => {
            return Err(ApiError::bad_request("expiresIn must not be negative"));
        }
        Some(0) | None => None,
        Some(seconds) => Some(
            Duration::try_seconds(seconds)
                .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
                .ok_or_else(|| ApiError::bad_request("expiresIn is too large"))?,
        ),
    };

    let shared = state
        .storage
        .create_shared_query(NewSharedQuery {
            query_id,
            share_token: nanoid::nanoid!(SHARE_TOKEN_LEN),
            is_public: request.is_public,
            expires_at,
        })
        .await?;

    info!("Query {} shared as {}", query_id, shared.share_token);
    Ok(Json(ShareResponse {
        share_url: share_url(&state.config.web, &headers, &shared.share_token),
        share_token: shared.share_token,
        expires_at: shared.expires_at,
    }))
}

/// Builds the public link from `web.public_url`, falling back to the request's Host header.
fn share_url(web: &WebConfig, headers: &HeaderMap, token: &str) -> String {
    let base = match &web.public_url {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => {
            let host = headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}:{}", web.host, web.port));
            format!("http://{}", host)
        }
    };
    format!("{}/shared/{}", base, token)
}
