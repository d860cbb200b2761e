use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::web::error::ApiError;
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub llm_backend: String,
    pub llm_model: String,
    pub query_count: usize,
    pub schema_count: usize,
}

pub async fn system_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SystemStatus>, ApiError> {
    let user_id = state.default_user_id;
    let query_count = state.storage.get_sql_queries_by_user(user_id).await?.len();
    let schema_count = state.storage.get_schemas_by_user(user_id).await?.len();

    let uptime = chrono::Utc::now().signed_duration_since(state.startup_time);

    Ok(Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.num_seconds(),
        llm_backend: state.config.llm.backend.clone(),
        llm_model: state.config.llm.model.clone(),
        query_count,
        schema_count,
    }))
}
