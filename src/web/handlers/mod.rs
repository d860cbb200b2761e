pub mod queries;
pub mod schemas;
pub mod shared;
pub mod sql;
pub mod status;
pub mod ui;

use serde_json::{json, Value};

use crate::web::error::ApiError;

// Ids that are not integers can never match a record.
fn parse_id(raw: &str, not_found: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::not_found(not_found))
}

fn success() -> Value {
    json!({ "success": true })
}
