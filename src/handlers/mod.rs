pub mod auth;
pub mod posts;
pub mod profile;
pub mod users;

use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;

/// Success envelope shared by every handler.
pub(crate) fn ok(data: impl Serialize) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Parse an id path segment. A malformed identifier is a NotFound and never
/// reaches the store adapter.
pub(crate) fn parse_doc_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Invalid ID."))
}
