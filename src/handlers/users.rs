use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::users::RegisterInput;
use crate::state::AppState;

use super::ok;

/// POST /api/users - Register a new user, returns a bearer token
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<Value>, ApiError> {
    let (token, user) = state.users.register(input).await?;
    Ok(ok(json!({ "token": token, "user": user })))
}
