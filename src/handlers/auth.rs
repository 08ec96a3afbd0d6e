use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::services::users::LoginInput;
use crate::state::AppState;

use super::ok;

/// POST /api/auth - Credential login, returns a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<Value>, ApiError> {
    let (token, user) = state.users.login(input).await?;
    Ok(ok(json!({ "token": token, "user": user })))
}

/// GET /api/auth - The authenticated user, minus the credential hash
pub async fn current(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let view = state.users.current(&user).await?;
    Ok(ok(view))
}
