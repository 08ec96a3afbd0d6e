use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::services::profiles::{EducationInput, ExperienceInput, ProfileInput};
use crate::state::AppState;

use super::{ok, parse_doc_id};

/// GET /api/profile/me - The caller's own profile
pub async fn me(State(state): State<AppState>, user: AuthUser) -> Result<Json<Value>, ApiError> {
    Ok(ok(state.profiles.me(&user).await?))
}

/// POST /api/profile - Create or update the caller's profile
pub async fn upsert(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<ProfileInput>,
) -> Result<Json<Value>, ApiError> {
    Ok(ok(state.profiles.upsert(&user, input).await?))
}

/// GET /api/profile - All profiles, public
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(ok(state.profiles.list_all().await?))
}

/// GET /api/profile/user/:id - Profile by user id, public
pub async fn by_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user_id = parse_doc_id(&id)?;
    Ok(ok(state.profiles.get_by_user_id(user_id).await?))
}

/// DELETE /api/profile - Account deletion cascade (posts, profile, user)
pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    state.profiles.delete_account(&user).await?;
    Ok(ok("User deleted."))
}

/// PUT /api/profile/experience - Add an experience entry
pub async fn add_experience(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<ExperienceInput>,
) -> Result<Json<Value>, ApiError> {
    Ok(ok(state.profiles.add_experience(&user, input).await?))
}

/// DELETE /api/profile/experience/:id - Remove an experience entry by id
pub async fn remove_experience(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let entry_id = parse_doc_id(&id)?;
    Ok(ok(state.profiles.remove_experience(&user, entry_id).await?))
}

/// PUT /api/profile/education - Add an education entry
pub async fn add_education(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<EducationInput>,
) -> Result<Json<Value>, ApiError> {
    Ok(ok(state.profiles.add_education(&user, input).await?))
}

/// DELETE /api/profile/education/:id - Remove an education entry by id
pub async fn remove_education(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let entry_id = parse_doc_id(&id)?;
    Ok(ok(state.profiles.remove_education(&user, entry_id).await?))
}

/// GET /api/profile/github/:username - Public repos pass-through
pub async fn github_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    Ok(ok(state.github.repos(&username).await?))
}
