use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{auth, posts, profile, users};
use crate::middleware::auth::jwt_auth_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Registration, login and mixed public/private profile surface
        .merge(account_routes())
        .merge(profile_public_routes())
        // Fully protected groups
        .merge(profile_routes(&state))
        .merge(post_routes(&state))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Registration/login plus the mixed-access paths. GET /api/auth,
/// POST /api/profile and DELETE /api/profile share a path with public
/// methods, so their handlers authenticate through the AuthUser extractor
/// instead of a route-group middleware.
fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(users::register))
        .route("/api/auth", post(auth::login).get(auth::current))
        .route(
            "/api/profile",
            get(profile::list)
                .post(profile::upsert)
                .delete(profile::delete_account),
        )
}

fn profile_public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/profile/user/:id", get(profile::by_user))
        .route("/api/profile/github/:username", get(profile::github_repos))
}

fn profile_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/profile/me", get(profile::me))
        .route("/api/profile/experience", put(profile::add_experience))
        .route("/api/profile/experience/:id", delete(profile::remove_experience))
        .route("/api/profile/education", put(profile::add_education))
        .route("/api/profile/education/:id", delete(profile::remove_education))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn post_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/posts", post(posts::create).get(posts::list))
        .route("/api/posts/:id", get(posts::get).delete(posts::remove))
        .route("/api/posts/like/:id", put(posts::like))
        .route("/api/posts/unlike/:id", put(posts::unlike))
        .route("/api/posts/comment/:id", post(posts::add_comment))
        .route("/api/posts/comment/:id/:comment_id", delete(posts::delete_comment))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

async fn root() -> axum::response::Json<serde_json::Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "DevConnect API",
            "version": version,
            "description": "Developer social network backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "users": "POST /api/users (public - registration)",
                "auth": "POST /api/auth (public - login), GET /api/auth (protected)",
                "profile": "/api/profile[/me|/user/:id|/experience|/education|/github/:username]",
                "posts": "/api/posts[/:id|/like/:id|/unlike/:id|/comment/:id[/:comment_id]] (protected)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "store_error": e.to_string()
                }
            })),
        ),
    }
}
