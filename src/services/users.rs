use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::config::{AppConfig, SecurityConfig};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::models::{User, UserView};
use crate::store::collection::Collection;
use crate::store::{DocumentStore, Filter, USERS};

#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Registration, credential login and current-user lookup. Passwords are
/// Argon2-hashed off the async runtime; avatars are derived from the
/// normalized email so they stay stable across re-registration.
#[derive(Clone)]
pub struct UserService {
    users: Collection<User>,
    security: SecurityConfig,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>, config: &AppConfig) -> Self {
        let op_timeout = Duration::from_millis(config.store.op_timeout_ms);
        Self {
            users: Collection::new(USERS, store, op_timeout),
            security: config.security.clone(),
        }
    }

    pub async fn register(&self, input: RegisterInput) -> Result<(String, UserView), ApiError> {
        let (name, email, password) = validate_register(&input)?;

        if self.users.find_one(&Filter::eq("email", &email)).await?.is_some() {
            return Err(ApiError::conflict("A user is already registered with this email."));
        }

        let hash = hash_password(password).await?;
        let user = User {
            name,
            avatar: avatar_url(&email),
            email,
            password: hash,
            date: Utc::now(),
        };
        let doc = self.users.insert_one(&user).await?;

        let token = self.issue_token(doc.id)?;
        Ok((token, UserView::from_doc(&doc)))
    }

    pub async fn login(&self, input: LoginInput) -> Result<(String, UserView), ApiError> {
        let email = normalize_email(input.email.as_deref().unwrap_or_default());
        let password = input.password.unwrap_or_default();

        // Unknown email and wrong password produce the same error - no
        // account-probing oracle.
        let invalid = || ApiError::unauthorized("Invalid email or password.");

        let doc = self
            .users
            .find_one(&Filter::eq("email", &email))
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, doc.data.password.clone()).await? {
            return Err(invalid());
        }

        let token = self.issue_token(doc.id)?;
        Ok((token, UserView::from_doc(&doc)))
    }

    pub async fn current(&self, identity: &AuthUser) -> Result<UserView, ApiError> {
        let doc = self
            .users
            .find_one(&Filter::by_id(identity.user_id))
            .await?
            .ok_or_else(|| ApiError::not_found("User not found."))?;
        Ok(UserView::from_doc(&doc))
    }

    fn issue_token(&self, user_id: Uuid) -> Result<String, ApiError> {
        let claims = Claims::new(user_id, self.security.jwt_expiry_hours);
        Ok(generate_jwt(claims, &self.security)?)
    }
}

fn validate_register(input: &RegisterInput) -> Result<(String, String, String), ApiError> {
    let mut field_errors = HashMap::new();

    let name = input.name.as_deref().unwrap_or_default().trim().to_string();
    if name.len() < 2 || name.len() > 50 {
        field_errors.insert(
            "name".to_string(),
            "Name must be between 2 and 50 characters".to_string(),
        );
    }

    let email = normalize_email(input.email.as_deref().unwrap_or_default());
    if email.len() < 5 || email.len() > 255 || !email.contains('@') {
        field_errors.insert("email".to_string(), "A valid email is required".to_string());
    }

    let password = input.password.clone().unwrap_or_default();
    if password.len() < 6 || password.len() > 255 {
        field_errors.insert(
            "password".to_string(),
            "Password must be at least 6 characters".to_string(),
        );
    }

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Invalid registration input", Some(field_errors)));
    }

    Ok((name, email, password))
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Gravatar-style avatar URL derived from the normalized email.
fn avatar_url(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    format!("https://www.gravatar.com/avatar/{:x}?s=200&d=mm", hasher.finalize())
}

async fn hash_password(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                ApiError::internal_server_error("Failed to process credentials")
            })
    })
    .await
    .map_err(|_| ApiError::internal_server_error("Failed to process credentials"))?
}

async fn verify_password(password: String, hashed: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || {
        let parsed = match PasswordHash::new(&hashed) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!("Stored password hash is unreadable: {}", e);
                return Ok(false);
            }
        };
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    })
    .await
    .map_err(|_| ApiError::internal_server_error("Failed to process credentials"))?
}
