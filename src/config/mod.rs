use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub store: StoreConfig,
    pub github: GithubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// Upper bound applied to every store operation; expiry surfaces as a 504.
    pub op_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    pub api_base: String,
    pub token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("DEVCONNECT_PORT").or_else(|_| env::var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Security overrides
        if let Ok(v) = env::var("DEVCONNECT_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("DEVCONNECT_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Store overrides
        if let Ok(v) = env::var("DEVCONNECT_STORE") {
            self.store.backend = match v.as_str() {
                "postgres" | "pg" => StoreBackend::Postgres,
                "memory" | "mem" => StoreBackend::Memory,
                _ => self.store.backend,
            };
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.store.database_url = Some(v);
        }
        if let Ok(v) = env::var("DEVCONNECT_STORE_MAX_CONNECTIONS") {
            self.store.max_connections = v.parse().unwrap_or(self.store.max_connections);
        }
        if let Ok(v) = env::var("DEVCONNECT_STORE_OP_TIMEOUT_MS") {
            self.store.op_timeout_ms = v.parse().unwrap_or(self.store.op_timeout_ms);
        }

        // GitHub overrides
        if let Ok(v) = env::var("DEVCONNECT_GITHUB_API_BASE") {
            self.github.api_base = v;
        }
        if let Ok(v) = env::var("DEVCONNECT_GITHUB_TOKEN") {
            self.github.token = Some(v);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            security: SecurityConfig {
                jwt_secret: "devconnect-dev-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                database_url: None,
                max_connections: 10,
                op_timeout_ms: 5000,
            },
            github: GithubConfig {
                api_base: "https://api.github.com".to_string(),
                token: None,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000 },
            security: SecurityConfig {
                // Must be provided via DEVCONNECT_JWT_SECRET
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
                database_url: None,
                max_connections: 20,
                op_timeout_ms: 5000,
            },
            github: GithubConfig {
                api_base: "https://api.github.com".to_string(),
                token: None,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            security: SecurityConfig {
                // Must be provided via DEVCONNECT_JWT_SECRET
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
                database_url: None,
                max_connections: 50,
                op_timeout_ms: 3000,
            },
            github: GithubConfig {
                api_base: "https://api.github.com".to_string(),
                token: None,
            },
        }
    }
}

// Global singleton config - used by the CLI default path; the server injects
// AppConfig through AppState instead of reading this ambiently.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
