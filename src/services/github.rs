use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::GithubConfig;
use crate::error::ApiError;

/// Pass-through client for a member's public GitHub repositories. No
/// business logic: an unknown username (or any non-success upstream status)
/// surfaces as NotFound, transport failures as BadGateway.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    config: GithubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoView {
    pub id: i64,
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: i64,
    #[serde(default)]
    pub forks_count: i64,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub async fn repos(&self, username: &str) -> Result<Vec<RepoView>, ApiError> {
        let url = self.repos_url(username).map_err(|e| {
            tracing::error!("Invalid GitHub API base '{}': {}", self.config.api_base, e);
            ApiError::internal_server_error("GitHub client is misconfigured")
        })?;

        let mut request = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, "devconnect-api");
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("GitHub request failed: {}", e);
            ApiError::bad_gateway("GitHub is unreachable")
        })?;

        if !response.status().is_success() {
            return Err(ApiError::not_found("Github profile not found."));
        }

        response.json().await.map_err(|e| {
            tracing::error!("Unexpected GitHub response shape: {}", e);
            ApiError::bad_gateway("Unexpected response from GitHub")
        })
    }

    fn repos_url(&self, username: &str) -> Result<Url, url::ParseError> {
        let base = if self.config.api_base.ends_with('/') {
            self.config.api_base.clone()
        } else {
            format!("{}/", self.config.api_base)
        };
        let mut url = Url::parse(&base)?.join(&format!("users/{}/repos", username))?;
        url.query_pairs_mut()
            .append_pair("per_page", "5")
            .append_pair("sort", "created:asc");
        Ok(url)
    }
}
