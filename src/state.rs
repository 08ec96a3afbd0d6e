use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::github::GithubClient;
use crate::services::posts::PostService;
use crate::services::profiles::ProfileService;
use crate::services::users::UserService;
use crate::store::DocumentStore;

/// Shared application state: configuration, the store handle (for health
/// checks) and the business services, injected rather than read ambiently.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub users: UserService,
    pub profiles: ProfileService,
    pub posts: PostService,
    pub github: GithubClient,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: UserService::new(store.clone(), &config),
            profiles: ProfileService::new(store.clone(), &config),
            posts: PostService::new(store.clone(), &config),
            github: GithubClient::new(config.github.clone()),
            store,
            config,
        }
    }
}
