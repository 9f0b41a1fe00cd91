use std::sync::Arc;

use crate::auth::JwtHandler;
use crate::config::Config;
use crate::jobs::ImportJobs;
use crate::store::RecipeStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecipeStore>,
    pub tokens: Arc<JwtHandler>,
    pub jobs: ImportJobs,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn RecipeStore>) -> Self {
        let tokens = JwtHandler::new(
            &config.jwt_secret,
            config.access_token_ttl_secs,
            config.refresh_token_ttl_secs,
        );
        let jobs = ImportJobs::new(store.clone(), config.import_workers);

        Self {
            store,
            tokens: Arc::new(tokens),
            jobs,
            config: Arc::new(config),
        }
    }
}
