use crate::config::AppConfig;
use crate::errors::AppError;
use crate::lastfm::LastFmClient;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub cors: bool,
    upstream: Option<Arc<LastFmClient>>,
}

impl AppState {
    pub fn new(config: &AppConfig, http: reqwest::Client) -> Self {
        Self {
            cors: config.cors,
            upstream: Some(Arc::new(LastFmClient::new(
                http,
                config.api_url.clone(),
                config.api_key.clone(),
            ))),
        }
    }

    /// State for a server whose configuration failed to load.
    pub fn unconfigured() -> Self {
        Self {
            cors: cfg!(debug_assertions),
            upstream: None,
        }
    }

    pub fn upstream(&self) -> Result<&LastFmClient, AppError> {
        self.upstream
            .as_deref()
            .ok_or_else(|| AppError::internal("Unable to load config"))
    }
}
