//! Shared application state.

use std::sync::Arc;

use crate::boardgames::BoardGameClient;
use crate::config::AppConfig;
use crate::error::ClientError;
use crate::llms::{CompletionProvider, OpenAiCompatClient};
use crate::spotify::{SpotifyClient, TokenRefresher};

/// Shared application state for the HTTP server.
///
/// Everything inside is immutable and cheap to clone; the upstream clients
/// share one connection pool.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Text-generation backend for `/api/ai`.
    pub completion: Arc<dyn CompletionProvider>,
    pub boardgames: BoardGameClient,
    pub spotify: SpotifyClient,
    /// `None` when Spotify client credentials are not configured.
    pub token_refresher: Option<TokenRefresher>,
}

impl AppState {
    /// Build the state and its upstream clients from `config`.
    pub fn new(config: AppConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;

        let token_refresher = match TokenRefresher::new(http.clone(), &config.spotify) {
            Ok(refresher) => Some(refresher),
            Err(e) => {
                tracing::warn!("Token refresh disabled: {}", e);
                None
            }
        };

        Ok(Self {
            completion: Arc::new(OpenAiCompatClient::new(http.clone(), &config.ai)),
            boardgames: BoardGameClient::new(http.clone(), config.bgg_api_base.clone()),
            spotify: SpotifyClient::new(http, config.spotify.api_base.clone()),
            token_refresher,
            config: Arc::new(config),
        })
    }

    /// Replace the text-generation backend.
    pub fn with_completion(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.completion = provider;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("port", &self.config.port)
            .field("completion", &self.completion.provider())
            .field("token_refresh", &self.token_refresher.is_some())
            .finish()
    }
}
