//! Application state.

use std::sync::Arc;

use jobpilot_media::MediaClient;
use jobpilot_store::FirestoreClient;

use crate::auth::JwksCache;
use crate::config::ApiConfig;
use crate::session::SessionKeys;

/// Shared application state.
///
/// The store and media handles are created once at startup and shared by
/// reference across all requests.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<FirestoreClient>,
    pub media: Arc<MediaClient>,
    pub session: Arc<SessionKeys>,
    pub jwks: Arc<JwksCache>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = FirestoreClient::from_env().await?;
        let media = MediaClient::from_env().await?;
        let session = SessionKeys::from_env(config.session_ttl_days)?;
        let jwks = JwksCache::new().await?;

        Ok(Self {
            config,
            store: Arc::new(store),
            media: Arc::new(media),
            session: Arc::new(session),
            jwks: Arc::new(jwks),
        })
    }
}
