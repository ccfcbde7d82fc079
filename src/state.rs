use std::sync::Arc;

use crate::auth::{OidcClient, OidcError, SessionKeys};
use crate::config::AppConfig;
use crate::database::{DatabaseError, InventoryStore};
use crate::error::ApiError;

/// Resources shared by every request, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn InventoryStore>,
    pub oidc: Arc<OidcClient>,
    pub sessions: SessionKeys,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn InventoryStore>) -> Result<Self, OidcError> {
        let oidc = OidcClient::new(&config.auth)?;
        let sessions = SessionKeys::new(&config.auth.secret, config.security.session_ttl_hours);
        Ok(Self {
            config: Arc::new(config),
            store,
            oidc: Arc::new(oidc),
            sessions,
        })
    }

    pub fn store_error(&self, err: DatabaseError) -> ApiError {
        ApiError::store(err, self.config.security.expose_store_errors)
    }
}
