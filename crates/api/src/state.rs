//! Shared application state

use std::sync::Arc;

use crate::{
    auth::{middleware::AuthState, CredentialStore, JwtManager},
    config::Config,
    search::SearchProvider,
};

/// State handed to every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub credentials: CredentialStore,
    pub tokens: JwtManager,
    /// `None` when no search credentials are configured
    pub search: Option<Arc<dyn SearchProvider>>,
}

impl AppState {
    pub fn new(
        config: Config,
        credentials: CredentialStore,
        search: Option<Arc<dyn SearchProvider>>,
    ) -> Self {
        let tokens = JwtManager::new(
            &config.secret_key,
            config.algorithm,
            config.access_token_ttl(),
        );

        Self {
            config: Arc::new(config),
            credentials,
            tokens,
            search,
        }
    }

    /// The subset of state the auth middleware needs
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            credentials: self.credentials.clone(),
            tokens: self.tokens.clone(),
        }
    }
}
