//! CLI commands module
//!
//! Contains all CLI command implementations.

pub mod auth;
pub mod config;
pub mod users;

use anyhow::{anyhow, Result};
use roster_core::{
    config::resolve_session_path, ApiClient, ClientConfig, FileStorage, Session, SessionManager,
    UserListController,
};

use crate::output::OutputFormat;

/// Shared context for all commands
pub struct Context {
    pub api_url: Option<String>,
    pub session_path: Option<String>,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl Context {
    /// Full client configuration; needs an API endpoint
    pub fn client_config(&self) -> Result<ClientConfig> {
        Ok(ClientConfig::from_env(
            self.api_url.as_deref(),
            self.session_path.as_deref(),
        )?)
    }

    /// Session manager over the session file; works without an API endpoint
    pub fn session_manager(&self) -> Result<SessionManager<FileStorage>> {
        let path = resolve_session_path(self.session_path.as_deref())?;
        Ok(SessionManager::new(FileStorage::new(path)))
    }

    /// Establish the session and load the user list.
    ///
    /// Any failure here ends at the login entry point.
    pub async fn load_users(&self) -> Result<(Session, UserListController<ApiClient>)> {
        let config = self.client_config()?;
        let manager = self.session_manager()?;

        let session = manager
            .init()
            .map_err(|e| redirect_to_login(&manager, &e))?;

        let api = ApiClient::new(&config)?.with_session(session.clone());
        let mut list = UserListController::new(api);
        if let Err(e) = list.refresh().await {
            return Err(redirect_to_login(&manager, &e));
        }

        Ok((session, list))
    }

    /// Error from a mutation; a credential the server rejected is dropped like at startup
    pub fn mutation_failed(&self, err: roster_core::Error) -> anyhow::Error {
        if !err.is_auth_failure() {
            return err.into();
        }
        match self.session_manager() {
            Ok(manager) => redirect_to_login(&manager, &err),
            Err(e) => e.context(err.to_string()),
        }
    }
}

/// Turn a session failure into the "go log in" error, dropping a rejected credential
pub fn redirect_to_login(
    manager: &SessionManager<FileStorage>,
    err: &roster_core::Error,
) -> anyhow::Error {
    log::error!("Session error: {}", err);
    if let Err(clear_err) = manager.invalidate_on_auth_failure(err) {
        log::warn!("Could not clear stored credential: {}", clear_err);
    }
    anyhow!("{}. Run `roster login` to sign in.", err)
}
