//! # roster-core
//!
//! Client logic for Roster, a front end to a user-management REST API.
//!
//! This crate provides:
//! - Session lifecycle and credential persistence (`session` module)
//! - The HTTP client for auth and user endpoints (`api` module)
//! - The user list controller (`users` module)
//! - The view/add/update form state machine (`workflow` module)
//! - Configuration, data models, notifications and error handling

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod session;
pub mod users;
pub mod workflow;

// Re-exports for convenience
pub use api::{ApiClient, UserApi};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use models::{RegisterContract, RegistrationForm, UpdateUserRequest, UserDraft, UserRecord};
pub use notify::{AutoConfirm, Confirm, ConfirmPrompt, Level, MemoryNotifier, Notification, Notifier};
pub use session::{
    FileStorage, LoginOutcome, MemoryStorage, Session, SessionIdentity, SessionManager, SessionStore,
};
pub use users::{CreateOutcome, RemoveOutcome, UserListController};
pub use workflow::{FormWorkflow, WorkflowState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_version_format() {
        let v = version();
        // Should be semver format: x.y.z
        let parts: Vec<&str> = v.split('.').collect();
        assert_eq!(parts.len(), 3, "Version should be in x.y.z format");
    }
}
