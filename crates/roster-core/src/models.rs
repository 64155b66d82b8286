//! Data models for the user-management API

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};

/// User as returned by `GET /api/users`.
///
/// The password is write-only on the API and is never read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: i64,
    pub username: String,
    pub fullname: String,
}

/// Editable staging buffer for the add and update forms
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub fullname: String,
    pub username: String,
    pub password: String,
}

impl UserDraft {
    /// Seed a draft from an existing record, password left blank
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            fullname: record.fullname.clone(),
            username: record.username.clone(),
            password: String::new(),
        }
    }

    /// Every field is required when creating a user
    pub fn validate_for_create(&self) -> Result<()> {
        if self.fullname.trim().is_empty() {
            return Err(Error::validation("Full name is required"));
        }
        if self.username.trim().is_empty() {
            return Err(Error::validation("Username is required"));
        }
        if self.password.is_empty() {
            return Err(Error::validation("Password is required"));
        }
        Ok(())
    }

    /// Build the PUT body; an empty password is left out so it is never cleared
    pub fn to_update_request(&self) -> UpdateUserRequest {
        UpdateUserRequest {
            fullname: self.fullname.clone(),
            username: self.username.clone(),
            password: (!self.password.is_empty()).then(|| self.password.clone()),
        }
    }

    /// Overwrite the editable fields of `record` with this draft
    pub fn apply_to(&self, record: &mut UserRecord) {
        record.fullname = self.fullname.clone();
        record.username = self.username.clone();
    }
}

/// Body of `PUT /api/users/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateUserRequest {
    pub fullname: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Body of `POST /api/auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Reply of `POST /api/auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Field naming used for `POST /api/auth/register`.
///
/// `V1` is what the dashboard sends; `Legacy` is the older self-registration
/// form (`fullName` / `passwordx`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterContract {
    #[default]
    V1,
    Legacy,
}

impl RegisterContract {
    /// Serialize a draft into this contract's request body
    pub fn body(&self, draft: &UserDraft) -> serde_json::Value {
        match self {
            RegisterContract::V1 => json!({
                "fullname": draft.fullname,
                "username": draft.username,
                "password": draft.password,
            }),
            RegisterContract::Legacy => json!({
                "fullName": draft.fullname,
                "username": draft.username,
                "passwordx": draft.password,
            }),
        }
    }
}

impl std::str::FromStr for RegisterContract {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "v1" => Ok(RegisterContract::V1),
            "legacy" => Ok(RegisterContract::Legacy),
            other => Err(Error::config(format!(
                "Invalid register contract: {}. Use 'v1' or 'legacy'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for RegisterContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegisterContract::V1 => write!(f, "v1"),
            RegisterContract::Legacy => write!(f, "legacy"),
        }
    }
}

/// Self-registration form, with the confirmation field the add-user form lacks
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub draft: UserDraft,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<()> {
        if self.draft.password != self.confirm_password {
            return Err(Error::validation("Passwords don't match!"));
        }
        self.draft.validate_for_create()
    }
}
