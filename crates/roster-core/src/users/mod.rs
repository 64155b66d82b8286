//! User list controller
//!
//! Holds the in-memory roster and reconciles it after mutations:
//! - delete: filter out the record locally
//! - update: patch the record in place from the draft (no refetch)
//! - create: refetch the whole list

use crate::api::UserApi;
use crate::error::{Error, Result};
use crate::models::{UserDraft, UserRecord};
use crate::notify::{Confirm, ConfirmPrompt, Notification, Notifier};

/// What happened to a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Deleted,
    /// The operator said no; nothing was sent
    Declined,
}

/// How a create request ended
#[derive(Debug)]
pub enum CreateOutcome {
    /// Registered and the list was refetched
    Created,
    /// Registered, but the follow-up fetch failed and the local list is stale
    ListStale(Error),
}

/// In-memory roster backed by the API
pub struct UserListController<A: UserApi> {
    api: A,
    users: Vec<UserRecord>,
}

impl<A: UserApi> UserListController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            users: Vec::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Users in server response order
    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn find(&self, user_id: i64) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    /// Replace the list with the server's.
    ///
    /// Callers treat any error here as an invalid session and send the
    /// operator back to login.
    pub async fn refresh(&mut self) -> Result<&[UserRecord]> {
        let users = self.api.list_users().await?;
        log::debug!("Fetched {} users", users.len());
        self.users = users;
        Ok(&self.users)
    }

    /// Delete a user after the operator confirms
    pub async fn remove(
        &mut self,
        user_id: i64,
        confirm: &dyn Confirm,
        notifier: &dyn Notifier,
    ) -> Result<RemoveOutcome> {
        if !confirm.confirm(&ConfirmPrompt::delete_user()) {
            log::debug!("Delete of user {} declined", user_id);
            return Ok(RemoveOutcome::Declined);
        }

        if let Err(e) = self.api.delete_user(user_id).await {
            log::error!("Error deleting user {}: {}", user_id, e);
            notifier.notify(Notification::error(
                "Error",
                "There was an issue deleting the user.",
            ));
            return Err(e);
        }

        notifier.notify(Notification::success("Deleted!", "The user has been deleted."));
        self.users.retain(|u| u.user_id != user_id);
        Ok(RemoveOutcome::Deleted)
    }

    /// Register a new user, then resync the whole list.
    ///
    /// A failed refetch after a successful register is reported through the
    /// notifier and returned as [`CreateOutcome::ListStale`]; the user exists
    /// server-side, so it must not be registered again.
    pub async fn create(&mut self, draft: &UserDraft, notifier: &dyn Notifier) -> Result<CreateOutcome> {
        draft.validate_for_create()?;

        match self.api.register_user(draft).await {
            Ok(created) => log::debug!("Created user: {}", created),
            Err(e) => {
                log::error!("Error adding user: {}", e);
                notifier.notify(Notification::error(
                    "Error",
                    "There was an issue creating the user.",
                ));
                return Err(e);
            }
        }

        if let Err(e) = self.refresh().await {
            log::error!("Error reloading users after create: {}", e);
            notifier.notify(Notification::error(
                "Error",
                "There was an issue creating the user.",
            ));
            return Ok(CreateOutcome::ListStale(e));
        }
        Ok(CreateOutcome::Created)
    }

    /// Update a listed user; the local record is patched from the draft on success
    pub async fn update(&mut self, user_id: i64, draft: &UserDraft, notifier: &dyn Notifier) -> Result<()> {
        if self.find(user_id).is_none() {
            return Err(Error::validation("User details are missing or invalid."));
        }

        let body = draft.to_update_request();
        if let Err(e) = self.api.update_user(user_id, &body).await {
            log::error!("Error updating user {}: {}", user_id, e);
            notifier.notify(Notification::error(
                "Error",
                format!("There was an issue updating the user: {}", e),
            ));
            return Err(e);
        }

        if let Some(record) = self.users.iter_mut().find(|u| u.user_id == user_id) {
            draft.apply_to(record);
        }
        Ok(())
    }
}
