//! Form workflows: view, add and update a user.
//!
//! A single state value holds whichever form is open, so two forms can never
//! be open at once. Opening a form while another is open discards the other
//! one's draft, the same as cancelling it.

use crate::api::UserApi;
use crate::error::{Error, Result};
use crate::models::{UserDraft, UserRecord};
use crate::notify::{Notification, Notifier};
use crate::users::{CreateOutcome, UserListController};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkflowState {
    #[default]
    Closed,
    /// Read-only copy of the selected record
    Viewing(UserRecord),
    Adding(UserDraft),
    Updating { user_id: i64, draft: UserDraft },
}

impl WorkflowState {
    fn name(&self) -> &'static str {
        match self {
            WorkflowState::Closed => "closed",
            WorkflowState::Viewing(_) => "viewing",
            WorkflowState::Adding(_) => "adding",
            WorkflowState::Updating { .. } => "updating",
        }
    }
}

/// Drives the modal forms of the user dashboard
#[derive(Debug, Default)]
pub struct FormWorkflow {
    state: WorkflowState,
}

impl FormWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != WorkflowState::Closed
    }

    fn transition(&mut self, next: WorkflowState) {
        if self.is_open() {
            log::debug!("Discarding open {} form", self.state.name());
        }
        log::debug!("Workflow -> {}", next.name());
        self.state = next;
    }

    pub fn open_view(&mut self, record: &UserRecord) {
        self.transition(WorkflowState::Viewing(record.clone()));
    }

    pub fn open_add(&mut self) {
        self.transition(WorkflowState::Adding(UserDraft::default()));
    }

    pub fn open_update(&mut self, record: &UserRecord) {
        self.transition(WorkflowState::Updating {
            user_id: record.user_id,
            draft: UserDraft::from_record(record),
        });
    }

    /// The record being viewed, if the view form is open
    pub fn viewing(&self) -> Option<&UserRecord> {
        match &self.state {
            WorkflowState::Viewing(record) => Some(record),
            _ => None,
        }
    }

    /// Editable draft of the add or update form
    pub fn draft_mut(&mut self) -> Option<&mut UserDraft> {
        match &mut self.state {
            WorkflowState::Adding(draft) | WorkflowState::Updating { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Close whatever is open, dropping its draft
    pub fn cancel(&mut self) {
        if self.is_open() {
            log::debug!("Cancelled {} form", self.state.name());
        }
        self.state = WorkflowState::Closed;
    }

    /// Submit the open add/update form.
    ///
    /// On success the form closes and a success notification is shown; on
    /// failure it stays open with its draft so the operator can retry or cancel.
    /// The one exception is an add whose register went through but whose list
    /// reload failed: the form closes and the reload error is returned.
    pub async fn submit<A: UserApi>(
        &mut self,
        list: &mut UserListController<A>,
        notifier: &dyn Notifier,
    ) -> Result<()> {
        let submitted = match &self.state {
            WorkflowState::Adding(draft) => match list.create(draft, notifier).await? {
                CreateOutcome::Created => Ok("User has been created."),
                CreateOutcome::ListStale(e) => Err(e),
            },
            WorkflowState::Updating { user_id, draft } => {
                list.update(*user_id, draft, notifier).await?;
                Ok("User details updated successfully.")
            }
            WorkflowState::Viewing(_) => {
                return Err(Error::validation("The view form has nothing to submit"));
            }
            WorkflowState::Closed => return Err(Error::validation("No form is open")),
        };

        let message = match submitted {
            Ok(message) => message,
            Err(e) => {
                // Registered already, so nothing is left to resubmit
                self.state = WorkflowState::Closed;
                return Err(e);
            }
        };

        notifier.notify(Notification::success("Success", message));
        self.state = WorkflowState::Closed;
        Ok(())
    }
}
