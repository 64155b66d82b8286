//! User commands
//!
//! Commands for managing users: list, show, add, update, delete.

use anyhow::{anyhow, Result};
use clap::Subcommand;
use roster_core::{AutoConfirm, Confirm, FormWorkflow, RemoveOutcome, UserDraft, UserRecord};
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::{
    print_aside, print_info, print_output, print_single, StdinConfirm, TerminalNotifier,
};

#[derive(Subcommand)]
pub enum UsersAction {
    /// List users
    List,

    /// Show user details
    Show {
        /// User ID
        id: i64,
    },

    /// Add a new user
    Add {
        /// Full name
        #[arg(short, long)]
        fullname: String,

        /// Username
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },

    /// Update an existing user
    Update {
        /// User ID
        id: i64,

        /// New full name
        #[arg(short, long)]
        fullname: Option<String>,

        /// New username
        #[arg(short, long)]
        username: Option<String>,

        /// New password (left unchanged when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Delete a user
    Delete {
        /// User ID
        id: i64,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// User row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct UserRow {
    #[tabled(rename = "ID")]
    pub user_id: i64,
    #[tabled(rename = "Username")]
    pub username: String,
    #[tabled(rename = "Full Name")]
    pub fullname: String,
}

impl From<&UserRecord> for UserRow {
    fn from(user: &UserRecord) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username.clone(),
            fullname: user.fullname.clone(),
        }
    }
}

pub async fn execute(ctx: &Context, action: UsersAction) -> Result<()> {
    match action {
        UsersAction::List => list_users(ctx).await,
        UsersAction::Show { id } => show_user(ctx, id).await,
        UsersAction::Add {
            fullname,
            username,
            password,
        } => {
            let draft = UserDraft {
                fullname,
                username,
                password,
            };
            add_user(ctx, draft).await
        }
        UsersAction::Update {
            id,
            fullname,
            username,
            password,
        } => update_user(ctx, id, fullname, username, password).await,
        UsersAction::Delete { id, force } => delete_user(ctx, id, force).await,
    }
}

async fn list_users(ctx: &Context) -> Result<()> {
    let (session, list) = ctx.load_users().await?;
    print_aside(
        &format!("Hello, {}", session.identity().username),
        ctx.format,
        ctx.quiet,
    );

    let rows: Vec<UserRow> = list.users().iter().map(UserRow::from).collect();
    print_output(&rows, ctx.format, "No users found.")
}

async fn show_user(ctx: &Context, id: i64) -> Result<()> {
    let (_, list) = ctx.load_users().await?;
    let record = list
        .find(id)
        .ok_or_else(|| anyhow!("User not found: {}", id))?;

    let mut workflow = FormWorkflow::new();
    workflow.open_view(record);
    if let Some(viewed) = workflow.viewing() {
        print_single(&UserRow::from(viewed), ctx.format)?;
    }
    workflow.cancel();
    Ok(())
}

async fn add_user(ctx: &Context, draft: UserDraft) -> Result<()> {
    let (_, mut list) = ctx.load_users().await?;
    let notifier = TerminalNotifier { quiet: ctx.quiet };

    let mut workflow = FormWorkflow::new();
    workflow.open_add();
    if let Some(form) = workflow.draft_mut() {
        *form = draft;
    }
    workflow
        .submit(&mut list, &notifier)
        .await
        .map_err(|e| ctx.mutation_failed(e))
}

async fn update_user(
    ctx: &Context,
    id: i64,
    fullname: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    if fullname.is_none() && username.is_none() && password.is_none() {
        return Err(anyhow!(
            "Nothing to update. Pass --fullname, --username or --password."
        ));
    }

    let (_, mut list) = ctx.load_users().await?;
    let record = list
        .find(id)
        .cloned()
        .ok_or_else(|| anyhow!("User not found: {}", id))?;
    let notifier = TerminalNotifier { quiet: ctx.quiet };

    let mut workflow = FormWorkflow::new();
    workflow.open_update(&record);
    if let Some(draft) = workflow.draft_mut() {
        apply_edits(draft, fullname, username, password);
    }
    workflow
        .submit(&mut list, &notifier)
        .await
        .map_err(|e| ctx.mutation_failed(e))
}

/// Overwrite only the fields the operator passed
fn apply_edits(
    draft: &mut UserDraft,
    fullname: Option<String>,
    username: Option<String>,
    password: Option<String>,
) {
    if let Some(fullname) = fullname {
        draft.fullname = fullname;
    }
    if let Some(username) = username {
        draft.username = username;
    }
    if let Some(password) = password {
        draft.password = password;
    }
}

async fn delete_user(ctx: &Context, id: i64, force: bool) -> Result<()> {
    let (_, mut list) = ctx.load_users().await?;
    let notifier = TerminalNotifier { quiet: ctx.quiet };
    let confirm: Box<dyn Confirm> = if force {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(StdinConfirm)
    };

    let outcome = list
        .remove(id, confirm.as_ref(), &notifier)
        .await
        .map_err(|e| ctx.mutation_failed(e))?;
    match outcome {
        RemoveOutcome::Deleted => Ok(()),
        RemoveOutcome::Declined => {
            print_info("Cancelled.", ctx.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_edits_only_touches_given_fields() {
        let mut draft = UserDraft {
            fullname: "Jane Doe".to_string(),
            username: "jdoe".to_string(),
            password: String::new(),
        };
        apply_edits(&mut draft, None, Some("jane".to_string()), None);
        assert_eq!(draft.fullname, "Jane Doe");
        assert_eq!(draft.username, "jane");
        assert!(draft.password.is_empty());
    }

    #[test]
    fn test_user_row_from_record() {
        let record = UserRecord {
            user_id: 7,
            username: "cid".to_string(),
            fullname: "Cid".to_string(),
        };
        let row = UserRow::from(&record);
        assert_eq!(row.user_id, 7);
        assert_eq!(row.fullname, "Cid");
    }
}
