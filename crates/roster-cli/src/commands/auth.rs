//! Auth commands
//!
//! Log in, register, log out and show the current identity.

use anyhow::{anyhow, Result};
use clap::Args;
use roster_core::{ApiClient, LoginOutcome, RegistrationForm, SessionIdentity, UserDraft};
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::{print_aside, print_error, print_info, print_single, print_success};

#[derive(Args)]
pub struct LoginArgs {
    /// Username
    #[arg(short, long)]
    pub username: String,

    /// Password (or set ROSTER_PASSWORD)
    #[arg(short, long, env = "ROSTER_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args)]
pub struct RegisterArgs {
    /// Full name
    #[arg(short, long)]
    pub fullname: String,

    /// Username
    #[arg(short, long)]
    pub username: String,

    /// Password (or set ROSTER_PASSWORD)
    #[arg(short, long, env = "ROSTER_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Repeat the password
    #[arg(long)]
    pub confirm_password: String,
}

/// Identity row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct IdentityRow {
    #[tabled(rename = "User ID")]
    pub user_id: i64,
    #[tabled(rename = "Username")]
    pub username: String,
    #[tabled(rename = "Full Name")]
    pub fullname: String,
    #[tabled(rename = "Token Expires")]
    pub expires: String,
}

impl From<&SessionIdentity> for IdentityRow {
    fn from(identity: &SessionIdentity) -> Self {
        Self {
            user_id: identity.user_id,
            username: identity.username.clone(),
            fullname: identity.fullname.clone().unwrap_or_else(|| "-".to_string()),
            expires: identity
                .expires_at()
                .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub async fn login(ctx: &Context, args: LoginArgs) -> Result<()> {
    let config = ctx.client_config()?;
    let manager = ctx.session_manager()?;
    let api = ApiClient::new(&config)?;

    match manager.login(&api, &args.username, &args.password).await {
        Ok(LoginOutcome::AlreadyLoggedIn(session)) => {
            print_info(
                &format!(
                    "Already logged in as {}. Run `roster logout` first to switch users.",
                    session.identity().username
                ),
                ctx.quiet,
            );
            Ok(())
        }
        Ok(LoginOutcome::LoggedIn(session)) => {
            print_success(
                &format!("Logged in as {}", session.identity().username),
                ctx.quiet,
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Login error: {}", e);
            Err(anyhow!("Invalid username or password"))
        }
    }
}

pub async fn register(ctx: &Context, args: RegisterArgs) -> Result<()> {
    let config = ctx.client_config()?;
    let api = ApiClient::new(&config)?;

    let form = RegistrationForm {
        draft: UserDraft {
            fullname: args.fullname,
            username: args.username,
            password: args.password,
        },
        confirm_password: args.confirm_password,
    };

    match api.register_account(&form).await {
        Ok(_) => {
            print_success("Registration successful.", ctx.quiet);
            print_info("Run `roster login` to sign in.", ctx.quiet);
            Ok(())
        }
        Err(roster_core::Error::Validation(msg)) => Err(anyhow!(msg)),
        Err(roster_core::Error::Api {
            message: Some(msg), ..
        }) => Err(anyhow!(msg)),
        Err(e) => {
            log::error!("Registration error: {}", e);
            Err(anyhow!("An error occurred during registration"))
        }
    }
}

pub async fn logout(ctx: &Context) -> Result<()> {
    let manager = ctx.session_manager()?;
    manager.logout()?;
    print_success("Logged out.", ctx.quiet);
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    let manager = ctx.session_manager()?;
    match manager.store().current_identity() {
        Some(identity) => {
            print_aside(&format!("Hello, {}", identity.username), ctx.format, ctx.quiet);
            print_single(&IdentityRow::from(&identity), ctx.format)
        }
        None => {
            print_error("Not logged in.");
            Err(anyhow!("No valid session. Run `roster login` to sign in."))
        }
    }
}
