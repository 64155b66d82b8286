//! Config commands
//!
//! Show the effective client configuration.

use anyhow::Result;
use clap::Subcommand;
use roster_core::config::{
    ENV_API_ENDPOINT, ENV_REGISTER_CONTRACT, ENV_REQUIRE_AUTH_FOR_REGISTRATION, ENV_SESSION_PATH,
};
use roster_core::RegisterContract;
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::print_output;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
}

/// Config row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

pub async fn execute(ctx: &Context, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let rows = get_all_config(ctx)?;
    print_output(&rows, ctx.format, "No configuration found.")
}

fn get_all_config(ctx: &Context) -> Result<Vec<ConfigRow>> {
    let mut rows = Vec::new();

    // Flags and env vars are merged by clap, so an explicit value is reported as "set"
    let api_url = ctx.api_url.clone();
    rows.push(ConfigRow {
        key: ENV_API_ENDPOINT.to_string(),
        source: if api_url.is_some() { "set" } else { "n/a" }.to_string(),
        value: api_url.unwrap_or_else(|| "Not set".to_string()),
    });

    let manager = ctx.session_manager()?;
    rows.push(ConfigRow {
        key: ENV_SESSION_PATH.to_string(),
        value: manager.store().storage().path().to_string_lossy().to_string(),
        source: if ctx.session_path.is_some() { "set" } else { "default" }.to_string(),
    });

    rows.push(env_row(ENV_REQUIRE_AUTH_FOR_REGISTRATION, "false"));
    rows.push(env_row(
        ENV_REGISTER_CONTRACT,
        &RegisterContract::default().to_string(),
    ));

    let logged_in = manager
        .store()
        .current_identity()
        .map(|identity| identity.username)
        .unwrap_or_else(|| "-".to_string());
    rows.push(ConfigRow {
        key: "logged_in_as".to_string(),
        value: logged_in,
        source: "session".to_string(),
    });

    Ok(rows)
}

fn env_row(key: &str, default: &str) -> ConfigRow {
    match std::env::var(key) {
        Ok(value) => ConfigRow {
            key: key.to_string(),
            value,
            source: "env".to_string(),
        },
        Err(_) => ConfigRow {
            key: key.to_string(),
            value: default.to_string(),
            source: "default".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_row_default() {
        let row = env_row("ROSTER_TEST_SURELY_UNSET_KEY", "fallback");
        assert_eq!(row.value, "fallback");
        assert_eq!(row.source, "default");
    }
}
