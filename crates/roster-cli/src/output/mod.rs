//! Output formatting module
//!
//! Provides table and JSON output formatting for CLI commands, plus the
//! terminal implementations of notifications and confirmation prompts.

use std::fmt::Display;
use std::io::{BufRead, Write};

use roster_core::{Confirm, ConfirmPrompt, Level, Notification, Notifier};
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format: {}. Use 'table' or 'json'", s)),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a list as a table or pretty JSON; `empty` is shown for an empty table
pub fn render_output<T>(data: &[T], format: OutputFormat, empty: &str) -> anyhow::Result<String>
where
    T: Serialize + Tabled,
{
    Ok(match format {
        OutputFormat::Table if data.is_empty() => empty.to_string(),
        OutputFormat::Table => Table::new(data).to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
    })
}

/// Render one item; tables get a single row
pub fn render_single<T>(item: &T, format: OutputFormat) -> anyhow::Result<String>
where
    T: Serialize + Tabled,
{
    Ok(match format {
        OutputFormat::Table => Table::new([item]).to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(item)?,
    })
}

pub fn print_output<T>(data: &[T], format: OutputFormat, empty: &str) -> anyhow::Result<()>
where
    T: Serialize + Tabled,
{
    println!("{}", render_output(data, format, empty)?);
    Ok(())
}

pub fn print_single<T>(item: &T, format: OutputFormat) -> anyhow::Result<()>
where
    T: Serialize + Tabled,
{
    println!("{}", render_single(item, format)?);
    Ok(())
}

/// Print a success message (respects quiet mode)
pub fn print_success(message: &str, quiet: bool) {
    if !quiet {
        println!("{}", colored::Colorize::green(message));
    }
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{}", colored::Colorize::red(message));
}

/// Print an info message (respects quiet mode)
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        println!("{}", message);
    }
}

/// Print a greeting or other aside; goes to stderr in JSON mode so stdout stays parseable
pub fn print_aside(message: &str, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Table => println!("{}", message),
        OutputFormat::Json => eprintln!("{}", message),
    }
}

fn format_notification(notification: &Notification) -> String {
    format!("{}: {}", notification.title, notification.text)
}

/// Notifications as coloured terminal lines; errors always go to stderr
pub struct TerminalNotifier {
    pub quiet: bool,
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        let line = format_notification(&notification);
        match notification.level {
            Level::Success => print_success(&line, self.quiet),
            Level::Error => print_error(&line),
        }
    }
}

/// Reads a y/N answer from stdin
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        print!(
            "{} {} ({}) [y/N] ",
            colored::Colorize::yellow(prompt.title.as_str()),
            prompt.text,
            prompt.confirm_label
        );
        if std::io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                log::warn!("Could not read confirmation: {}", e);
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
