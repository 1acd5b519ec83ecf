//! Connection settings resolution.
//!
//! Each setting comes from the command line or its environment variable (clap
//! handles both), then a built-in default, then an interactive prompt.

use std::io::IsTerminal;
use std::time::Duration;

use dialoguer::{theme::ColorfulTheme, Input, Password};

use crate::cli::ConnectionArgs;
use crate::error::{OdooError, Result};
use crate::session::Credentials;

/// Server used when no address is configured
pub const DEFAULT_URL: &str = "https://erp.cloudgenia.app";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved connection settings, before authentication
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub credentials: Credentials,
    pub timeout: Duration,
}

/// Source of values for settings that were not supplied
pub trait Prompter {
    fn text(&self, label: &str) -> Result<String>;
    fn secret(&self, label: &str) -> Result<String>;
}

/// Prompts on the terminal with dialoguer
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn text(&self, label: &str) -> Result<String> {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(label)
            .interact_text()
            .map_err(|e| OdooError::Prompt(e.to_string()))
    }

    fn secret(&self, label: &str) -> Result<String> {
        Password::with_theme(&ColorfulTheme::default())
            .with_prompt(label)
            .interact()
            .map_err(|e| OdooError::Prompt(e.to_string()))
    }
}

/// Refuses to prompt; used when stdin is not a terminal
pub struct NoPrompter;

impl Prompter for NoPrompter {
    fn text(&self, label: &str) -> Result<String> {
        Err(OdooError::InvalidInput(format!(
            "{} is required (pass it as a flag or environment variable)",
            label
        )))
    }

    fn secret(&self, label: &str) -> Result<String> {
        self.text(label)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(value: Option<String>, prompt: impl FnOnce() -> Result<String>) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => {
            let v = prompt()?;
            non_empty(Some(&v)).ok_or_else(|| OdooError::InvalidInput("empty value".to_string()))
        },
    }
}

impl ConnectionConfig {
    /// Resolve settings, prompting through `prompter` for missing credentials.
    pub fn resolve(args: &ConnectionArgs, prompter: &dyn Prompter) -> Result<Self> {
        let server = non_empty(args.url.as_deref()).unwrap_or_else(|| DEFAULT_URL.to_string());
        let database = required(non_empty(args.db.as_deref()), || prompter.text("Database"))?;
        let username = required(non_empty(args.user.as_deref()), || prompter.text("Username"))?;
        // Passwords are taken verbatim, surrounding spaces included
        let password = match args.password.as_deref().filter(|p| !p.is_empty()) {
            Some(p) => p.to_string(),
            None => required(None, || prompter.secret("Password"))?,
        };

        let timeout = Duration::from_secs(args.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS));

        tracing::debug!(server = %server, database = %database, username = %username, "Resolved connection settings");

        Ok(Self {
            credentials: Credentials {
                server,
                database,
                username,
                password,
            },
            timeout,
        })
    }

    /// Resolve with terminal prompts when stdin is interactive.
    pub fn resolve_interactive(args: &ConnectionArgs) -> Result<Self> {
        if std::io::stdin().is_terminal() {
            Self::resolve(args, &TerminalPrompter)
        } else {
            Self::resolve(args, &NoPrompter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakePrompter {
        asked: RefCell<Vec<String>>,
    }

    impl Prompter for FakePrompter {
        fn text(&self, label: &str) -> Result<String> {
            self.asked.borrow_mut().push(label.to_string());
            Ok(format!("{}-typed", label.to_lowercase()))
        }

        fn secret(&self, label: &str) -> Result<String> {
            self.asked.borrow_mut().push(label.to_string());
            Ok("typed-secret".to_string())
        }
    }

    #[test]
    fn test_all_supplied_no_prompt() {
        let args = ConnectionArgs {
            url: Some("https://odoo.local".to_string()),
            db: Some("prod".to_string()),
            user: Some("admin".to_string()),
            password: Some("pw".to_string()),
            timeout: Some(5),
        };

        let config = ConnectionConfig::resolve(&args, &NoPrompter).unwrap();

        assert_eq!(config.credentials.server, "https://odoo.local");
        assert_eq!(config.credentials.database, "prod");
        assert_eq!(config.credentials.username, "admin");
        assert_eq!(config.credentials.password, "pw");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_defaults_and_prompts() {
        let args = ConnectionArgs {
            user: Some("admin".to_string()),
            ..Default::default()
        };
        let prompter = FakePrompter {
            asked: RefCell::new(Vec::new()),
        };

        let config = ConnectionConfig::resolve(&args, &prompter).unwrap();

        assert_eq!(config.credentials.server, DEFAULT_URL);
        assert_eq!(config.credentials.database, "database-typed");
        assert_eq!(config.credentials.password, "typed-secret");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(*prompter.asked.borrow(), vec!["Database", "Password"]);
    }

    #[test]
    fn test_missing_without_terminal_is_invalid_input() {
        let args = ConnectionArgs {
            db: Some("prod".to_string()),
            ..Default::default()
        };

        let err = ConnectionConfig::resolve(&args, &NoPrompter).unwrap_err();

        assert!(matches!(err, OdooError::InvalidInput(_)));
        assert!(err.to_string().contains("Username"));
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let args = ConnectionArgs {
            url: Some("  ".to_string()),
            db: Some(" ".to_string()),
            user: Some("admin".to_string()),
            password: Some("pw".to_string()),
            timeout: None,
        };
        let prompter = FakePrompter {
            asked: RefCell::new(Vec::new()),
        };

        let config = ConnectionConfig::resolve(&args, &prompter).unwrap();

        assert_eq!(config.credentials.server, DEFAULT_URL);
        assert_eq!(config.credentials.database, "database-typed");
    }
}
