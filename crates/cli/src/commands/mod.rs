//! CLI command implementations.
//!
//! Every command builds a [`Shell`] around a fresh [`Storefront`], runs, and
//! prints whatever notices the client published.

pub mod account;
pub mod admin;
pub mod catalog;
pub mod collections;
pub mod orders;

use shopfront_client::{ApiError, ClientConfig, ConfigError, Credentials, Notice, NoticeLevel, Storefront};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A backend call failed.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// The command needs an account but none is configured.
    #[error("Login required: set SHOPFRONT_EMAIL and SHOPFRONT_PASSWORD")]
    LoginRequired,

    /// Credentials were rejected.
    #[error("Login failed for {0}")]
    LoginFailed(String),

    /// An identifier argument was malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The client refused or failed the command (details were printed).
    #[error("{0} failed")]
    Rejected(&'static str),
}

/// A storefront plus the notice stream printed to stderr.
pub struct Shell {
    pub store: Storefront,
    notices: broadcast::Receiver<Notice>,
}

impl Shell {
    /// Browse without logging in.
    pub fn anonymous() -> Result<Self, CommandError> {
        let config = ClientConfig::from_env()?;
        let store = Storefront::new(&config)?;
        let notices = store.notices().subscribe();
        Ok(Self { store, notices })
    }

    /// Log in with `SHOPFRONT_EMAIL` / `SHOPFRONT_PASSWORD`.
    pub async fn logged_in() -> Result<Self, CommandError> {
        let mut shell = Self::anonymous()?;
        let credentials = Credentials::from_env()?.ok_or(CommandError::LoginRequired)?;
        tracing::debug!(?credentials, "Logging in");
        if !shell
            .store
            .login(&credentials.email, &credentials.password)
            .await
        {
            shell.flush();
            return Err(CommandError::LoginFailed(credentials.email));
        }
        // The welcome notice is noise for a one-shot command.
        shell.discard();
        Ok(shell)
    }

    /// Turn a command's success signal into a result, printing its notices.
    pub fn ensure(&mut self, ok: bool, command: &'static str) -> Result<(), CommandError> {
        self.flush();
        if ok {
            Ok(())
        } else {
            Err(CommandError::Rejected(command))
        }
    }

    /// Print pending notices.
    #[allow(clippy::print_stderr)]
    pub fn flush(&mut self) {
        while let Some(notice) = self.next_notice() {
            let tag = match notice.level {
                NoticeLevel::Success => "ok",
                NoticeLevel::Info => "info",
                NoticeLevel::Error => "error",
            };
            eprintln!("[{tag}] {notice}");
        }
    }

    fn discard(&mut self) {
        while self.next_notice().is_some() {}
    }

    fn next_notice(&mut self) -> Option<Notice> {
        loop {
            match self.notices.try_recv() {
                Ok(notice) => return Some(notice),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Dropped notices");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Format a decimal amount as dollars.
pub fn dollars(amount: rust_decimal::Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}
