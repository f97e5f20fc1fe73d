//! Transient user-facing notices.
//!
//! Commands report their outcome here instead of returning errors to the
//! view layer. Views subscribe and render notices however they like (toast,
//! status line, stderr); nothing is retained once delivered.

use core::fmt;

use tokio::sync::broadcast;
use tracing::{info, warn};

const CHANNEL_CAPACITY: usize = 64;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Broadcast channel of notices, shared by every state object.
#[derive(Debug, Clone)]
pub struct Notices {
    tx: broadcast::Sender<Notice>,
}

impl Default for Notices {
    fn default() -> Self {
        Self::new()
    }
}

impl Notices {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Receive every notice published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.publish(NoticeLevel::Success, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.publish(NoticeLevel::Info, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.publish(NoticeLevel::Error, message.into());
    }

    fn publish(&self, level: NoticeLevel, message: String) {
        match level {
            NoticeLevel::Error => warn!(notice = %message, "user notice"),
            NoticeLevel::Success | NoticeLevel::Info => info!(notice = %message, "user notice"),
        }
        // No subscribers is fine: nobody is looking.
        let _ = self.tx.send(Notice { level, message });
    }
}
