//! API error type.
//!
//! Every backend failure arrives as a non-2xx status with an optional
//! `{ "detail": string }` body. [`ApiError`] keeps that detail so the command
//! layer can show the server's own wording and fall back to a per-action
//! message when there is none.

use reqwest::StatusCode;
use shopfront_core::models::ErrorEnvelope;
use thiserror::Error;

/// Errors that can occur when talking to the storefront backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure, timeout, or unreadable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Input rejected locally, before any request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 401: missing, invalid, or expired token.
    #[error("Unauthorized{}", suffix(.0.as_deref()))]
    Unauthorized(Option<String>),

    /// 403: authenticated but not allowed.
    #[error("Forbidden{}", suffix(.0.as_deref()))]
    Forbidden(Option<String>),

    /// 404: resource not found.
    #[error("Not found{}", suffix(.0.as_deref()))]
    NotFound(Option<String>),

    /// Any other non-success status.
    #[error("HTTP {status}{}", suffix(.detail.as_deref()))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
}

fn suffix(detail: Option<&str>) -> String {
    detail.map_or_else(String::new, |d| format!(": {d}"))
}

impl ApiError {
    /// Build an error from a non-success status and its raw body.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|env| env.detail);

        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(detail),
            StatusCode::FORBIDDEN => Self::Forbidden(detail),
            StatusCode::NOT_FOUND => Self::NotFound(detail),
            _ => Self::Status { status, detail },
        }
    }

    /// The server-provided `detail`, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(detail) | Self::Forbidden(detail) | Self::NotFound(detail) => {
                detail.as_deref()
            }
            Self::Status { detail, .. } => detail.as_deref(),
            Self::InvalidInput(msg) => Some(msg),
            Self::Http(_) | Self::Url(_) | Self::Parse(_) => None,
        }
    }

    /// Message to show the user: the server detail, or `fallback`.
    #[must_use]
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.detail().unwrap_or(fallback)
    }

    /// Whether this is a 404, which views render as an empty state.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether this is a 401, meaning the session is no longer valid.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}
