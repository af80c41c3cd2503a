//! Error types for backend access and the account tree view
//!
//! Errors are classified by recoverability:
//! - Retryable: network issues, timeouts, server errors
//! - NonRetryable: rejected payloads, bad responses, configuration
//!
//! Nothing here is fatal to a view. A failed root fetch keeps the stale table,
//! a failed child fetch rolls the row back to collapsed.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::types::AccountId;

/// Errors from backend API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend answered `success: false`; carries its toast text.
    #[error("Rejected by server: {0}")]
    Rejected(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A concurrent request task panicked or was cancelled.
    #[error("Request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    /// Returns true if re-triggering the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ApiError::Status { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ApiError::Http(_) => "Check your connection to the server and try again.",
            ApiError::Status { status, .. } if *status == 401 || *status == 403 => {
                "Sign in again; the session may have expired."
            }
            ApiError::Status { .. } => "The server could not handle the request. Try again.",
            ApiError::Json(_) => "The server sent an unexpected response.",
            ApiError::Rejected(_) => "Review the entered values and save again.",
            ApiError::Validation(_) => "Fill in the required fields.",
            ApiError::InvalidUrl(_) => "Check apiBaseUrl in ~/.bodo/config.json",
            ApiError::Task(_) => "Refresh the list; some changes may already be applied.",
        }
    }
}

/// Errors loading `~/.bodo/config.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not find home directory")]
    NoHomeDir,

    #[error("Failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid apiBaseUrl '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
}

/// Failures surfaced by the account tree view.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Failed to load accounts: {0}")]
    Roots(#[source] ApiError),

    #[error("Failed to load children of account {id}: {source}")]
    Children {
        id: AccountId,
        #[source]
        source: ApiError,
    },

    /// A save or delete failed; the forest was not rebuilt for a save.
    #[error("Failed to save changes: {0}")]
    Mutation(#[source] ApiError),
}

impl ViewError {
    pub fn api_error(&self) -> &ApiError {
        match self {
            ViewError::Roots(e) | ViewError::Mutation(e) => e,
            ViewError::Children { source, .. } => source,
        }
    }
}

/// Serializable notification shown to the user in place of a crash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    pub can_retry: bool,
    pub recovery_suggestion: String,
    /// Row the notice is scoped to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Error,
    Success,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Success,
            can_retry: false,
            recovery_suggestion: String::new(),
            account_id: None,
        }
    }
}

impl From<&ApiError> for Notice {
    fn from(err: &ApiError) -> Self {
        Notice {
            message: err.to_string(),
            kind: NoticeKind::Error,
            can_retry: err.is_retryable(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
            account_id: None,
        }
    }
}

impl From<&ViewError> for Notice {
    fn from(err: &ViewError) -> Self {
        let api = err.api_error();
        let account_id = match err {
            ViewError::Children { id, .. } => Some(id.clone()),
            ViewError::Roots(_) | ViewError::Mutation(_) => None,
        };
        Notice {
            message: err.to_string(),
            kind: NoticeKind::Error,
            // Expanding again is always allowed after a rollback.
            can_retry: account_id.is_some() || api.is_retryable(),
            recovery_suggestion: api.recovery_suggestion().to_string(),
            account_id,
        }
    }
}
