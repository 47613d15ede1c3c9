//! Remote failure taxonomy.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Failure of a list/pull/push call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Remote file absent; callers treat this as "no data yet".
    NotFound { path: String },
    /// 401/403: the configured credential is rejected.
    Auth { status: u16 },
    /// Any other non-2xx status, or a network failure (`status = None`).
    Transport {
        status: Option<u16>,
        message: String,
    },
    /// Malformed base64, UTF-8 or JSON in a remote payload.
    Parse(String),
    /// Caller input rejected before any request was sent.
    InvalidRequest(String),
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// HTTP status behind this error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Auth { status } => Some(*status),
            Self::Transport { status, .. } => *status,
            Self::Parse(_) | Self::InvalidRequest(_) => None,
        }
    }

    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Auth { .. } => "auth",
            Self::Transport { .. } => "transport",
            Self::Parse(_) => "parse",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "remote file `{path}` does not exist yet"),
            Self::Auth { status } => write!(
                f,
                "remote authentication failed ({status}); check the configured token"
            ),
            Self::Transport {
                status: Some(status),
                message,
            } => write!(f, "remote API error {status}: {message}"),
            Self::Transport {
                status: None,
                message,
            } => write!(f, "remote request failed: {message}"),
            Self::Parse(message) => write!(f, "invalid remote payload: {message}"),
            Self::InvalidRequest(message) => write!(f, "invalid remote request: {message}"),
        }
    }
}

impl Error for RemoteError {}
