//! Error types for access policies and sessions.

use std::io;

/// Errors raised while loading policies, navigation trees or directories.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Failed to read a configuration file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// YAML input did not match the expected shape.
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON input did not match the expected shape.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A module name that is not part of the system.
    #[error("Unknown module '{0}'.")]
    UnknownModule(String),
}

impl AccessError {
    /// Create a read error for `path`.
    pub fn read(path: impl Into<String>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by the session state machine and auth providers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The event is not legal in the current state.
    #[error("Cannot apply '{event}' while {state}.")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },

    /// Email and password did not match an account.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// An operation needed a signed-in user.
    #[error("No user is signed in.")]
    NotSignedIn,

    /// The provider failed for another reason.
    #[error("Auth provider failed: {0}")]
    Provider(String),
}

impl SessionError {
    /// Create a provider error.
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }
}
