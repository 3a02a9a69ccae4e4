//! Error types for the access crate.

use std::fmt;

/// Errors from the hosted identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The supplied credentials were rejected.
    InvalidCredentials,
    /// The provider could not be reached or answered with a server error.
    ProviderUnavailable { reason: String },
    /// The provider answered with a payload we could not interpret.
    InvalidResponse { reason: String },
    /// An operation required an active session and none exists.
    NoActiveSession,
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::ProviderUnavailable { reason } => {
                write!(f, "identity provider unavailable: {reason}")
            }
            Self::InvalidResponse { reason } => {
                write!(f, "invalid identity provider response: {reason}")
            }
            Self::NoActiveSession => write!(f, "no active session"),
        }
    }
}

impl std::error::Error for IdentityError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_credentials_display() {
        assert_eq!(
            IdentityError::InvalidCredentials.to_string(),
            "invalid credentials"
        );
    }

    #[test]
    fn provider_unavailable_display() {
        let err = IdentityError::ProviderUnavailable {
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("unavailable"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn invalid_response_display() {
        let err = IdentityError::InvalidResponse {
            reason: "missing user id".to_string(),
        };
        assert!(err.to_string().contains("missing user id"));
    }
}
