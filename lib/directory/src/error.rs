//! Error types for role-store operations.

use std::fmt;

/// Errors from queries against the hosted role relations.
///
/// These are surfaced to the access pipeline, which degrades them to an
/// unresolved role rather than propagating them to the end user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The connection to the hosted database could not be established.
    ConnectionFailed { details: String },
    /// A query errored.
    QueryFailed { relation: &'static str, details: String },
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed { details } => {
                write!(f, "role store connection failed: {details}")
            }
            Self::QueryFailed { relation, details } => {
                write!(f, "query against {relation} failed: {details}")
            }
        }
    }
}

impl std::error::Error for DirectoryError {}
