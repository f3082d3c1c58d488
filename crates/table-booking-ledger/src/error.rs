//! Failures of ledger operations

use thiserror::Error;

/// Reason a ledger operation was refused
///
/// None of these is fatal. The message is meant to be shown to the client
/// verbatim.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum LedgerError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),
    /// The referenced table or reservation does not exist
    #[error("{0}")]
    NotFound(String),
    /// The table is already reserved
    #[error("{0}")]
    Conflict(String),
    /// The party does not fit at the table
    #[error("{0}")]
    Capacity(String),
}

impl LedgerError {
    /// HTTP status the error is reported with
    pub fn status(&self) -> u16 {
        match self {
            LedgerError::NotFound(_) => 404,
            LedgerError::Validation(_) | LedgerError::Conflict(_) | LedgerError::Capacity(_) => 400,
        }
    }

    /// Short name of the error kind, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::Validation(_) => "validation",
            LedgerError::NotFound(_) => "not_found",
            LedgerError::Conflict(_) => "conflict",
            LedgerError::Capacity(_) => "capacity",
        }
    }

    /// The human-readable message
    pub fn message(&self) -> &str {
        match self {
            LedgerError::Validation(msg)
            | LedgerError::NotFound(msg)
            | LedgerError::Conflict(msg)
            | LedgerError::Capacity(msg) => msg,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
