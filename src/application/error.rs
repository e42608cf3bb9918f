//! Application error definitions
//!
//! One error type shared by every command / query handler

use thiserror::Error;

use crate::application::ports::{RepositoryError, SessionError};
use crate::domain::ledger::{AccountNum, LedgerError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Caller-correctable field value problem
    #[error("{0}")]
    Validation(String),

    /// Role or ownership mismatch
    #[error("{0}")]
    Forbidden(String),

    /// Unknown entity
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Username / password mismatch
    #[error("That username and password combination is incorrect")]
    InvalidCredentials,

    /// Persisted state differs from what was just written
    #[error("Integrity check failed for account {account_num}: expected balance {expected}, store holds {persisted}")]
    Integrity {
        account_num: AccountNum,
        expected: String,
        persisted: String,
    },

    /// A bounded retry loop gave up
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// 会话错误
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl ApplicationError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn forbidden() -> Self {
        Self::Forbidden("You do not have permission to do that.".to_string())
    }

    pub fn account_not_found(num: AccountNum) -> Self {
        Self::NotFound {
            resource_type: "Account",
            id: num.to_string(),
        }
    }
}

impl From<LedgerError> for ApplicationError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountNotFound(num) => Self::account_not_found(num),
            other => Self::Validation(other.to_string()),
        }
    }
}
