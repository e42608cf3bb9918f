//! Ledger Context - Errors

use thiserror::Error;

use super::AccountNum;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("that account number does not exist: {0}")]
    AccountNotFound(AccountNum),

    #[error("invalid account number: {0}")]
    InvalidAccountNum(String),

    #[error("owner name must be 1-64 Latin letters or spaces")]
    InvalidOwnerName,

    #[error("value must be numeric: {0}")]
    NotNumeric(String),

    #[error("balance must be non-negative")]
    NegativeBalance,

    #[error("amount must be non-negative")]
    NegativeAmount,

    #[error("amount would exceed the maximum representable balance")]
    BalanceOverflow,

    #[error("cannot withdraw that amount")]
    InsufficientFunds,
}
