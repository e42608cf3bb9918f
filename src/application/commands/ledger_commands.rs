//! Ledger Commands
//!
//! Numeric fields arrive as the raw form text; parsing them is part of the
//! ledger's validation.

use crate::domain::identity::User;
use crate::domain::ledger::AccountNum;

/// Open a new account (bankers only)
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub owner_name: String,
    pub balance: String,
    pub actor: User,
}

/// Add funds to an account
#[derive(Debug, Clone)]
pub struct Deposit {
    pub account_num: AccountNum,
    pub amount: String,
    pub notes: String,
    pub actor: User,
}

/// Remove funds from an account
#[derive(Debug, Clone)]
pub struct Withdraw {
    pub account_num: AccountNum,
    pub amount: String,
    pub notes: String,
    pub actor: User,
}
