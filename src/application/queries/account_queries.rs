//! Account Queries

use crate::domain::identity::User;
use crate::domain::ledger::AccountNum;

/// Look up one account on behalf of `actor`
#[derive(Debug, Clone)]
pub struct GetAccount {
    pub account_num: AccountNum,
    pub actor: User,
}
