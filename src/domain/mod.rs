//! Domain Layer
//!
//! Two bounded contexts:
//! - Ledger Context: accounts, balances, notes
//! - Identity Context: users, roles, access rule

pub mod identity;
pub mod ledger;
