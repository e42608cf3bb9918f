//! Ledger Context
//!
//! Responsibilities:
//! - account balances and notes
//! - deposit / withdrawal rules (balance never goes negative)

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::Account;
pub use errors::LedgerError;
pub use value_objects::{AccountNum, Amount, Balance, OwnerName};
