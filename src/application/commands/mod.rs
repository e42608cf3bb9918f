//! Application layer - commands (writes)

mod auth_commands;
mod ledger_commands;

pub mod handlers;

pub use auth_commands::*;
pub use ledger_commands::*;
