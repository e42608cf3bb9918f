//! Command Handlers

mod auth_handlers;
mod ledger_handlers;

pub use auth_handlers::*;
pub use ledger_handlers::*;
