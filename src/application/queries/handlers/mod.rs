//! Query Handlers

mod account_handlers;

pub use account_handlers::*;
