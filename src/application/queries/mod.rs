//! Application layer - queries (reads)

mod account_queries;

pub mod handlers;

pub use account_queries::*;
