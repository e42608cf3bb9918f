//! Memory Layer - In-Memory State Management
//!
//! Sessions, per-account locks and rate-limit windows.

mod account_locks;
mod rate_limiter;
mod session_manager;

pub use account_locks::AccountLocks;
pub use rate_limiter::FixedWindowRateLimiter;
pub use session_manager::InMemorySessionManager;
