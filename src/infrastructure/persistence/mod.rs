//! Persistence Layer - 数据持久化
//!
//! SQLite for accounts and users, Sled for the session snapshot.

pub mod seed;
pub mod sled;
pub mod sqlite;

pub use self::sled::SledSessionSnapshot;
pub use seed::{load_seed_users, SeedError};
