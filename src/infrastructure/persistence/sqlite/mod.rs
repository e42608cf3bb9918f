//! SQLite Persistence - SQLite 数据库持久化实现

mod account_repo;
mod database;
mod user_repo;

pub use account_repo::*;
pub use database::*;
pub use user_repo::*;
