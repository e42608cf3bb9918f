//! Strongroom - 最小账本服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Ledger Context: accounts, balances, notes
//! - Identity Context: users, roles, access rule
//!
//! 应用层 (application/):
//! - Ports: SessionManager, Repositories, PasswordHasher
//! - Commands: create account, deposit, withdraw, login, logout
//! - Queries: account details
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: hand-written HTTP/1.x parser, dispatcher, TCP server
//! - Memory: sessions, per-account locks, rate limiter
//! - Persistence: SQLite (accounts, users) + Sled (session snapshot)
//! - Adapters: SHA-256 password hasher

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
