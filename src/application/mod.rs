//! Application layer - use case orchestration
//!
//! Contains:
//! - ports: hexagonal ports (repositories, session manager, password hasher)
//! - commands: command side and handlers
//! - queries: query side and handlers
//! - error: application error taxonomy

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    CreateAccount,
    Deposit,
    Login,
    Logout,
    Withdraw,
    // Handlers
    handlers::{
        CreateAccountHandler, DepositHandler, LoginHandler, LogoutHandler, SupportLogin,
        WithdrawHandler, DEFAULT_MAX_ALLOCATION_ATTEMPTS,
    },
};

pub use error::ApplicationError;

pub use ports::{
    AccountRepositoryPort, PasswordHasherPort, RepositoryError, Session, SessionError,
    SessionManagerPort, SessionSnapshotPort, UserRecord, UserRepositoryPort,
};

pub use queries::{handlers::GetAccountHandler, GetAccount};
