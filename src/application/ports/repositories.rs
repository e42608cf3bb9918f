//! Repository Ports - 出站端口
//!
//! Abstract record storage for accounts and users.
//! Concrete adapters live in the infrastructure layer (SQLite).

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::identity::{Credentials, User};
use crate::domain::ledger::{Account, AccountNum};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Account Repository
// ============================================================================

/// Account Repository Port
#[async_trait]
pub trait AccountRepositoryPort: Send + Sync {
    /// Inserts a new account; `Duplicate` when the number is taken.
    async fn create(&self, account: &Account) -> Result<Account, RepositoryError>;

    /// Looks an account up by its number.
    async fn find_by_num(&self, num: AccountNum) -> Result<Option<Account>, RepositoryError>;

    /// Replaces the stored record and returns what the store now holds.
    async fn update(&self, account: &Account) -> Result<Account, RepositoryError>;

    async fn exists(&self, num: AccountNum) -> Result<bool, RepositoryError> {
        Ok(self.find_by_num(num).await?.is_some())
    }
}

// ============================================================================
// User Repository
// ============================================================================

/// A provisioned user together with its stored credentials.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    pub credentials: Credentials,
}

/// User Repository Port
#[async_trait]
pub trait UserRepositoryPort: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// Insert or replace; used for out-of-band provisioning only.
    async fn save(&self, record: &UserRecord) -> Result<(), RepositoryError>;
}
