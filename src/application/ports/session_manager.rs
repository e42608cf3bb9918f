//! Session Manager Port - 会话生命周期管理
//!
//! Opaque session tokens: issuance, lookup, expiry, invalidation.
//! Implementation lives in infrastructure/memory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::identity::User;

/// Session Manager 错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,

    #[error("Session expired")]
    Expired,

    #[error("Session persistence failed: {0}")]
    Persistence(String),
}

/// A live login. `id` is the opaque token handed to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user: User,
    pub expiration: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration < now
    }
}

/// Session Manager Port
pub trait SessionManagerPort: Send + Sync {
    /// Issues a new session, dropping the one referenced by `replacing` first.
    fn create(&self, user: User, replacing: Option<&str>) -> Result<Session, SessionError>;

    /// Resolves a token to its user. Expired sessions are purged on the way.
    fn authenticate(&self, token: &str) -> Result<User, SessionError>;

    /// Removes the session if present. Returns whether one was removed.
    fn delete(&self, token: &str) -> bool;

    /// Drops every expired session, used or not. Returns how many went.
    fn purge_expired(&self) -> usize;
}

/// Durable snapshot of the whole token -> session mapping.
pub trait SessionSnapshotPort: Send + Sync {
    fn load(&self) -> Result<Vec<Session>, SessionError>;

    fn save(&self, sessions: &[Session]) -> Result<(), SessionError>;
}
