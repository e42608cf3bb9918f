//! In-Memory Session Manager Implementation

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::{Arc, Mutex};

use crate::application::ports::{Session, SessionError, SessionManagerPort, SessionSnapshotPort};
use crate::domain::identity::User;

/// Random bytes per session token (hex encoded on the wire).
const TOKEN_BYTES: usize = 64;

/// In-memory session manager (内存会话管理器)
///
/// Every mutation rewrites the full snapshot when one is attached.
pub struct InMemorySessionManager {
    sessions: DashMap<String, Session>,
    ttl: Duration,
    snapshot: Option<Arc<dyn SessionSnapshotPort>>,
    /// Serialises snapshot writes so the last writer always saves the newest map.
    snapshot_lock: Mutex<()>,
}

impl InMemorySessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            snapshot: None,
            snapshot_lock: Mutex::new(()),
        }
    }

    /// Restores live sessions from `snapshot` and persists to it from now on.
    pub fn with_snapshot(
        ttl: Duration,
        snapshot: Arc<dyn SessionSnapshotPort>,
    ) -> Result<Self, SessionError> {
        let now = Utc::now();
        let mut manager = Self::new(ttl);
        let mut dropped = 0usize;
        for session in snapshot.load()? {
            if session.is_expired_at(now) {
                dropped += 1;
                continue;
            }
            manager.sessions.insert(session.id.clone(), session);
        }
        tracing::info!(
            restored = manager.sessions.len(),
            dropped_expired = dropped,
            "Sessions restored from snapshot"
        );
        manager.snapshot = Some(snapshot);
        Ok(manager)
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// `authenticate` against an explicit clock.
    pub fn authenticate_at(&self, token: &str, now: DateTime<Utc>) -> Result<User, SessionError> {
        if let Some((_, expired)) = self.sessions.remove_if(token, |_, s| s.is_expired_at(now)) {
            tracing::info!(
                username = %expired.user.username(),
                expiration = %expired.expiration,
                "Session expired"
            );
            self.persist_or_log();
            return Err(SessionError::Expired);
        }

        // A lookup changes nothing, so the snapshot is already current.
        let user = self
            .sessions
            .get(token)
            .map(|s| s.user.clone())
            .ok_or(SessionError::NotFound)?;

        tracing::debug!(username = %user.username(), "Session authenticated");
        Ok(user)
    }

    /// `purge_expired` against an explicit clock.
    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut purged = 0usize;
        self.sessions.retain(|_, session| {
            let expired = session.is_expired_at(now);
            if expired {
                purged += 1;
            }
            !expired
        });

        if purged > 0 {
            tracing::info!(purged, remaining = self.sessions.len(), "Expired sessions purged");
            self.persist_or_log();
        }
        purged
    }

    fn generate_token() -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    fn persist(&self) -> Result<(), SessionError> {
        let Some(snapshot) = &self.snapshot else {
            return Ok(());
        };
        let _guard = self
            .snapshot_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let all: Vec<Session> = self.sessions.iter().map(|e| e.value().clone()).collect();
        snapshot.save(&all)
    }

    fn persist_or_log(&self) {
        if let Err(e) = self.persist() {
            tracing::error!(error = %e, "Failed to write session snapshot");
        }
    }
}

impl SessionManagerPort for InMemorySessionManager {
    fn create(&self, user: User, replacing: Option<&str>) -> Result<Session, SessionError> {
        if let Some(old) = replacing {
            if self.sessions.remove(old).is_some() {
                tracing::debug!(username = %user.username(), "Previous session replaced");
            }
        }

        let expiration = Utc::now() + self.ttl;
        let session = loop {
            let id = Self::generate_token();
            if let Entry::Vacant(slot) = self.sessions.entry(id.clone()) {
                let session = Session {
                    id,
                    user,
                    expiration,
                };
                slot.insert(session.clone());
                break session;
            }
        };

        if let Err(e) = self.persist() {
            // The token never reaches the client, so nobody could close it.
            self.sessions.remove(&session.id);
            return Err(e);
        }
        tracing::info!(
            username = %session.user.username(),
            expiration = %session.expiration,
            "Session created"
        );
        Ok(session)
    }

    fn authenticate(&self, token: &str) -> Result<User, SessionError> {
        self.authenticate_at(token, Utc::now())
    }

    fn delete(&self, token: &str) -> bool {
        let removed = self.sessions.remove(token);
        if let Some((_, session)) = &removed {
            tracing::info!(username = %session.user.username(), "Session closed");
            self.persist_or_log();
        }
        removed.is_some()
    }

    fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }
}
