//! Sled-backed session snapshot

use sled::Db;
use std::path::Path;

use crate::application::ports::{Session, SessionError, SessionSnapshotPort};

const SNAPSHOT_KEY: &[u8] = b"sessions";

/// Stores the whole session map as one bincode value.
pub struct SledSessionSnapshot {
    db: Db,
}

impl SledSessionSnapshot {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SessionError> {
        let db = sled::open(path.as_ref())
            .map_err(|e| SessionError::Persistence(e.to_string()))?;

        tracing::info!(path = %path.as_ref().display(), "Session snapshot store opened");
        Ok(Self { db })
    }
}

impl SessionSnapshotPort for SledSessionSnapshot {
    fn load(&self) -> Result<Vec<Session>, SessionError> {
        let Some(bytes) = self
            .db
            .get(SNAPSHOT_KEY)
            .map_err(|e| SessionError::Persistence(e.to_string()))?
        else {
            return Ok(Vec::new());
        };

        bincode::deserialize(&bytes).map_err(|e| SessionError::Persistence(e.to_string()))
    }

    fn save(&self, sessions: &[Session]) -> Result<(), SessionError> {
        let bytes =
            bincode::serialize(sessions).map_err(|e| SessionError::Persistence(e.to_string()))?;
        self.db
            .insert(SNAPSHOT_KEY, bytes)
            .map_err(|e| SessionError::Persistence(e.to_string()))?;
        // Durable before the caller hands the token out.
        self.db
            .flush()
            .map_err(|e| SessionError::Persistence(e.to_string()))?;
        Ok(())
    }
}
