//! Sled Persistence - 会话快照

mod session_snapshot;

pub use session_snapshot::SledSessionSnapshot;
