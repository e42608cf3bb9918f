//! Application Ports - 出站端口定义
//!
//! Abstract interfaces between the application and infrastructure layers

mod password_hasher;
mod repositories;
mod session_manager;

pub use password_hasher::PasswordHasherPort;
pub use repositories::{AccountRepositoryPort, RepositoryError, UserRecord, UserRepositoryPort};
pub use session_manager::{Session, SessionError, SessionManagerPort, SessionSnapshotPort};
