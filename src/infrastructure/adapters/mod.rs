//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

mod password_hasher;

pub use password_hasher::Sha256PasswordHasher;
