//! Identity Context
//!
//! Users, roles and the access rule that decides who may touch which account.

mod user;

pub use user::{Credentials, IdentityError, Role, User};
