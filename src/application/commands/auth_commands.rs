//! Auth Commands

/// Verify credentials and open a session
#[derive(Debug, Clone)]
pub struct Login {
    pub username: String,
    pub password: String,
    /// Token carried by the client's cookie, replaced by the new session.
    pub replacing: Option<String>,
}

/// Close the session referenced by the client's cookie, if any
#[derive(Debug, Clone)]
pub struct Logout {
    pub token: Option<String>,
}
