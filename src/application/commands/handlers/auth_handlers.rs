//! Auth Command Handlers

use std::sync::Arc;

use crate::application::commands::{Login, Logout};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    PasswordHasherPort, Session, SessionManagerPort, UserRepositoryPort,
};
use crate::domain::identity::{Role, User};
use crate::domain::ledger::AccountNum;

/// Fixed banker credentials that skip the user store.
///
/// SECURITY: this is an operational backdoor inherited from the legacy
/// service. It is off unless `auth.support_login.enabled` is set and must be
/// removed before real use.
#[derive(Debug, Clone)]
pub struct SupportLogin {
    pub username: String,
    pub password: String,
}

impl SupportLogin {
    fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }

    fn user(&self) -> Result<User, ApplicationError> {
        let account_num = AccountNum::new(AccountNum::MAX).ok();
        User::new(self.username.clone(), account_num, Role::Banker)
            .map_err(|e| ApplicationError::validation(e.to_string()))
    }
}

// ============================================================================
// Login
// ============================================================================

/// Login Handler - verify credentials, then open a session
pub struct LoginHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    hasher: Arc<dyn PasswordHasherPort>,
    session_manager: Arc<dyn SessionManagerPort>,
    support_login: Option<SupportLogin>,
}

impl LoginHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        hasher: Arc<dyn PasswordHasherPort>,
        session_manager: Arc<dyn SessionManagerPort>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            session_manager,
            support_login: None,
        }
    }

    pub fn with_support_login(mut self, support_login: Option<SupportLogin>) -> Self {
        self.support_login = support_login;
        self
    }

    /// Returns the user on matching credentials.
    pub async fn verify(&self, username: &str, password: &str) -> Result<User, ApplicationError> {
        if let Some(support) = &self.support_login {
            if support.matches(username, password) {
                tracing::warn!(username = %username, "Support login bypass used");
                return support.user();
            }
        }

        let record = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(ApplicationError::InvalidCredentials)?;

        let credentials = &record.credentials;
        if !self
            .hasher
            .verify(password, &credentials.salt, &credentials.password_digest)
        {
            return Err(ApplicationError::InvalidCredentials);
        }

        Ok(record.user)
    }

    pub async fn handle(&self, cmd: Login) -> Result<Session, ApplicationError> {
        let user = match self.verify(&cmd.username, &cmd.password).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(username = %cmd.username, error = %e, "Login failed");
                return Err(e);
            }
        };

        let session = self.session_manager.create(user, cmd.replacing.as_deref())?;
        tracing::info!(
            username = %session.user.username(),
            role = %session.user.role(),
            expiration = %session.expiration,
            "Login succeeded"
        );
        Ok(session)
    }
}

// ============================================================================
// Logout
// ============================================================================

/// Logout Handler
pub struct LogoutHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl LogoutHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    /// Idempotent: returns whether a live session was closed.
    pub fn handle(&self, cmd: Logout) -> bool {
        let closed = cmd
            .token
            .as_deref()
            .map(|token| self.session_manager.delete(token))
            .unwrap_or(false);
        tracing::info!(closed, "Logout");
        closed
    }
}
