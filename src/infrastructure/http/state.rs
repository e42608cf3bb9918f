//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态. Built once in `main` from
//! injected ports and shared by every connection task.

use std::path::PathBuf;
use std::sync::Arc;

use super::cookie::SessionCookie;
use crate::application::{
    // Command handlers
    CreateAccountHandler, DepositHandler, LoginHandler, LogoutHandler, SupportLogin,
    WithdrawHandler,
    // Query handlers
    GetAccountHandler,
    // Ports
    AccountRepositoryPort, PasswordHasherPort, SessionManagerPort, UserRepositoryPort,
    DEFAULT_MAX_ALLOCATION_ATTEMPTS,
};
use crate::infrastructure::memory::AccountLocks;

/// Knobs that shape the handlers, taken from configuration.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub cookie_name: String,
    pub max_allocation_attempts: u32,
    pub support_login: Option<SupportLogin>,
    /// Directory served for `GET /` and `*.html|htm|css`; `None` disables it.
    pub static_dir: Option<PathBuf>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            cookie_name: "SD-SessionID".to_string(),
            max_allocation_attempts: DEFAULT_MAX_ALLOCATION_ATTEMPTS,
            support_login: None,
            static_dir: None,
        }
    }
}

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub session_manager: Arc<dyn SessionManagerPort>,
    pub session_cookie: SessionCookie,
    pub static_dir: Option<PathBuf>,

    // ========== Command Handlers ==========
    pub create_account_handler: CreateAccountHandler,
    pub deposit_handler: DepositHandler,
    pub withdraw_handler: WithdrawHandler,
    pub login_handler: LoginHandler,
    pub logout_handler: LogoutHandler,

    // ========== Query Handlers ==========
    pub get_account_handler: GetAccountHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        account_repo: Arc<dyn AccountRepositoryPort>,
        user_repo: Arc<dyn UserRepositoryPort>,
        hasher: Arc<dyn PasswordHasherPort>,
        session_manager: Arc<dyn SessionManagerPort>,
        options: AppOptions,
    ) -> Self {
        let locks = Arc::new(AccountLocks::new());

        Self {
            session_manager: session_manager.clone(),
            session_cookie: SessionCookie::new(options.cookie_name),
            static_dir: options.static_dir,

            // Command handlers
            create_account_handler: CreateAccountHandler::new(
                account_repo.clone(),
                options.max_allocation_attempts,
            ),
            deposit_handler: DepositHandler::new(account_repo.clone(), locks.clone()),
            withdraw_handler: WithdrawHandler::new(account_repo.clone(), locks),
            login_handler: LoginHandler::new(user_repo, hasher, session_manager.clone())
                .with_support_login(options.support_login),
            logout_handler: LogoutHandler::new(session_manager),

            // Query handlers
            get_account_handler: GetAccountHandler::new(account_repo),
        }
    }
}
