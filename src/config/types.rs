//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 会话配置
    #[serde(default)]
    pub session: SessionConfig,

    /// 限流配置
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// 账本配置
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// 认证配置
    #[serde(default)]
    pub auth: AuthConfig,

    /// 用户种子文件
    #[serde(default)]
    pub seed: SeedConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

// ============================================================================
// Server
// ============================================================================

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whole-request read deadline, in seconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Upper bound on header block plus body
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,

    /// 静态文件服务配置
    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

/// 静态文件服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    /// 是否启用静态文件服务
    #[serde(default)]
    pub enabled: bool,

    /// 静态文件目录
    #[serde(default = "default_static_dir")]
    pub dir: PathBuf,
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("html")
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9999
}

fn default_read_timeout() -> u64 {
    10
}

fn default_max_request_bytes() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            read_timeout_secs: default_read_timeout(),
            max_request_bytes: default_max_request_bytes(),
            static_files: StaticFilesConfig::default(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Static file directory, when serving is enabled.
    pub fn static_dir(&self) -> Option<PathBuf> {
        self.static_files
            .enabled
            .then(|| self.static_files.dir.clone())
    }
}

// ============================================================================
// Storage
// ============================================================================

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/strongroom.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 会话配置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Cookie carrying the session token
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Session lifetime in seconds
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Sled directory for the session snapshot
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Seconds between sweeps of expired sessions
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
}

fn default_cookie_name() -> String {
    "SD-SessionID".to_string()
}

fn default_ttl() -> u64 {
    3600
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("data/sessions.sled")
}

fn default_purge_interval() -> u64 {
    300
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_secs: default_ttl(),
            snapshot_path: default_snapshot_path(),
            purge_interval_secs: default_purge_interval(),
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.ttl_secs).unwrap_or(i64::MAX))
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs)
    }
}

// ============================================================================
// Policy
// ============================================================================

/// 限流配置
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,

    /// Requests allowed per client per window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_window")]
    pub window_secs: u64,
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_max_requests() -> u32 {
    10
}

fn default_window() -> u64 {
    900 // 15 分钟
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            max_requests: default_max_requests(),
            window_secs: default_window(),
        }
    }
}

impl RateLimitConfig {
    /// `(max_requests, window)` when enabled.
    pub fn limit(&self) -> Option<(u32, Duration)> {
        self.enabled
            .then(|| (self.max_requests, Duration::from_secs(self.window_secs)))
    }
}

/// 账本配置
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Random draws before account creation gives up
    #[serde(default = "default_max_allocation_attempts")]
    pub max_allocation_attempts: u32,
}

fn default_max_allocation_attempts() -> u32 {
    crate::application::DEFAULT_MAX_ALLOCATION_ATTEMPTS
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_allocation_attempts: default_max_allocation_attempts(),
        }
    }
}

/// 认证配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub support_login: SupportLoginConfig,
}

/// Fixed banker credentials that bypass the user store.
///
/// SECURITY: leave disabled outside of a controlled support session.
#[derive(Debug, Clone, Deserialize)]
pub struct SupportLoginConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_support_username")]
    pub username: String,

    #[serde(default = "default_support_password")]
    pub password: String,
}

fn default_support_username() -> String {
    "admin".to_string()
}

fn default_support_password() -> String {
    "admin".to_string()
}

impl Default for SupportLoginConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            username: default_support_username(),
            password: default_support_password(),
        }
    }
}

/// 用户种子配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfig {
    /// TOML file of users to upsert at startup
    #[serde(default)]
    pub users_file: Option<PathBuf>,
}

// ============================================================================
// Logging
// ============================================================================

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.session.cookie_name, "SD-SessionID");
        assert_eq!(config.session.ttl_secs, 3600);
        assert_eq!(config.session.purge_interval(), Duration::from_secs(300));
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.window_secs, 900);
        assert_eq!(config.ledger.max_allocation_attempts, 64);
        assert!(!config.auth.support_login.enabled);
        assert!(config.seed.users_file.is_none());
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "127.0.0.1:9999");
        assert_eq!(config.static_dir(), None);
    }

    #[test]
    fn test_database_url() {
        let config = DatabaseConfig::default();
        assert_eq!(config.database_url(), "sqlite:data/strongroom.db?mode=rwc");
    }

    #[test]
    fn test_rate_limit_can_be_disabled() {
        let mut config = RateLimitConfig::default();
        assert_eq!(config.limit(), Some((10, Duration::from_secs(900))));
        config.enabled = false;
        assert_eq!(config.limit(), None);
    }
}
