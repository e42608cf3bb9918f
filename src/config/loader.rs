//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// Environment variables use the `STRONGROOM_` prefix and `__` between
/// levels:
/// - `STRONGROOM_SERVER__PORT=8080`
/// - `STRONGROOM_DATABASE__PATH=/var/lib/strongroom/ledger.db`
/// - `STRONGROOM_RATE_LIMIT__ENABLED=false`
/// - `STRONGROOM_SEED__USERS_FILE=/etc/strongroom/users.toml`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    builder = builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 9999)?
        .set_default("server.read_timeout_secs", 10)?
        .set_default("server.max_request_bytes", 64 * 1024)?
        .set_default("server.static_files.enabled", false)?
        .set_default("server.static_files.dir", "html")?
        .set_default("database.path", "data/strongroom.db")?
        .set_default("database.max_connections", 5)?
        .set_default("session.cookie_name", "SD-SessionID")?
        .set_default("session.ttl_secs", 3600)?
        .set_default("session.snapshot_path", "data/sessions.sled")?
        .set_default("session.purge_interval_secs", 300)?
        .set_default("rate_limit.enabled", true)?
        .set_default("rate_limit.max_requests", 10)?
        .set_default("rate_limit.window_secs", 900)?
        .set_default("ledger.max_allocation_attempts", 64)?
        .set_default("auth.support_login.enabled", false)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("STRONGROOM")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

    if config.server.port == 0 {
        return invalid("Server port cannot be 0");
    }
    if config.server.max_request_bytes == 0 {
        return invalid("Max request size cannot be 0");
    }
    if config.database.path.is_empty() {
        return invalid("Database path cannot be empty");
    }
    if config.session.ttl_secs == 0 {
        return invalid("Session TTL cannot be 0");
    }
    if config.session.purge_interval_secs == 0 {
        return invalid("Session purge interval cannot be 0");
    }
    if config.session.cookie_name.is_empty()
        || !config
            .session
            .cookie_name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return invalid("Cookie name must be a non-empty token");
    }
    if config.rate_limit.enabled
        && (config.rate_limit.max_requests == 0 || config.rate_limit.window_secs == 0)
    {
        return invalid("Rate limit needs a non-zero budget and window when enabled");
    }
    if config.ledger.max_allocation_attempts == 0 {
        return invalid("Account allocation attempts cannot be 0");
    }
    if config.auth.support_login.enabled
        && (config.auth.support_login.username.is_empty()
            || config.auth.support_login.password.is_empty())
    {
        return invalid("Support login needs a username and password when enabled");
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Read Timeout: {}s", config.server.read_timeout_secs);
    tracing::info!("Max Request Size: {} bytes", config.server.max_request_bytes);
    match config.server.static_dir() {
        Some(dir) => tracing::info!("Static Files: {:?}", dir),
        None => tracing::info!("Static Files: disabled"),
    }
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Database Max Connections: {}", config.database.max_connections);
    tracing::info!("Session Cookie: {}", config.session.cookie_name);
    tracing::info!("Session TTL: {}s", config.session.ttl_secs);
    tracing::info!("Session Snapshot: {:?}", config.session.snapshot_path);
    tracing::info!("Session Purge Interval: {}s", config.session.purge_interval_secs);
    if config.rate_limit.enabled {
        tracing::info!(
            "Rate Limit: {} requests / {}s",
            config.rate_limit.max_requests,
            config.rate_limit.window_secs
        );
    } else {
        tracing::info!("Rate Limit: disabled");
    }
    if let Some(file) = &config.seed.users_file {
        tracing::info!("Seed Users: {:?}", file);
    }
    if config.auth.support_login.enabled {
        tracing::warn!(
            username = %config.auth.support_login.username,
            "Support login is ENABLED; fixed credentials grant banker access"
        );
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_db_path() {
        let mut config = AppConfig::default();
        config.database.path = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_ttl() {
        let mut config = AppConfig::default();
        config.session.ttl_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_purge_interval() {
        let mut config = AppConfig::default();
        config.session.purge_interval_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_bad_cookie_name() {
        let mut config = AppConfig::default();
        config.session.cookie_name = "SD Session;".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_rate_limit_only_checked_when_enabled() {
        let mut config = AppConfig::default();
        config.rate_limit.max_requests = 0;
        assert!(validate_config(&config).is_err());

        config.rate_limit.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_allocation_attempts() {
        let mut config = AppConfig::default();
        config.ledger.max_allocation_attempts = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8443

[server.static_files]
enabled = true
dir = "public"

[rate_limit]
enabled = false

[seed]
users_file = "users.toml"
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();

        assert_eq!(config.server.port, 8443);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(
            config.server.static_dir(),
            Some(std::path::PathBuf::from("public"))
        );
        assert!(config.rate_limit.limit().is_none());
        assert_eq!(config.session.ttl_secs, 3600);
        assert_eq!(
            config.seed.users_file,
            Some(std::path::PathBuf::from("users.toml"))
        );
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[session]\nttl_secs = 0").unwrap();

        let result = load_config_from_path(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
