//! Strongroom - minimal ledger service
//!
//! - Domain: ledger/, identity/ (Bounded Contexts)
//! - Application: commands, queries, ports
//! - Infrastructure: http, memory, persistence, adapters

use std::sync::Arc;

use strongroom::application::{
    AccountRepositoryPort, PasswordHasherPort, SessionManagerPort, SupportLogin,
    UserRepositoryPort,
};
use strongroom::config::{load_config, print_config, AppConfig};
use strongroom::infrastructure::http::{AppOptions, AppState, HttpServer, ServerConfig};
use strongroom::infrastructure::memory::InMemorySessionManager;
use strongroom::infrastructure::persistence::load_seed_users;
use strongroom::infrastructure::persistence::sled::SledSessionSnapshot;
use strongroom::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteAccountRepository, SqliteUserRepository,
};
use strongroom::infrastructure::Sha256PasswordHasher;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Strongroom ledger service");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    if let Some(parent) = config.session.snapshot_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;
    tracing::info!("Database initialized");

    let account_repo: Arc<dyn AccountRepositoryPort> =
        Arc::new(SqliteAccountRepository::new(pool.clone()));
    let user_repo: Arc<dyn UserRepositoryPort> = Arc::new(SqliteUserRepository::new(pool));
    let hasher: Arc<dyn PasswordHasherPort> = Arc::new(Sha256PasswordHasher);

    if let Some(users_file) = &config.seed.users_file {
        let count = load_seed_users(users_file, user_repo.as_ref(), hasher.as_ref()).await?;
        tracing::info!(count, file = %users_file.display(), "Seed users loaded");
    }

    // 会话管理器（sled 快照）
    let snapshot = Arc::new(SledSessionSnapshot::open(&config.session.snapshot_path)?);
    let session_manager: Arc<dyn SessionManagerPort> =
        InMemorySessionManager::with_snapshot(config.session.ttl(), snapshot)?.arc();

    let options = AppOptions {
        cookie_name: config.session.cookie_name.clone(),
        max_allocation_attempts: config.ledger.max_allocation_attempts,
        support_login: config.auth.support_login.enabled.then(|| SupportLogin {
            username: config.auth.support_login.username.clone(),
            password: config.auth.support_login.password.clone(),
        }),
        static_dir: config.server.static_dir(),
    };
    let state = AppState::new(account_repo, user_repo, hasher, session_manager, options);

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        read_timeout: config.server.read_timeout(),
        max_request_bytes: config.server.max_request_bytes,
        rate_limit: config.rate_limit.limit(),
        session_purge_interval: config.session.purge_interval(),
    };
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志. `RUST_LOG` wins over the configured level.
fn init_tracing(config: &AppConfig) {
    let log_filter = format!("{},strongroom={}", config.log.level, config.log.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
