//! 积分与徽章服务入口
//!
//! 加载配置，初始化可观测性与数据库，启动 HTTP 服务

use std::time::Duration;

use anyhow::Result;
use gamification_shared::{config::AppConfig, database::Database, observability};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use gamification::{AppState, MIGRATOR, SERVICE_NAME, build_app};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // 1. 加载配置，失败时使用默认值（日志初始化后再报告）
    let (config, load_error) = match AppConfig::load(SERVICE_NAME) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // 2. 初始化可观测性
    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    config.validate()?;
    info!(environment = %config.environment, "Starting {}...", SERVICE_NAME);

    // 3. 初始化数据库连接
    let db = Database::connect(&config.database).await?;
    info!("Database connection established");

    if config.database.run_migrations {
        db.run_migrations(&MIGRATOR).await?;
    }

    // 4. 组装服务与路由
    let state = AppState::postgres(db.pool().clone(), config.leaderboard.clone());
    let app = build_app(
        state,
        &config.cors,
        Duration::from_secs(config.server.request_timeout_seconds),
    );

    // 5. 启动 HTTP 服务
    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Service shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
///
/// 监听 Ctrl+C 和 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        }
    }
}
