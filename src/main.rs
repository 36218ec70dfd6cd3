// ==========================================
// 地铁车队入段排程系统 - HTTP 服务入口
// ==========================================
// 环境变量: DB_PATH / HOST / PORT / RUST_LOG / LOG_FORMAT
// ==========================================

use anyhow::Context;
use metro_induction::app::{create_router, get_default_db_path, AppState};
use metro_induction::logging;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 决策支持系统", metro_induction::APP_NAME);
    tracing::info!("系统版本: {}", metro_induction::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).context("无法初始化AppState")?;

    let host = std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = match std::env::var("PORT") {
        Ok(raw) => raw
            .parse::<u16>()
            .with_context(|| format!("PORT 不是有效端口: {}", raw))?,
        Err(_) => DEFAULT_PORT,
    };
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("无法监听 {}", addr))?;
    tracing::info!("HTTP 服务已启动: http://{}", addr);

    axum::serve(listener, create_router(state))
        .await
        .context("HTTP 服务异常退出")?;

    Ok(())
}
