//! 路由与中间件（CORS、请求追踪）

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// 创建应用路由
pub fn create_router(state: AppState) -> Router {
    // 运营看板与排程前端同机部署，跨域放开
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let induction = Router::new()
        .route("/plan", post(handlers::generate_plan))
        .route("/simulate", post(handlers::simulate))
        .route("/history", get(handlers::list_history))
        .route("/dashboard", get(handlers::dashboard));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/induction", induction)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
