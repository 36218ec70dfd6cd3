// ==========================================
// 地铁车队入段排程系统 - 应用层
// ==========================================
// 职责: axum HTTP 服务，连接前端看板与入段计划 API
// ==========================================

pub mod dto;
pub mod handlers;
pub mod http_error;
pub mod router;
pub mod state;

// 重导出
pub use http_error::{AppError, ErrorBody};
pub use router::create_router;
pub use state::{get_default_db_path, AppState};
