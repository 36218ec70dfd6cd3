// ==========================================
// 地铁车队入段排程系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供车辆台账与历史台账的数据访问,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod fallback_registry;
pub mod history_ledger;
pub mod history_ledger_impl;
pub mod train_registry;
pub mod train_registry_impl;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use fallback_registry::FallbackTrainRegistry;
pub use history_ledger::{HistoryLedger, DEFAULT_HISTORY_LIMIT};
pub use history_ledger_impl::SqliteHistoryLedger;
pub use train_registry::TrainRegistry;
pub use train_registry_impl::SqliteTrainRegistry;
