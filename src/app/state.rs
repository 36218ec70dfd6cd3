// ==========================================
// 地铁车队入段排程系统 - 应用状态
// ==========================================
// 职责: 组装仓储/配置/API 实例，作为 HTTP 处理器共享状态
// ==========================================

use std::sync::{Arc, Mutex};

use anyhow::Context;
use rusqlite::Connection;

use crate::api::InductionApi;
use crate::config::config_manager::ConfigManager;
use crate::repository::{FallbackTrainRegistry, SqliteHistoryLedger, SqliteTrainRegistry};

pub use crate::db::get_default_db_path;

/// 应用状态
///
/// 所有字段均为 Arc，Clone 廉价
#[derive(Clone)]
pub struct AppState {
    /// 数据库路径（内存库为 ":memory:"）
    pub db_path: String,

    /// 入段计划 API
    pub induction_api: Arc<InductionApi>,
}

impl AppState {
    /// 打开数据库、建表并组装 API
    pub fn new(db_path: String) -> anyhow::Result<Self> {
        let conn = crate::db::open_sqlite_connection(&db_path)
            .with_context(|| format!("无法打开数据库: {}", db_path))?;
        crate::db::ensure_schema(&conn).context("数据库建表失败")?;

        Self::from_connection(db_path, Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接组装（连接需已建表）
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> anyhow::Result<Self> {
        let registry = Arc::new(SqliteTrainRegistry::from_connection(conn.clone()));
        let registry = Arc::new(FallbackTrainRegistry::new(registry));
        let ledger = Arc::new(SqliteHistoryLedger::from_connection(conn.clone()));
        let config = ConfigManager::from_connection(conn)
            .map_err(|e| anyhow::anyhow!("配置管理器初始化失败: {}", e))?;

        tracing::info!(db_path = %db_path, "应用状态初始化完成");

        Ok(Self::from_api(db_path, Arc::new(InductionApi::new(
            registry,
            ledger,
            Arc::new(config),
        ))))
    }

    /// 直接注入 API（测试用 mock 台账）
    pub fn from_api(db_path: String, induction_api: Arc<InductionApi>) -> Self {
        Self {
            db_path,
            induction_api,
        }
    }
}
