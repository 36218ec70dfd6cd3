// ==========================================
// 地铁车队入段排程系统 - 仓储层错误类型
// ==========================================
// 覆盖: 车辆台账、历史台账、配置表
// ==========================================

use rusqlite::ffi;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 记录 / 约束 =====
    #[error("{entity} 不存在 (id={id})")]
    NotFound { entity: String, id: String },

    #[error("主键或唯一键冲突: {0}")]
    UniqueConstraintViolation(String),

    #[error("引用的车辆段/车辆不存在: {0}")]
    ForeignKeyViolation(String),

    #[error("字段取值越界: {0}")]
    CheckConstraintViolation(String),

    // ===== 连接 =====
    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("连接锁已中毒: {0}")]
    LockError(String),

    #[error("SQL 执行失败: {0}")]
    DatabaseQueryError(String),

    // ===== 存量数据质量 =====
    #[error("列 {field} 无法解析: {message}")]
    FieldValueError { field: String, message: String },

    #[error("JSON 列读写失败: {0}")]
    SerializationError(String),

    // ===== 外部台账 =====
    #[error("车辆台账不可用: {0}")]
    RegistryUnavailable(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, msg) => {
                let detail = msg.clone().unwrap_or_else(|| err.to_string());
                match code.extended_code {
                    ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
                        RepositoryError::UniqueConstraintViolation(detail)
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => RepositoryError::ForeignKeyViolation(detail),
                    ffi::SQLITE_CONSTRAINT_CHECK => RepositoryError::CheckConstraintViolation(detail),
                    ffi::SQLITE_CANTOPEN => RepositoryError::DatabaseConnectionError(detail),
                    _ => RepositoryError::DatabaseQueryError(detail),
                }
            }
            // 单行查询的调用方自行转换为带实体名的 NotFound
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "record".to_string(),
                id: "-".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::SerializationError(err.to_string())
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
