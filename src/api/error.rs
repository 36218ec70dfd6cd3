// ==========================================
// 地铁车队入段排程系统 - API层错误类型
// ==========================================
// 职责: 汇总引擎/仓储/配置错误，转换为用户可理解的错误消息
// 红线: 所有错误信息必须包含显式原因
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 模拟场景错误
    // ==========================================
    #[error("未知模拟场景: {0}")]
    UnknownScenario(String),

    #[error("替补车辆无效: {0}")]
    InvalidReplacement(String),

    #[error("车队为空，无可排程车辆")]
    EmptyFleet,

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 外部协作错误
    // ==========================================
    #[error("车辆台账读取超时: {timeout_ms}ms")]
    RegistryTimeout { timeout_ms: u64 },

    #[error("车辆台账不可用: {0}")]
    RegistryUnavailable(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::CheckConstraintViolation(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::DatabaseError(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::SerializationError(msg) => ApiError::InternalError(msg),
            RepositoryError::RegistryUnavailable(msg) => ApiError::RegistryUnavailable(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation { .. } => ApiError::ValidationError(err.to_string()),
            EngineError::CapacityExceeded { .. } | EngineError::DepotNotFound(_) => {
                ApiError::BusinessRuleViolation(err.to_string())
            }
            EngineError::InvalidReplacement(msg) => ApiError::InvalidReplacement(msg),
            EngineError::UnknownScenario(raw) => ApiError::UnknownScenario(raw),
            EngineError::EmptyFleet => ApiError::EmptyFleet,
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_mapping() {
        let err: ApiError = EngineError::InvalidReplacement("KMRL-004 检修中".to_string()).into();
        assert!(matches!(err, ApiError::InvalidReplacement(_)));

        let err: ApiError = EngineError::EmptyFleet.into();
        assert!(matches!(err, ApiError::EmptyFleet));

        let err: ApiError = EngineError::Validation {
            train_id: 3,
            reason: "里程不能为负: -1".to_string(),
        }
        .into();
        assert!(err.to_string().contains("train_id=3"));
    }

    #[test]
    fn test_repository_error_mapping() {
        let err: ApiError = RepositoryError::NotFound {
            entity: "Train".to_string(),
            id: "9".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(err, ApiError::DatabaseConnectionError(_)));
    }
}
