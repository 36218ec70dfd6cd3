// ==========================================
// 地铁车队入段排程系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 校验/容量错误由计划生成器就地处理；场景错误中止模拟
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    // ===== 数据校验 =====
    #[error("车辆数据校验失败 (train_id={train_id}): {reason}")]
    Validation { train_id: i64, reason: String },

    // ===== 容量 =====
    #[error("车辆段容量不足: depot_id={depot_id}, requested={requested}, available={available}")]
    CapacityExceeded {
        depot_id: i64,
        requested: u32,
        available: u32,
    },

    #[error("车辆段不存在: depot_id={0}")]
    DepotNotFound(i64),

    // ===== 场景 =====
    #[error("替补车辆无效: {0}")]
    InvalidReplacement(String),

    #[error("未知模拟场景: {0}")]
    UnknownScenario(String),

    #[error("车队为空，无可排程车辆")]
    EmptyFleet,
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
