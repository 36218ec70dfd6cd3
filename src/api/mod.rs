// ==========================================
// 地铁车队入段排程系统 - API 层
// ==========================================
// 职责: 对外业务接口，编排仓储、配置与引擎
// 红线: API 层不包含评分/排程规则
// ==========================================

pub mod error;
pub mod induction_api;

pub use error::{ApiError, ApiResult};
pub use induction_api::{
    build_scenario, InductionApi, PlanOutcome, SimulationRequest, DEFAULT_GENERATED_BY,
    MAX_HISTORY_LIMIT,
};
