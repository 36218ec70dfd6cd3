// ==========================================
// 地铁车队入段排程系统 - 引擎层
// ==========================================
// 职责: 实现评分、容量、计划生成与模拟规则,不拼 SQL
// 红线: 引擎为纯计算,所有排程结果必须输出 reason
// ==========================================

pub mod depot_capacity;
pub mod error;
pub mod impact_summary;
pub mod plan_builder;
pub mod scenario;
pub mod scoring;
pub mod simulation;

// 重导出核心引擎
pub use depot_capacity::DepotCapacityModel;
pub use error::{EngineError, EngineResult};
pub use impact_summary::{ImpactSummaryEngine, PlanDiff};
pub use plan_builder::{PlanBuilder, SlotHandover, ROUTINE_REASON, SLOT_OUT_OF_RANGE_REASON};
pub use scenario::{scenario_parameters, ScenarioParameters};
pub use scoring::{FactorContribution, ScoreBreakdown, ScoringEngine};
pub use simulation::{parse_scenario_kind, SimulationEngine};
