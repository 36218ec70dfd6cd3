// ==========================================
// 地铁车队入段排程系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、容量接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod depot;
pub mod fleet;
pub mod induction;
pub mod simulation;
pub mod train;
pub mod types;

// 重导出核心类型
pub use depot::{BayCapacity, Depot};
pub use fleet::{DepotUtilization, FleetOverview, FleetSnapshot};
pub use induction::{InductionCandidate, InductionPlan, PlanSnapshot, RejectedTrain, UnscheduledTrain};
pub use simulation::{
    CandidateChange, PlanMetrics, ReplacementDetails, SimulationResult, SimulationScenario,
};
pub use train::{BrandingContract, Train};
pub use types::{
    CertificateStatus, ChangeType, ImpactLevel, PriorityTier, ScenarioKind, ScoreFactor,
    TrainStatus,
};
