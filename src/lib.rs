// ==========================================
// 地铁车队入段排程系统 - 核心库
// ==========================================
// 技术栈: axum + Rust + SQLite
// 系统定位: 决策支持系统 (调度员最终控制权)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 车辆台账 / 历史台账
pub mod repository;

// 引擎层 - 评分、排程、模拟
pub mod engine;

// 配置层 - 评分权重与排程策略
pub mod config;

// 数据库基础设施（连接初始化/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - HTTP 服务
#[cfg(feature = "http-server")]
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    CertificateStatus, ChangeType, ImpactLevel, PriorityTier, ScenarioKind, TrainStatus,
};

// 领域实体
pub use domain::{
    BrandingContract, Depot, FleetSnapshot, InductionCandidate, InductionPlan, PlanSnapshot,
    SimulationResult, SimulationScenario, Train,
};

// 引擎
pub use engine::{
    DepotCapacityModel, EngineError, ImpactSummaryEngine, PlanBuilder, ScoringEngine,
    SimulationEngine,
};

// API
pub use api::{ApiError, InductionApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "地铁车队入段排程系统";
