// ==========================================
// 地铁车队入段排程系统 - 配置层
// ==========================================
// 职责: 评分参数、计划策略、成本参数的加载与覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod induction_config_trait;
pub mod scoring_profile;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, DEFAULT_REGISTRY_TIMEOUT_MS};
pub use induction_config_trait::InductionConfigReader;
pub use scoring_profile::{
    CostModel, PlanPolicy, ScoringProfile, ScoringWeights, MAX_SLOT_INTERVAL_HOURS,
};
