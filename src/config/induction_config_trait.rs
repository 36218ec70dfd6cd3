// ==========================================
// 地铁车队入段排程系统 - 入段配置读取 Trait
// ==========================================
// 职责: 定义排程服务所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::scoring_profile::{CostModel, PlanPolicy, ScoringProfile};
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// InductionConfigReader Trait
// ==========================================
// 用途: 排程服务所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait InductionConfigReader: Send + Sync {
    /// 获取评分参数
    ///
    /// # 默认值
    /// - 权重 mileage=0.4, health=0.2, maintenance=0.4
    /// - 里程封顶 50000 km, 检修饱和 3 天
    /// - 证书加分 15, 异常每条 5 分、封顶 15 分
    async fn get_scoring_profile(&self) -> Result<ScoringProfile, Box<dyn Error + Send + Sync>>;

    /// 获取计划生成策略
    ///
    /// # 默认值
    /// - 时段间隔 24 小时, 允许跨段兜底
    async fn get_plan_policy(&self) -> Result<PlanPolicy, Box<dyn Error + Send + Sync>>;

    /// 获取模拟成本参数
    async fn get_cost_model(&self) -> Result<CostModel, Box<dyn Error + Send + Sync>>;

    /// 获取车辆台账读取超时（毫秒）
    ///
    /// # 默认值
    /// - 3000
    async fn get_registry_timeout_ms(&self) -> Result<u64, Box<dyn Error + Send + Sync>>;

    /// 获取配置快照（JSON），随计划快照写入历史台账
    async fn get_config_snapshot_json(&self) -> Result<String, Box<dyn Error + Send + Sync>>;
}
