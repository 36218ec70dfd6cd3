// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use metro_induction::config::{CostModel, InductionConfigReader, PlanPolicy, ScoringProfile};
use std::error::Error;

/// Mock 配置结构
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    pub profile: ScoringProfile,
    pub policy: PlanPolicy,
    pub cost: CostModel,
    pub registry_timeout_ms: u64,
}

impl MockConfig {
    /// 默认配置（超时 3 秒）
    pub fn new() -> Self {
        Self {
            registry_timeout_ms: 3_000,
            ..Default::default()
        }
    }

    pub fn with_timeout_ms(timeout_ms: u64) -> Self {
        Self {
            registry_timeout_ms: timeout_ms,
            ..Default::default()
        }
    }

    pub fn without_fallback() -> Self {
        let mut config = Self::new();
        config.policy.allow_cross_depot_fallback = false;
        config
    }
}

#[async_trait]
impl InductionConfigReader for MockConfig {
    async fn get_scoring_profile(&self) -> Result<ScoringProfile, Box<dyn Error + Send + Sync>> {
        Ok(self.profile.clone())
    }

    async fn get_plan_policy(&self) -> Result<PlanPolicy, Box<dyn Error + Send + Sync>> {
        Ok(self.policy.clone())
    }

    async fn get_cost_model(&self) -> Result<CostModel, Box<dyn Error + Send + Sync>> {
        Ok(self.cost)
    }

    async fn get_registry_timeout_ms(&self) -> Result<u64, Box<dyn Error + Send + Sync>> {
        Ok(self.registry_timeout_ms)
    }

    async fn get_config_snapshot_json(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        Ok(r#"{"source":"mock"}"#.to_string())
    }
}
