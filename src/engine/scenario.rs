// ==========================================
// 地铁车队入段排程系统 - 模拟场景参数调整
// ==========================================
// 职责: 按场景类型推导模拟所用的评分参数与计划策略
// 红线: 不修改基础配置，只返回调整后的副本
// ==========================================

use crate::config::scoring_profile::{PlanPolicy, ScoringProfile, ScoringWeights};
use crate::domain::simulation::SimulationScenario;
use crate::domain::types::ScenarioKind;

/// 广告优先场景的加权分
pub const BRANDING_PRIORITY_BOOST: f64 = 20.0;

/// 里程均衡场景权重
pub const MILEAGE_BALANCING_WEIGHTS: ScoringWeights = ScoringWeights {
    mileage: 0.6,
    health: 0.2,
    maintenance: 0.2,
};

/// 调车成本场景权重
pub const SHUNTING_COST_WEIGHTS: ScoringWeights = ScoringWeights {
    mileage: 0.3,
    health: 0.2,
    maintenance: 0.5,
};

/// 场景参数
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioParameters {
    pub profile: ScoringProfile,
    pub policy: PlanPolicy,
}

/// 推导场景参数
///
/// - TrainReplacement: 参数不变，仅车辆集合变化
/// - BrandingPriority: 启用广告加权（有目标时仅作用于目标车辆）
/// - MileageBalancing: 提高里程权重
/// - ShuntingCost: 提高检修紧迫权重并禁止跨段调车
pub fn scenario_parameters(
    scenario: &SimulationScenario,
    base_profile: &ScoringProfile,
    base_policy: &PlanPolicy,
) -> ScenarioParameters {
    let mut profile = base_profile.clone();
    let mut policy = base_policy.clone();

    match scenario.kind {
        ScenarioKind::TrainReplacement => {}
        ScenarioKind::BrandingPriority => {
            profile.branding_boost = BRANDING_PRIORITY_BOOST;
            profile.branding_target_ids = scenario.target_train_ids.clone();
        }
        ScenarioKind::MileageBalancing => {
            profile.weights = MILEAGE_BALANCING_WEIGHTS;
        }
        ScenarioKind::ShuntingCost => {
            profile.weights = SHUNTING_COST_WEIGHTS;
            policy.allow_cross_depot_fallback = false;
        }
    }

    ScenarioParameters { profile, policy }
}
