use serde::{Deserialize, Serialize};

/// 评分权重（加权平均的三项连续因子）
///
/// 里程压力与检修紧迫度为两项主因子，默认等权
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_mileage_weight")]
    pub mileage: f64,
    #[serde(default = "default_health_weight")]
    pub health: f64,
    #[serde(default = "default_maintenance_weight")]
    pub maintenance: f64,
}

fn default_mileage_weight() -> f64 {
    0.4
}

fn default_health_weight() -> f64 {
    0.2
}

fn default_maintenance_weight() -> f64 {
    0.4
}

impl ScoringWeights {
    pub fn new(mileage: f64, health: f64, maintenance: f64) -> Self {
        Self {
            mileage,
            health,
            maintenance,
        }
    }

    pub fn sum(&self) -> f64 {
        self.mileage + self.health + self.maintenance
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::new(
            default_mileage_weight(),
            default_health_weight(),
            default_maintenance_weight(),
        )
    }
}

/// 评分参数
///
/// 存储位置：config_kv（scope_id='global'，key 见 `config_keys`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringProfile {
    #[serde(default)]
    pub weights: ScoringWeights,

    /// 里程压力封顶里程（km），达到即 100 分
    pub mileage_ceiling_km: f64,

    /// 检修紧迫度饱和天数：距检修 ≤ 该天数即 100 分
    pub maintenance_saturation_days: f64,

    /// 证书非 Valid 时的固定加分
    pub certificate_bonus: f64,

    /// 每条未关闭传感器异常的加分
    pub anomaly_bonus_per_event: f64,

    /// 异常加分上限
    pub anomaly_bonus_cap: f64,

    /// 广告合同加权（0 表示不启用，仅场景模拟使用）
    #[serde(default)]
    pub branding_boost: f64,

    /// 广告加权对象（为空表示全部有效合同车辆）
    #[serde(default)]
    pub branding_target_ids: Vec<i64>,
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            mileage_ceiling_km: 50_000.0,
            maintenance_saturation_days: 3.0,
            certificate_bonus: 15.0,
            anomaly_bonus_per_event: 5.0,
            anomaly_bonus_cap: 15.0,
            branding_boost: 0.0,
            branding_target_ids: Vec::new(),
        }
    }
}

impl ScoringProfile {
    /// 校验参数合法性
    pub fn validate(&self) -> Result<(), String> {
        let w = &self.weights;
        let finite = [
            w.mileage,
            w.health,
            w.maintenance,
            self.mileage_ceiling_km,
            self.maintenance_saturation_days,
            self.certificate_bonus,
            self.anomaly_bonus_per_event,
            self.anomaly_bonus_cap,
            self.branding_boost,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err("评分参数包含非有限数值".to_string());
        }
        if w.mileage < 0.0 || w.health < 0.0 || w.maintenance < 0.0 {
            return Err(format!(
                "评分权重不能为负: mileage={}, health={}, maintenance={}",
                w.mileage, w.health, w.maintenance
            ));
        }
        if w.sum() <= 0.0 {
            return Err("评分权重之和必须为正".to_string());
        }
        if self.mileage_ceiling_km <= 0.0 {
            return Err(format!("里程封顶必须为正: {}", self.mileage_ceiling_km));
        }
        if self.maintenance_saturation_days <= 0.0 {
            return Err(format!(
                "检修饱和天数必须为正: {}",
                self.maintenance_saturation_days
            ));
        }
        Ok(())
    }
}

/// 时段间隔上限（小时），一年
pub const MAX_SLOT_INTERVAL_HOURS: i64 = 24 * 365;

/// 计划生成策略
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPolicy {
    /// 相邻入段时段间隔（小时）
    pub slot_interval_hours: i64,

    /// 所属车辆段满时是否允许调往其他车辆段
    pub allow_cross_depot_fallback: bool,

    /// 入段理由的最小贡献分
    pub reason_min_contribution: f64,

    /// 入段理由最多条数
    pub max_reasons: usize,
}

impl Default for PlanPolicy {
    fn default() -> Self {
        Self {
            slot_interval_hours: 24,
            allow_cross_depot_fallback: true,
            reason_min_contribution: 5.0,
            max_reasons: 4,
        }
    }
}

/// 模拟成本估算参数（单位：卢比）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    /// 每次跨段调车成本
    pub cross_depot_move_cost: f64,

    /// 每辆未排入车辆的延期成本
    pub deferral_cost: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            cross_depot_move_cost: 2_500.0,
            deferral_cost: 10_000.0,
        }
    }
}
