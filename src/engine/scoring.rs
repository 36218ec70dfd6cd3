// ==========================================
// 地铁车队入段排程系统 - 评分引擎
// ==========================================
// 职责: 计算单车入段优先级分数 [0,100]
// 输入: Train + 评分参数 + 计划基准日
// 输出: ScoreBreakdown（总分 + 各因子贡献）
// 红线: 纯函数，不做 I/O，相同输入得到相同输出
// ==========================================

use crate::config::scoring_profile::ScoringProfile;
use crate::domain::train::Train;
use crate::domain::types::{PriorityTier, ScoreFactor};
use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// 单个因子的分数贡献
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    pub factor: ScoreFactor,
    pub points: f64,     // 对总分的贡献（分）
    pub detail: String,  // 可读说明，用作入段理由
}

/// 评分明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub train_id: i64,
    pub score: f64,
    pub tier: PriorityTier,
    pub contributions: Vec<FactorContribution>,
}

impl ScoreBreakdown {
    /// 贡献不低于 min_points 的因子，按贡献降序（同分按因子声明顺序）
    pub fn ranked_contributions(&self, min_points: f64) -> Vec<&FactorContribution> {
        let mut ranked: Vec<&FactorContribution> = self
            .contributions
            .iter()
            .filter(|c| c.points >= min_points)
            .collect();
        ranked.sort_by(|a, b| b.points.total_cmp(&a.points));
        ranked
    }

    pub fn contribution(&self, factor: ScoreFactor) -> f64 {
        self.contributions
            .iter()
            .filter(|c| c.factor == factor)
            .map(|c| c.points)
            .sum()
    }
}

// ==========================================
// ScoringEngine - 评分引擎
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    profile: ScoringProfile,
}

impl ScoringEngine {
    /// 参数非法（如权重之和为 0）时使用默认评分参数，保证分数落在 [0,100]
    pub fn new(profile: ScoringProfile) -> Self {
        match profile.validate() {
            Ok(()) => Self { profile },
            Err(reason) => {
                warn!(reason = %reason, "评分参数非法，使用默认评分参数");
                Self::default()
            }
        }
    }

    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    /// 计算单车优先级分数
    ///
    /// 规则：
    /// 1) 三项连续因子（里程压力/健康缺口/检修紧迫）按权重加权平均
    /// 2) 证书、传感器异常、广告合同为附加分
    /// 3) 总分截断到 [0,100] 并保留一位小数
    pub fn score(&self, train: &Train, today: NaiveDate) -> EngineResult<ScoreBreakdown> {
        self.validate(train)?;

        let p = &self.profile;
        let weight_sum = p.weights.sum();
        let mut contributions = Vec::with_capacity(6);

        // ===== 加权因子 =====
        let mileage_component =
            (train.mileage_km as f64 / p.mileage_ceiling_km * 100.0).clamp(0.0, 100.0);
        contributions.push(FactorContribution {
            factor: ScoreFactor::Mileage,
            points: p.weights.mileage * mileage_component / weight_sum,
            detail: format!("High mileage ({} km)", format_thousands(train.mileage_km)),
        });

        let health_component = f64::from(100 - train.health_score);
        contributions.push(FactorContribution {
            factor: ScoreFactor::Health,
            points: p.weights.health * health_component / weight_sum,
            detail: format!("Health score below optimal ({}%)", train.health_score),
        });

        let days = train.days_until_maintenance(today);
        let maintenance_component = match days {
            None => 0.0,
            Some(d) if d <= 0 => 100.0,
            Some(d) => (100.0 * p.maintenance_saturation_days / d as f64).min(100.0),
        };
        contributions.push(FactorContribution {
            factor: ScoreFactor::MaintenanceWindow,
            points: p.weights.maintenance * maintenance_component / weight_sum,
            detail: match days {
                Some(d) if d < 0 => format!("Maintenance overdue by {} days", -d),
                Some(0) => "Maintenance due today".to_string(),
                Some(d) => format!("Maintenance due in {} days", d),
                None => "No maintenance date on record".to_string(),
            },
        });

        // ===== 附加分 =====
        if !train.certificate_status.is_valid() {
            contributions.push(FactorContribution {
                factor: ScoreFactor::Certificate,
                points: p.certificate_bonus,
                detail: format!("Fitness certificate {}", train.certificate_status.label()),
            });
        }

        if train.open_anomaly_count > 0 {
            let points = (f64::from(train.open_anomaly_count) * p.anomaly_bonus_per_event)
                .min(p.anomaly_bonus_cap);
            contributions.push(FactorContribution {
                factor: ScoreFactor::Anomalies,
                points,
                detail: format!("{} open sensor anomalies", train.open_anomaly_count),
            });
        }

        if let Some(points) = self.branding_points(train) {
            let remaining_pct = train
                .branding
                .as_ref()
                .map(|b| (1.0 - b.usage_ratio()) * 100.0)
                .unwrap_or(0.0);
            contributions.push(FactorContribution {
                factor: ScoreFactor::Branding,
                points,
                detail: format!(
                    "Branding contract with {:.0}% hours remaining",
                    remaining_pct
                ),
            });
        }

        let raw: f64 = contributions.iter().map(|c| c.points).sum();
        let score = round_one_decimal(raw.clamp(0.0, 100.0));

        Ok(ScoreBreakdown {
            train_id: train.train_id,
            score,
            tier: PriorityTier::from_score(score),
            contributions,
        })
    }

    /// 广告加权分（未启用或不适用时为 None）
    fn branding_points(&self, train: &Train) -> Option<f64> {
        let p = &self.profile;
        if p.branding_boost <= 0.0 || !train.has_active_branding() {
            return None;
        }
        if !p.branding_target_ids.is_empty() && !p.branding_target_ids.contains(&train.train_id) {
            return None;
        }
        let contract = train.branding.as_ref()?;
        Some(p.branding_boost * (1.0 - contract.usage_ratio()))
    }

    fn validate(&self, train: &Train) -> EngineResult<()> {
        if train.mileage_km < 0 {
            return Err(EngineError::Validation {
                train_id: train.train_id,
                reason: format!("里程不能为负: {}", train.mileage_km),
            });
        }
        if !(0..=100).contains(&train.health_score) {
            return Err(EngineError::Validation {
                train_id: train.train_id,
                reason: format!("健康度超出范围 [0,100]: {}", train.health_score),
            });
        }
        if let Some(contract) = &train.branding {
            contract
                .validate()
                .map_err(|reason| EngineError::Validation {
                    train_id: train.train_id,
                    reason,
                })?;
        }
        Ok(())
    }
}

pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// 千分位格式化（45000 -> "45,000"）
fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}
