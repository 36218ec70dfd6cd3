// ==========================================
// 地铁车队入段排程系统 - 入段计划领域模型
// ==========================================
// 依据: induction_history 表
// 红线: 每次生成都是不可变快照，只追加不修改
// ==========================================

use crate::domain::types::PriorityTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// InductionCandidate - 入段候选
// ==========================================
// 生命周期: 每次生成计划时新建，不单独持久化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InductionCandidate {
    pub train_id: i64,
    pub train_number: String,
    pub priority_score: f64,          // 优先级分数 [0,100]，一位小数
    pub tier: PriorityTier,           // 由固定阈值推导
    pub slot_index: usize,            // 入段序号 (0 起)
    pub scheduled_at: DateTime<Utc>,  // 入段时刻 (严格递增)
    pub depot_id: i64,                // 分配车辆段
    pub home_depot_id: i64,           // 所属车辆段
    pub reasoning: Vec<String>,       // 贡献因子（按贡献降序）
}

impl InductionCandidate {
    /// 是否被调往非所属车辆段
    pub fn is_cross_depot(&self) -> bool {
        self.depot_id != self.home_depot_id
    }

    /// 理由文本（"; " 拼接）
    pub fn reasoning_text(&self) -> String {
        self.reasoning.join("; ")
    }
}

/// 因股道不足未能排入的车辆
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnscheduledTrain {
    pub train_id: i64,
    pub train_number: String,
    pub priority_score: f64,
    pub home_depot_id: i64,
    pub reason: String,
}

/// 因数据校验失败被拒绝的车辆记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedTrain {
    pub train_id: i64,
    pub train_number: String,
    pub reason: String,
}

// ==========================================
// InductionPlan - 入段计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InductionPlan {
    pub as_of: DateTime<Utc>,
    pub candidates: Vec<InductionCandidate>,
    pub unscheduled: Vec<UnscheduledTrain>,
    pub rejected: Vec<RejectedTrain>,
}

impl InductionPlan {
    /// 空计划
    pub fn empty(as_of: DateTime<Utc>) -> Self {
        Self {
            as_of,
            candidates: Vec::new(),
            unscheduled: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// 参与本次排程的全部车辆（已排 + 未排）
    pub fn planned_train_ids(&self) -> Vec<i64> {
        self.candidates
            .iter()
            .map(|c| c.train_id)
            .chain(self.unscheduled.iter().map(|u| u.train_id))
            .collect()
    }

    pub fn candidate(&self, train_id: i64) -> Option<&InductionCandidate> {
        self.candidates.iter().find(|c| c.train_id == train_id)
    }

    /// 各车辆段分配车辆数
    pub fn depot_assignments(&self) -> BTreeMap<i64, usize> {
        let mut map = BTreeMap::new();
        for c in &self.candidates {
            *map.entry(c.depot_id).or_insert(0) += 1;
        }
        map
    }

    pub fn count_by_tier(&self, tier: PriorityTier) -> usize {
        self.candidates.iter().filter(|c| c.tier == tier).count()
    }

    pub fn total_score(&self) -> f64 {
        self.candidates.iter().map(|c| c.priority_score).sum()
    }

    pub fn average_score(&self) -> f64 {
        if self.candidates.is_empty() {
            return 0.0;
        }
        self.total_score() / self.candidates.len() as f64
    }
}

// ==========================================
// PlanSnapshot - 计划历史快照
// ==========================================
// 用途: 写入历史台账，供审计与 /induction/history 查询
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub snapshot_id: String,
    pub generated_at: DateTime<Utc>,
    pub generated_by: String,
    pub trains_scheduled: usize,
    pub unscheduled_count: usize,
    pub high_priority: usize,
    pub avg_score: f64,
    pub status: String,
    pub config_snapshot: Option<String>,
    pub candidates: Vec<InductionCandidate>,
}

impl PlanSnapshot {
    /// 快照状态: 全部排入
    pub const STATUS_COMPLETED: &'static str = "Completed";
    /// 快照状态: 部分车辆因容量不足未排入
    pub const STATUS_PARTIAL: &'static str = "Partially Completed";

    /// 由计划生成快照
    pub fn from_plan(
        plan: &InductionPlan,
        snapshot_id: String,
        generated_by: &str,
        generated_at: DateTime<Utc>,
        config_snapshot: Option<String>,
    ) -> Self {
        let status = if plan.unscheduled.is_empty() {
            Self::STATUS_COMPLETED
        } else {
            Self::STATUS_PARTIAL
        };

        Self {
            snapshot_id,
            generated_at,
            generated_by: generated_by.to_string(),
            trains_scheduled: plan.candidates.len(),
            unscheduled_count: plan.unscheduled.len(),
            high_priority: plan.count_by_tier(PriorityTier::High),
            avg_score: (plan.average_score() * 10.0).round() / 10.0,
            status: status.to_string(),
            config_snapshot,
            candidates: plan.candidates.clone(),
        }
    }
}
