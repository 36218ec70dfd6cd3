// ==========================================
// 地铁车队入段排程系统 - 模拟领域模型
// ==========================================
// 职责: 模拟场景输入、计划指标、影响摘要输出
// 红线: 模拟结果不落库
// ==========================================

use crate::domain::types::{ChangeType, ImpactLevel, ScenarioKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// SimulationScenario - 模拟场景
// ==========================================
// 不变式: replacement_train_id 指向的车辆必须处于 Available
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationScenario {
    pub kind: ScenarioKind,
    pub target_train_ids: Vec<i64>,
    pub replacement_train_id: Option<i64>,
}

impl SimulationScenario {
    /// 换车场景（replacement 为空表示故障下线、无替补）
    pub fn train_replacement(target_train_id: i64, replacement_train_id: Option<i64>) -> Self {
        Self {
            kind: ScenarioKind::TrainReplacement,
            target_train_ids: vec![target_train_id],
            replacement_train_id,
        }
    }

    /// 权重调整类场景
    pub fn reweight(kind: ScenarioKind) -> Self {
        Self {
            kind,
            target_train_ids: Vec::new(),
            replacement_train_id: None,
        }
    }

    pub fn with_targets(mut self, target_train_ids: Vec<i64>) -> Self {
        self.target_train_ids = target_train_ids;
        self
    }
}

// ==========================================
// PlanMetrics - 计划指标快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanMetrics {
    // ===== 排程数量 =====
    pub scheduled_trains: usize,
    pub unscheduled_trains: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,

    // ===== 分数 =====
    pub total_score: f64,
    pub average_score: f64,

    // ===== 调车与里程 =====
    pub cross_depot_moves: usize,
    pub avg_mileage_km: f64,
    pub mileage_std_dev_km: f64,
    pub branded_trains: usize,

    // ===== 成本 =====
    pub estimated_cost: f64,

    // ===== 车辆段分配 =====
    pub depot_assignments: BTreeMap<i64, usize>,
}

// ==========================================
// CandidateChange - 单车变动
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateChange {
    pub train_id: i64,
    pub train_number: String,
    pub change_type: ChangeType,
    pub from_slot: Option<usize>,
    pub to_slot: Option<usize>,
    pub from_depot: Option<i64>,
    pub to_depot: Option<i64>,
    pub reason: String,
}

/// 换车详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementDetails {
    pub original_train: String,
    pub replacement_train: Option<String>,
    pub replacement_depot_id: Option<i64>,
    pub replacement_score: Option<f64>,
    pub replacement_slot: Option<usize>,
}

// ==========================================
// SimulationResult - 模拟结果
// ==========================================
// 生命周期: 临时对象，不持久化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub scenario: SimulationScenario,
    pub base_metrics: PlanMetrics,
    pub simulation_metrics: PlanMetrics,
    pub impact: ImpactLevel,
    pub changes: Vec<CandidateChange>,
    pub trains_added: usize,
    pub trains_removed: usize,
    pub changed_ratio: f64,
    /// 已排车辆总分变化（模拟 − 基础）
    pub score_delta: f64,
    /// 已排车辆平均分变化（模拟 − 基础）
    pub average_score_delta: f64,
    pub estimated_cost_delta: f64,
    pub replacement_details: Option<ReplacementDetails>,
}
