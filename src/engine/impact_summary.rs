// ==========================================
// 地铁车队入段排程系统 - 影响摘要引擎
// ==========================================
// 职责: 对比基础计划与模拟计划，输出变动清单、影响等级与计划指标
// 输入: 两份 InductionPlan + 车辆快照 + 成本参数
// 输出: PlanDiff / PlanMetrics
// ==========================================

use crate::config::scoring_profile::CostModel;
use crate::domain::induction::{InductionCandidate, InductionPlan};
use crate::domain::simulation::{CandidateChange, PlanMetrics};
use crate::domain::train::Train;
use crate::domain::types::{ChangeType, ImpactLevel, PriorityTier};
use crate::engine::scoring::round_one_decimal;
use std::collections::HashMap;

/// 计划差异
#[derive(Debug, Clone, PartialEq)]
pub struct PlanDiff {
    pub changes: Vec<CandidateChange>,
    pub trains_added: usize,
    pub trains_removed: usize,
    pub changed_ratio: f64,
    pub impact: ImpactLevel,
}

// ==========================================
// ImpactSummaryEngine - 影响摘要引擎
// ==========================================
// 红线: 无状态引擎,所有方法都是纯函数
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpactSummaryEngine;

impl ImpactSummaryEngine {
    pub fn new() -> Self {
        Self
    }

    // ==========================================
    // 计划差异
    // ==========================================

    /// 对比两份计划的已排车辆
    ///
    /// 每辆车至多一条变动：车辆段变化优先于时段变化。
    /// 顺序：先按基础计划时段，再按模拟计划时段列出新增车辆。
    pub fn diff(&self, base: &InductionPlan, modified: &InductionPlan) -> PlanDiff {
        let modified_map: HashMap<i64, &InductionCandidate> =
            modified.candidates.iter().map(|c| (c.train_id, c)).collect();
        let base_map: HashMap<i64, &InductionCandidate> =
            base.candidates.iter().map(|c| (c.train_id, c)).collect();

        let mut changes = Vec::new();

        for before in &base.candidates {
            match modified_map.get(&before.train_id) {
                None => changes.push(CandidateChange {
                    train_id: before.train_id,
                    train_number: before.train_number.clone(),
                    change_type: ChangeType::Removed,
                    from_slot: Some(before.slot_index),
                    to_slot: None,
                    from_depot: Some(before.depot_id),
                    to_depot: None,
                    reason: "Removed from induction plan".to_string(),
                }),
                Some(after) if after.depot_id != before.depot_id => changes.push(CandidateChange {
                    train_id: before.train_id,
                    train_number: before.train_number.clone(),
                    change_type: ChangeType::DepotChanged,
                    from_slot: Some(before.slot_index),
                    to_slot: Some(after.slot_index),
                    from_depot: Some(before.depot_id),
                    to_depot: Some(after.depot_id),
                    reason: format!(
                        "Depot changed from {} to {}",
                        before.depot_id, after.depot_id
                    ),
                }),
                Some(after) if after.slot_index != before.slot_index => {
                    changes.push(CandidateChange {
                        train_id: before.train_id,
                        train_number: before.train_number.clone(),
                        change_type: ChangeType::SlotMoved,
                        from_slot: Some(before.slot_index),
                        to_slot: Some(after.slot_index),
                        from_depot: Some(before.depot_id),
                        to_depot: Some(after.depot_id),
                        reason: format!(
                            "Moved from slot {} to slot {}",
                            before.slot_index + 1,
                            after.slot_index + 1
                        ),
                    })
                }
                Some(_) => {}
            }
        }

        for after in &modified.candidates {
            if !base_map.contains_key(&after.train_id) {
                changes.push(CandidateChange {
                    train_id: after.train_id,
                    train_number: after.train_number.clone(),
                    change_type: ChangeType::Added,
                    from_slot: None,
                    to_slot: Some(after.slot_index),
                    from_depot: None,
                    to_depot: Some(after.depot_id),
                    reason: format!("Added at slot {}", after.slot_index + 1),
                });
            }
        }

        let trains_added = count_type(&changes, ChangeType::Added);
        let trains_removed = count_type(&changes, ChangeType::Removed);
        let denominator = base
            .candidates
            .len()
            .max(modified.candidates.len())
            .max(1);
        let changed_ratio = changes.len() as f64 / denominator as f64;

        PlanDiff {
            changes,
            trains_added,
            trains_removed,
            changed_ratio,
            impact: ImpactLevel::from_changed_ratio(changed_ratio),
        }
    }

    // ==========================================
    // 计划指标
    // ==========================================

    /// 计算计划指标
    ///
    /// 里程均值与标准差只统计已排车辆；车辆快照中缺失的车辆不计入里程统计。
    pub fn metrics(&self, plan: &InductionPlan, trains: &[Train], cost: &CostModel) -> PlanMetrics {
        let train_map: HashMap<i64, &Train> = trains.iter().map(|t| (t.train_id, t)).collect();

        let scheduled: Vec<&Train> = plan
            .candidates
            .iter()
            .filter_map(|c| train_map.get(&c.train_id).copied())
            .collect();

        let mileages: Vec<f64> = scheduled.iter().map(|t| t.mileage_km as f64).collect();
        let (avg_mileage_km, mileage_std_dev_km) = mean_and_std_dev(&mileages);

        let cross_depot_moves = plan.candidates.iter().filter(|c| c.is_cross_depot()).count();
        let unscheduled_trains = plan.unscheduled.len();
        let estimated_cost = cross_depot_moves as f64 * cost.cross_depot_move_cost
            + unscheduled_trains as f64 * cost.deferral_cost;

        PlanMetrics {
            scheduled_trains: plan.candidates.len(),
            unscheduled_trains,
            high_priority: plan.count_by_tier(PriorityTier::High),
            medium_priority: plan.count_by_tier(PriorityTier::Medium),
            low_priority: plan.count_by_tier(PriorityTier::Low),
            total_score: round_one_decimal(plan.total_score()),
            average_score: round_one_decimal(plan.average_score()),
            cross_depot_moves,
            avg_mileage_km: round_one_decimal(avg_mileage_km),
            mileage_std_dev_km: round_one_decimal(mileage_std_dev_km),
            branded_trains: scheduled.iter().filter(|t| t.has_active_branding()).count(),
            estimated_cost,
            depot_assignments: plan.depot_assignments(),
        }
    }
}

fn count_type(changes: &[CandidateChange], change_type: ChangeType) -> usize {
    changes.iter().filter(|c| c.change_type == change_type).count()
}

/// 总体均值与标准差（空集为 0）
fn mean_and_std_dev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
