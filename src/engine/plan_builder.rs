// ==========================================
// 地铁车队入段排程系统 - 入段计划生成器
// ==========================================
// 职责: 评分 → 排序 → 分配车辆段股道 → 生成入段时段与理由
// 输入: 车辆列表 + 车辆段快照 + 计划基准时刻
// 输出: InductionPlan（已排 / 未排 / 拒绝）
// 红线: 相同输入得到相同计划；容量约束优先于优先级
// ==========================================

use crate::config::scoring_profile::PlanPolicy;
use crate::domain::depot::Depot;
use crate::domain::induction::{InductionCandidate, InductionPlan, RejectedTrain, UnscheduledTrain};
use crate::domain::train::Train;
use crate::engine::depot_capacity::DepotCapacityModel;
use crate::engine::scoring::{ScoreBreakdown, ScoringEngine};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// 无因子达到阈值时的默认理由
pub const ROUTINE_REASON: &str = "Routine induction window";

/// 入段时刻超出可表示范围时的未排入原因
pub const SLOT_OUT_OF_RANGE_REASON: &str = "Induction slot time out of range";

/// 换车交接：替补车辆接管目标车辆的股道与时段
#[derive(Debug, Clone, PartialEq)]
pub struct SlotHandover {
    /// 替补车辆
    pub train_id: i64,
    /// 被替换车辆的车号
    pub replaces: String,
    /// 被替换车辆占用的车辆段
    pub depot_id: i64,
    /// 被替换车辆的时段序号
    pub slot_index: usize,
}

// ==========================================
// PlanBuilder - 入段计划生成器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct PlanBuilder {
    scoring: ScoringEngine,
    policy: PlanPolicy,
}

impl PlanBuilder {
    pub fn new(scoring: ScoringEngine, policy: PlanPolicy) -> Self {
        Self { scoring, policy }
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    pub fn policy(&self) -> &PlanPolicy {
        &self.policy
    }

    /// 生成入段计划
    ///
    /// 规则：
    /// 1) 退役、故障停用车辆不参与；校验失败的记录进入 rejected，不中断
    /// 2) 按分数降序、同分按 train_id 升序
    /// 3) 先所属车辆段，满则按策略兜底到可用股道最多的车辆段
    /// 4) 仍无股道则进入 unscheduled
    #[instrument(skip(self, trains, depots), fields(
        train_count = trains.len(),
        depot_count = depots.len(),
        as_of = %as_of
    ))]
    pub fn generate_plan(
        &self,
        trains: &[Train],
        depots: &[Depot],
        as_of: DateTime<Utc>,
    ) -> InductionPlan {
        self.generate_plan_with_handover(trains, depots, as_of, None)
    }

    /// 生成入段计划，替补车辆先行占用交接的股道，并插入交接时段
    ///
    /// 其余车辆仍按分数排序分配，时段在最后统一编号
    pub fn generate_plan_with_handover(
        &self,
        trains: &[Train],
        depots: &[Depot],
        as_of: DateTime<Utc>,
        handover: Option<&SlotHandover>,
    ) -> InductionPlan {
        let today = as_of.date_naive();
        let mut plan = InductionPlan::empty(as_of);

        // 1. 评分
        let mut scored: Vec<(&Train, ScoreBreakdown)> = Vec::with_capacity(trains.len());
        for train in trains.iter().filter(|t| t.is_plannable()) {
            match self.scoring.score(train, today) {
                Ok(breakdown) => scored.push((train, breakdown)),
                Err(err) => {
                    warn!(train_id = train.train_id, error = %err, "车辆记录校验失败，已拒绝");
                    plan.rejected.push(RejectedTrain {
                        train_id: train.train_id,
                        train_number: train.train_number.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        // 2. 排序
        scored.sort_by(|(a, sa), (b, sb)| {
            sb.score
                .total_cmp(&sa.score)
                .then_with(|| a.train_id.cmp(&b.train_id))
        });

        // 3. 分配
        let depot_names: HashMap<i64, &str> =
            depots.iter().map(|d| (d.depot_id, d.name.as_str())).collect();
        let mut capacity = DepotCapacityModel::from_depots(depots);
        let handed_over = handover.and_then(|h| {
            self.take_handover(h, &mut scored, &mut capacity, &depot_names, as_of)
        });

        for (train, breakdown) in scored {
            let assigned = match capacity.reserve(train.depot_id, 1) {
                Ok(()) => Some(train.depot_id),
                Err(err) => {
                    debug!(train_id = train.train_id, error = %err, "所属车辆段无可用股道");
                    self.reserve_fallback(&mut capacity, train.depot_id)
                }
            };

            let Some(depot_id) = assigned else {
                let reason = if self.policy.allow_cross_depot_fallback {
                    "No depot bay available".to_string()
                } else {
                    format!(
                        "Home depot {} full; cross-depot moves disabled",
                        depot_label(&depot_names, train.depot_id)
                    )
                };
                warn!(
                    train_id = train.train_id,
                    score = breakdown.score,
                    home_depot_id = train.depot_id,
                    "无可用股道，车辆未排入"
                );
                plan.unscheduled.push(UnscheduledTrain {
                    train_id: train.train_id,
                    train_number: train.train_number.clone(),
                    priority_score: breakdown.score,
                    home_depot_id: train.depot_id,
                    reason,
                });
                continue;
            };

            let mut reasoning = self.build_reasoning(&breakdown);
            if depot_id != train.depot_id {
                reasoning.push(format!(
                    "Home depot {} full, reassigned to {}",
                    depot_label(&depot_names, train.depot_id),
                    depot_label(&depot_names, depot_id)
                ));
            }

            plan.candidates
                .push(self.candidate(train, &breakdown, depot_id, reasoning, as_of));
        }

        if let Some(candidate) = handed_over {
            let at = candidate.slot_index.min(plan.candidates.len());
            plan.candidates.insert(at, candidate);
        }
        self.assign_slots(&mut plan, as_of);

        info!(
            scheduled = plan.candidates.len(),
            unscheduled = plan.unscheduled.len(),
            rejected = plan.rejected.len(),
            "入段计划生成完成"
        );

        plan
    }

    fn reserve_fallback(&self, capacity: &mut DepotCapacityModel, home_depot_id: i64) -> Option<i64> {
        if !self.policy.allow_cross_depot_fallback {
            return None;
        }
        let fallback = capacity.best_fallback(home_depot_id)?;
        match capacity.reserve(fallback, 1) {
            Ok(()) => Some(fallback),
            Err(err) => {
                // best_fallback 只返回有余量的车辆段，此处不应失败
                warn!(depot_id = fallback, error = %err, "兜底车辆段预留失败");
                None
            }
        }
    }

    /// 替补车辆占用交接股道；预留失败时回到常规排程
    fn take_handover(
        &self,
        handover: &SlotHandover,
        scored: &mut Vec<(&Train, ScoreBreakdown)>,
        capacity: &mut DepotCapacityModel,
        depot_names: &HashMap<i64, &str>,
        as_of: DateTime<Utc>,
    ) -> Option<InductionCandidate> {
        let pos = scored.iter().position(|(t, _)| t.train_id == handover.train_id)?;
        if let Err(err) = capacity.reserve(handover.depot_id, 1) {
            warn!(train_id = handover.train_id, error = %err, "交接股道预留失败，替补车辆按常规排程");
            return None;
        }

        let (train, breakdown) = scored.remove(pos);
        let mut reasoning = self.build_reasoning(&breakdown);
        reasoning.push(format!(
            "Replaces {} in its induction slot at {}",
            handover.replaces,
            depot_label(depot_names, handover.depot_id)
        ));

        let mut candidate = self.candidate(train, &breakdown, handover.depot_id, reasoning, as_of);
        candidate.slot_index = handover.slot_index;
        Some(candidate)
    }

    fn candidate(
        &self,
        train: &Train,
        breakdown: &ScoreBreakdown,
        depot_id: i64,
        reasoning: Vec<String>,
        as_of: DateTime<Utc>,
    ) -> InductionCandidate {
        InductionCandidate {
            train_id: train.train_id,
            train_number: train.train_number.clone(),
            priority_score: breakdown.score,
            tier: breakdown.tier,
            slot_index: 0,
            scheduled_at: as_of,
            depot_id,
            home_depot_id: train.depot_id,
            reasoning,
        }
    }

    /// 按最终顺序编号时段；入段时刻溢出的车辆转入 unscheduled
    fn assign_slots(&self, plan: &mut InductionPlan, as_of: DateTime<Utc>) {
        let candidates = std::mem::take(&mut plan.candidates);
        for mut candidate in candidates {
            let slot_index = plan.candidates.len();
            match self.slot_time(as_of, slot_index) {
                Some(scheduled_at) => {
                    candidate.slot_index = slot_index;
                    candidate.scheduled_at = scheduled_at;
                    plan.candidates.push(candidate);
                }
                None => {
                    warn!(
                        train_id = candidate.train_id,
                        slot_index,
                        interval_hours = self.policy.slot_interval_hours,
                        "入段时刻超出范围，车辆未排入"
                    );
                    plan.unscheduled.push(UnscheduledTrain {
                        train_id: candidate.train_id,
                        train_number: candidate.train_number,
                        priority_score: candidate.priority_score,
                        home_depot_id: candidate.home_depot_id,
                        reason: SLOT_OUT_OF_RANGE_REASON.to_string(),
                    });
                }
            }
        }
    }

    /// 入段时刻 = as_of + (slot_index + 1) × 时段间隔；超出范围返回 None
    fn slot_time(&self, as_of: DateTime<Utc>, slot_index: usize) -> Option<DateTime<Utc>> {
        let slots = i64::try_from(slot_index).ok()?.checked_add(1)?;
        let hours = self.policy.slot_interval_hours.max(1).checked_mul(slots)?;
        as_of.checked_add_signed(Duration::try_hours(hours)?)
    }

    fn build_reasoning(&self, breakdown: &ScoreBreakdown) -> Vec<String> {
        let mut reasons: Vec<String> = breakdown
            .ranked_contributions(self.policy.reason_min_contribution)
            .into_iter()
            .take(self.policy.max_reasons)
            .map(|c| c.detail.clone())
            .collect();
        if reasons.is_empty() {
            reasons.push(ROUTINE_REASON.to_string());
        }
        reasons
    }
}

fn depot_label(names: &HashMap<i64, &str>, depot_id: i64) -> String {
    names
        .get(&depot_id)
        .map(|n| n.to_string())
        .unwrap_or_else(|| format!("#{}", depot_id))
}
