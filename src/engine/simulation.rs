// ==========================================
// 地铁车队入段排程系统 - 模拟引擎
// ==========================================
// 职责: 在基础计划上应用假设场景，重新生成计划并输出影响摘要
// 输入: 基础计划 + 场景 + 车队快照 + 计划基准时刻
// 输出: SimulationResult（不落库）
// 红线: 场景错误整体中止，不返回部分结果；不读取系统时钟
// ==========================================

use crate::config::scoring_profile::{CostModel, PlanPolicy, ScoringProfile};
use crate::domain::fleet::FleetSnapshot;
use crate::domain::induction::InductionPlan;
use crate::domain::simulation::{ReplacementDetails, SimulationResult, SimulationScenario};
use crate::domain::train::Train;
use crate::domain::types::{ScenarioKind, TrainStatus};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::impact_summary::ImpactSummaryEngine;
use crate::engine::plan_builder::{PlanBuilder, SlotHandover};
use crate::engine::scenario::scenario_parameters;
use crate::engine::scoring::{round_one_decimal, ScoringEngine};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument, warn};

/// 解析场景类型字符串
pub fn parse_scenario_kind(raw: &str) -> EngineResult<ScenarioKind> {
    raw.parse::<ScenarioKind>()
        .map_err(|_| EngineError::UnknownScenario(raw.to_string()))
}

// ==========================================
// SimulationEngine - 模拟引擎
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct SimulationEngine {
    profile: ScoringProfile,
    policy: PlanPolicy,
    cost: CostModel,
    impact: ImpactSummaryEngine,
}

impl SimulationEngine {
    /// 评分参数非法时回落默认值，场景在合法参数上调整
    pub fn new(profile: ScoringProfile, policy: PlanPolicy, cost: CostModel) -> Self {
        let profile = match profile.validate() {
            Ok(()) => profile,
            Err(reason) => {
                warn!(reason = %reason, "模拟评分参数非法，使用默认评分参数");
                ScoringProfile::default()
            }
        };
        Self {
            profile,
            policy,
            cost,
            impact: ImpactSummaryEngine::new(),
        }
    }

    /// 执行模拟
    ///
    /// # 错误
    /// - EmptyFleet: 车队无可排程车辆
    /// - Validation: 换车场景目标车辆缺失或不唯一
    /// - InvalidReplacement: 替补车辆不存在、不可用、与目标相同或已在基础计划中
    #[instrument(skip(self, base_plan, scenario, fleet), fields(
        scenario = %scenario.kind,
        base_scheduled = base_plan.candidates.len(),
        as_of = %as_of
    ))]
    pub fn simulate(
        &self,
        base_plan: &InductionPlan,
        scenario: &SimulationScenario,
        fleet: &FleetSnapshot,
        as_of: DateTime<Utc>,
    ) -> EngineResult<SimulationResult> {
        if fleet.plannable_count() == 0 {
            return Err(EngineError::EmptyFleet);
        }

        // 1. 确定参与模拟的车辆集合（基础计划的已排 + 未排车辆）
        let mut train_ids: BTreeSet<i64> = base_plan.planned_train_ids().into_iter().collect();
        let mut replacement_context = None;
        let mut handover = None;

        if scenario.kind == ScenarioKind::TrainReplacement {
            let (target, replacement) = self.validate_replacement(scenario, base_plan, fleet)?;
            train_ids.remove(&target.train_id);
            if let Some(r) = replacement {
                train_ids.insert(r.train_id);
                // 替补车辆接管目标车辆的股道与时段；目标未排入时按常规排程
                handover = base_plan.candidate(target.train_id).map(|c| SlotHandover {
                    train_id: r.train_id,
                    replaces: target.train_number.clone(),
                    depot_id: c.depot_id,
                    slot_index: c.slot_index,
                });
            }
            replacement_context = Some((target, replacement));
        }

        let trains: Vec<Train> = train_ids
            .iter()
            .filter_map(|id| {
                let train = fleet.train(*id);
                if train.is_none() {
                    debug!(train_id = id, "车队快照中缺少计划车辆，已跳过");
                }
                train.cloned()
            })
            .collect();

        // 2. 按场景参数重新生成计划
        let params = scenario_parameters(scenario, &self.profile, &self.policy);
        let builder = PlanBuilder::new(ScoringEngine::new(params.profile), params.policy);
        let modified =
            builder.generate_plan_with_handover(&trains, &fleet.depots, as_of, handover.as_ref());

        // 3. 影响摘要
        let base_metrics = self.impact.metrics(base_plan, &fleet.trains, &self.cost);
        let simulation_metrics = self.impact.metrics(&modified, &fleet.trains, &self.cost);
        let diff = self.impact.diff(base_plan, &modified);

        let replacement_details = replacement_context.map(|(target, replacement)| {
            let placed = replacement.and_then(|r| modified.candidate(r.train_id));
            ReplacementDetails {
                original_train: target.train_number.clone(),
                replacement_train: replacement.map(|r| r.train_number.clone()),
                replacement_depot_id: placed.map(|c| c.depot_id),
                replacement_score: placed.map(|c| c.priority_score),
                replacement_slot: placed.map(|c| c.slot_index),
            }
        });

        let score_delta =
            round_one_decimal(simulation_metrics.total_score - base_metrics.total_score);
        let average_score_delta =
            round_one_decimal(simulation_metrics.average_score - base_metrics.average_score);
        let estimated_cost_delta = simulation_metrics.estimated_cost - base_metrics.estimated_cost;

        info!(
            changes = diff.changes.len(),
            impact = %diff.impact,
            score_delta,
            estimated_cost_delta,
            "模拟完成"
        );

        Ok(SimulationResult {
            scenario: scenario.clone(),
            base_metrics,
            simulation_metrics,
            impact: diff.impact,
            changes: diff.changes,
            trains_added: diff.trains_added,
            trains_removed: diff.trains_removed,
            changed_ratio: diff.changed_ratio,
            score_delta,
            average_score_delta,
            estimated_cost_delta,
            replacement_details,
        })
    }

    fn validate_replacement<'a>(
        &self,
        scenario: &SimulationScenario,
        base_plan: &InductionPlan,
        fleet: &'a FleetSnapshot,
    ) -> EngineResult<(&'a Train, Option<&'a Train>)> {
        let target_id = match scenario.target_train_ids.as_slice() {
            [id] => *id,
            ids => {
                return Err(EngineError::Validation {
                    train_id: ids.first().copied().unwrap_or_default(),
                    reason: format!("换车场景需要且仅需要一个目标车辆，实际 {} 个", ids.len()),
                })
            }
        };

        let target = fleet.train(target_id).ok_or_else(|| EngineError::Validation {
            train_id: target_id,
            reason: "目标车辆不存在".to_string(),
        })?;

        let Some(replacement_id) = scenario.replacement_train_id else {
            // 无替补：按故障下线处理
            return Ok((target, None));
        };

        if replacement_id == target_id {
            return Err(EngineError::InvalidReplacement(format!(
                "替补车辆不能与目标车辆相同: {}",
                target.train_number
            )));
        }

        let replacement = fleet.train(replacement_id).ok_or_else(|| {
            EngineError::InvalidReplacement(format!("替补车辆不存在: train_id={}", replacement_id))
        })?;

        if replacement.retired || replacement.status != TrainStatus::Available {
            return Err(EngineError::InvalidReplacement(format!(
                "替补车辆 {} 状态为 {}，必须为 Available",
                replacement.train_number, replacement.status
            )));
        }

        if let Some(scheduled) = base_plan.candidate(replacement_id) {
            return Err(EngineError::InvalidReplacement(format!(
                "替补车辆 {} 已在基础计划时段 {} 中",
                replacement.train_number, scheduled.slot_index
            )));
        }

        Ok((target, Some(replacement)))
    }
}
