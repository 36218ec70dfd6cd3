// ==========================================
// 模拟引擎集成测试
// ==========================================
// 测试范围: 换车/故障、权重场景、影响摘要、幂等性
// ==========================================

mod helpers;

use helpers::test_data_builder::*;
use metro_induction::config::{CostModel, PlanPolicy, ScoringProfile};
use metro_induction::domain::types::{ChangeType, ImpactLevel, ScenarioKind};
use metro_induction::domain::{FleetSnapshot, InductionPlan, SimulationScenario};
use metro_induction::engine::{EngineError, PlanBuilder, SimulationEngine};

fn base_plan(fleet: &FleetSnapshot) -> InductionPlan {
    PlanBuilder::default().generate_plan(&fleet.trains, &fleet.depots, as_of())
}

fn engine() -> SimulationEngine {
    SimulationEngine::new(
        ScoringProfile::default(),
        PlanPolicy::default(),
        CostModel::default(),
    )
}

// ==========================================
// 换车 / 故障
// ==========================================

#[test]
fn test_replacement_removes_target_and_reports_details() {
    let fleet = kmrl_fleet();
    let base = base_plan(&fleet);
    let scenario = SimulationScenario::train_replacement(1, Some(4));

    let result = engine().simulate(&base, &scenario, &fleet, as_of()).unwrap();

    let removed = result
        .changes
        .iter()
        .find(|c| c.train_id == 1)
        .expect("target must appear in changes");
    assert_eq!(removed.change_type, ChangeType::Removed);
    assert!(result.trains_removed >= 1);

    let details = result.replacement_details.expect("replacement details");
    assert_eq!(details.original_train, "KMRL-001");
    assert_eq!(details.replacement_train.as_deref(), Some("KMRL-004"));
}

#[test]
fn test_replacement_inherits_target_slot_and_differs_from_breakdown() {
    let fleet = kmrl_fleet();
    let base = base_plan(&fleet);
    let target_slot = base.candidate(1).unwrap().clone();

    let replaced = engine()
        .simulate(&base, &SimulationScenario::train_replacement(1, Some(4)), &fleet, as_of())
        .unwrap();
    let broken_down = engine()
        .simulate(&base, &SimulationScenario::train_replacement(1, None), &fleet, as_of())
        .unwrap();

    // KMRL-004 接管 KMRL-001 的股道与时段
    let details = replaced.replacement_details.clone().unwrap();
    assert_eq!(details.replacement_slot, Some(target_slot.slot_index));
    assert_eq!(details.replacement_depot_id, Some(target_slot.depot_id));
    assert!(replaced
        .changes
        .iter()
        .any(|c| c.train_id == 4 && c.change_type == ChangeType::Added));

    // 无替补时空出的股道由未排车辆中分数最高的 KMRL-009 递补
    assert!(broken_down.changes.iter().all(|c| c.train_id != 4));
    assert_ne!(replaced.changes, broken_down.changes);
}

#[test]
fn test_replacement_already_scheduled_is_invalid() {
    // KMRL-007 已在基础计划中，不能再作为替补
    let fleet = kmrl_fleet();
    let base = base_plan(&fleet);
    assert!(base.candidate(7).is_some());

    let err = engine()
        .simulate(&base, &SimulationScenario::train_replacement(1, Some(7)), &fleet, as_of())
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidReplacement(_)), "{:?}", err);
}

#[test]
fn test_replacement_in_maintenance_is_invalid() {
    // KMRL-008 处于检修中，不能作为替补
    let fleet = kmrl_fleet();
    let base = base_plan(&fleet);
    let scenario = SimulationScenario::train_replacement(1, Some(8));

    let err = engine().simulate(&base, &scenario, &fleet, as_of()).unwrap_err();
    assert!(matches!(err, EngineError::InvalidReplacement(_)), "{:?}", err);
}

#[test]
fn test_replacement_of_unknown_train_aborts() {
    let fleet = kmrl_fleet();
    let base = base_plan(&fleet);

    let missing_replacement = SimulationScenario::train_replacement(1, Some(404));
    assert!(matches!(
        engine().simulate(&base, &missing_replacement, &fleet, as_of()),
        Err(EngineError::InvalidReplacement(_))
    ));

    let missing_target = SimulationScenario::train_replacement(404, None);
    assert!(matches!(
        engine().simulate(&base, &missing_target, &fleet, as_of()),
        Err(EngineError::Validation { train_id: 404, .. })
    ));
}

#[test]
fn test_breakdown_without_replacement_frees_a_bay() {
    // KMRL-005 故障下线：空出 Pettah 股道，KMRL-002 回到所属车辆段
    let fleet = kmrl_fleet();
    let base = base_plan(&fleet);
    let scenario = SimulationScenario::train_replacement(5, None);

    let result = engine().simulate(&base, &scenario, &fleet, as_of()).unwrap();

    assert_eq!(result.simulation_metrics.scheduled_trains, 8);
    assert_eq!(result.simulation_metrics.unscheduled_trains, 1);
    assert!(result
        .changes
        .iter()
        .any(|c| c.train_id == 2 && c.change_type == ChangeType::DepotChanged));
    assert!(result.simulation_metrics.cross_depot_moves < result.base_metrics.cross_depot_moves);
    assert!(result.replacement_details.unwrap().replacement_train.is_none());
}

// ==========================================
// 权重类场景
// ==========================================

#[test]
fn test_branding_priority_moves_branded_train_forward() {
    let fleet = kmrl_fleet();
    let base = base_plan(&fleet);
    let scenario = SimulationScenario::reweight(ScenarioKind::BrandingPriority);

    let result = engine().simulate(&base, &scenario, &fleet, as_of()).unwrap();

    // KMRL-006 合同剩余 75%，加权后越过 KMRL-010
    let moved = result.changes.iter().find(|c| c.train_id == 6).unwrap();
    assert_eq!(moved.change_type, ChangeType::SlotMoved);
    assert!(moved.to_slot < moved.from_slot);
    assert_eq!(result.impact, ImpactLevel::Moderate);
    assert!(result.score_delta > 0.0);
    assert!(result.average_score_delta > 0.0);
}

#[test]
fn test_shunting_cost_scenario_avoids_cross_depot_moves() {
    let fleet = kmrl_fleet();
    let base = base_plan(&fleet);
    let scenario = SimulationScenario::reweight(ScenarioKind::ShuntingCost);

    let result = engine().simulate(&base, &scenario, &fleet, as_of()).unwrap();

    assert_eq!(result.simulation_metrics.cross_depot_moves, 0);
    assert!(result.base_metrics.cross_depot_moves > 0);
    assert!(result.estimated_cost_delta < 0.0 || result.simulation_metrics.unscheduled_trains > 0);
}

#[test]
fn test_mileage_balancing_keeps_capacity() {
    let fleet = kmrl_fleet();
    let base = base_plan(&fleet);
    let scenario = SimulationScenario::reweight(ScenarioKind::MileageBalancing);

    let result = engine().simulate(&base, &scenario, &fleet, as_of()).unwrap();

    assert_eq!(
        result.simulation_metrics.scheduled_trains,
        result.base_metrics.scheduled_trains
    );
    for (depot_id, assigned) in &result.simulation_metrics.depot_assignments {
        let depot = fleet.depot(*depot_id).unwrap();
        assert!(*assigned as u32 <= depot.total_bays - depot.occupied_bays);
    }
}

// ==========================================
// 影响摘要与幂等性
// ==========================================

#[test]
fn test_metrics_cost_model() {
    let fleet = kmrl_fleet();
    let base = base_plan(&fleet);
    let scenario = SimulationScenario::reweight(ScenarioKind::MileageBalancing);

    let result = engine().simulate(&base, &scenario, &fleet, as_of()).unwrap();

    // 1 次跨段调车 × 2500 + 2 辆未排入 × 10000
    assert_eq!(result.base_metrics.cross_depot_moves, 1);
    assert_eq!(result.base_metrics.unscheduled_trains, 2);
    assert_eq!(result.base_metrics.estimated_cost, 22_500.0);
}

#[test]
fn test_resimulation_is_idempotent() {
    let fleet = kmrl_fleet();
    let base = base_plan(&fleet);

    for scenario in [
        SimulationScenario::train_replacement(3, Some(4)),
        SimulationScenario::reweight(ScenarioKind::BrandingPriority),
        SimulationScenario::reweight(ScenarioKind::ShuntingCost),
    ] {
        let first = engine().simulate(&base, &scenario, &fleet, as_of()).unwrap();
        let second = engine().simulate(&base, &scenario, &fleet, as_of()).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_empty_fleet_aborts() {
    let fleet = FleetSnapshot::new(Vec::new(), kmrl_depots(), as_of());
    let base = InductionPlan::empty(as_of());
    let scenario = SimulationScenario::reweight(ScenarioKind::MileageBalancing);

    assert_eq!(
        engine().simulate(&base, &scenario, &fleet, as_of()),
        Err(EngineError::EmptyFleet)
    );
}
