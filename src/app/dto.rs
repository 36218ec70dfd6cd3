//! HTTP 请求/响应 DTO（camelCase JSON）

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::{PlanOutcome, SimulationRequest};
use crate::domain::fleet::{DepotUtilization, FleetOverview};
use crate::domain::induction::{InductionCandidate, PlanSnapshot, RejectedTrain, UnscheduledTrain};
use crate::domain::simulation::{CandidateChange, PlanMetrics, ReplacementDetails, SimulationResult};
use crate::domain::types::{ChangeType, PriorityTier};

// ==========================================
// 计划生成
// ==========================================

/// POST /induction/plan 请求体（可为空）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    #[serde(default)]
    pub generated_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDto {
    pub train_id: i64,
    pub train_number: String,
    pub priority_score: f64,
    pub tier: PriorityTier,
    pub slot: usize,
    /// ISO-8601
    pub scheduled_date: String,
    pub depot_id: i64,
    pub home_depot_id: i64,
    pub cross_depot: bool,
    pub reasoning: String,
}

impl From<&InductionCandidate> for CandidateDto {
    fn from(c: &InductionCandidate) -> Self {
        Self {
            train_id: c.train_id,
            train_number: c.train_number.clone(),
            priority_score: c.priority_score,
            tier: c.tier,
            slot: c.slot_index,
            scheduled_date: c.scheduled_at.to_rfc3339(),
            depot_id: c.depot_id,
            home_depot_id: c.home_depot_id,
            cross_depot: c.is_cross_depot(),
            reasoning: c.reasoning_text(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnscheduledDto {
    pub train_id: i64,
    pub train_number: String,
    pub priority_score: f64,
    pub home_depot_id: i64,
    pub reason: String,
}

impl From<&UnscheduledTrain> for UnscheduledDto {
    fn from(u: &UnscheduledTrain) -> Self {
        Self {
            train_id: u.train_id,
            train_number: u.train_number.clone(),
            priority_score: u.priority_score,
            home_depot_id: u.home_depot_id,
            reason: u.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedDto {
    pub train_id: i64,
    pub train_number: String,
    pub reason: String,
}

impl From<&RejectedTrain> for RejectedDto {
    fn from(r: &RejectedTrain) -> Self {
        Self {
            train_id: r.train_id,
            train_number: r.train_number.clone(),
            reason: r.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub snapshot_id: String,
    pub generated_at: String,
    pub generated_by: String,
    pub status: String,
    pub data: Vec<CandidateDto>,
    pub unscheduled: Vec<UnscheduledDto>,
    pub rejected: Vec<RejectedDto>,
}

impl From<&PlanOutcome> for PlanResponse {
    fn from(outcome: &PlanOutcome) -> Self {
        Self {
            snapshot_id: outcome.snapshot.snapshot_id.clone(),
            generated_at: outcome.snapshot.generated_at.to_rfc3339(),
            generated_by: outcome.snapshot.generated_by.clone(),
            status: outcome.snapshot.status.clone(),
            data: outcome.plan.candidates.iter().map(CandidateDto::from).collect(),
            unscheduled: outcome.plan.unscheduled.iter().map(UnscheduledDto::from).collect(),
            rejected: outcome.plan.rejected.iter().map(RejectedDto::from).collect(),
        }
    }
}

// ==========================================
// 模拟
// ==========================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub scenario_type: String,
    #[serde(default)]
    pub train_id: Option<i64>,
    #[serde(default)]
    pub replacement_train_id: Option<i64>,
    #[serde(default)]
    pub target_train_ids: Vec<i64>,
}

impl From<SimulateRequest> for SimulationRequest {
    fn from(req: SimulateRequest) -> Self {
        Self {
            scenario_type: req.scenario_type,
            train_id: req.train_id,
            replacement_train_id: req.replacement_train_id,
            target_train_ids: req.target_train_ids,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsDto {
    pub scheduled_trains: usize,
    pub unscheduled_trains: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
    pub total_score: f64,
    pub average_score: f64,
    pub cross_depot_moves: usize,
    pub avg_mileage_km: f64,
    pub mileage_std_dev_km: f64,
    pub branded_trains: usize,
    pub estimated_cost: f64,
    pub depot_assignments: BTreeMap<i64, usize>,
}

impl From<&PlanMetrics> for MetricsDto {
    fn from(m: &PlanMetrics) -> Self {
        Self {
            scheduled_trains: m.scheduled_trains,
            unscheduled_trains: m.unscheduled_trains,
            high_priority: m.high_priority,
            medium_priority: m.medium_priority,
            low_priority: m.low_priority,
            total_score: m.total_score,
            average_score: m.average_score,
            cross_depot_moves: m.cross_depot_moves,
            avg_mileage_km: m.avg_mileage_km,
            mileage_std_dev_km: m.mileage_std_dev_km,
            branded_trains: m.branded_trains,
            estimated_cost: m.estimated_cost,
            depot_assignments: m.depot_assignments.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDto {
    pub train_id: i64,
    pub train_number: String,
    pub change_type: ChangeType,
    pub from_slot: Option<usize>,
    pub to_slot: Option<usize>,
    pub from_depot: Option<i64>,
    pub to_depot: Option<i64>,
    pub reason: String,
}

impl From<&CandidateChange> for ChangeDto {
    fn from(c: &CandidateChange) -> Self {
        Self {
            train_id: c.train_id,
            train_number: c.train_number.clone(),
            change_type: c.change_type,
            from_slot: c.from_slot,
            to_slot: c.to_slot,
            from_depot: c.from_depot,
            to_depot: c.to_depot,
            reason: c.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementDto {
    pub original_train: String,
    pub replacement_train: Option<String>,
    pub replacement_depot_id: Option<i64>,
    pub replacement_score: Option<f64>,
    pub replacement_slot: Option<usize>,
}

impl From<&ReplacementDetails> for ReplacementDto {
    fn from(r: &ReplacementDetails) -> Self {
        Self {
            original_train: r.original_train.clone(),
            replacement_train: r.replacement_train.clone(),
            replacement_depot_id: r.replacement_depot_id,
            replacement_score: r.replacement_score,
            replacement_slot: r.replacement_slot,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateResponse {
    pub scenario_type: String,
    pub scenario_title: String,
    pub base_metrics: MetricsDto,
    pub simulation_metrics: MetricsDto,
    pub impact: String,
    pub changes: Vec<ChangeDto>,
    pub trains_added: usize,
    pub trains_removed: usize,
    pub changed_ratio: f64,
    pub score_delta: f64,
    pub average_score_delta: f64,
    pub estimated_cost_delta: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement_details: Option<ReplacementDto>,
}

impl From<&SimulationResult> for SimulateResponse {
    fn from(r: &SimulationResult) -> Self {
        Self {
            scenario_type: r.scenario.kind.as_str().to_string(),
            scenario_title: r.scenario.kind.title_cn().to_string(),
            base_metrics: MetricsDto::from(&r.base_metrics),
            simulation_metrics: MetricsDto::from(&r.simulation_metrics),
            impact: r.impact.to_string(),
            changes: r.changes.iter().map(ChangeDto::from).collect(),
            trains_added: r.trains_added,
            trains_removed: r.trains_removed,
            changed_ratio: r.changed_ratio,
            score_delta: r.score_delta,
            average_score_delta: r.average_score_delta,
            estimated_cost_delta: r.estimated_cost_delta,
            replacement_details: r.replacement_details.as_ref().map(ReplacementDto::from),
        }
    }
}

// ==========================================
// 历史
// ==========================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryDto {
    pub snapshot_id: String,
    pub generated_at: String,
    pub generated_by: String,
    pub trains_scheduled: usize,
    pub unscheduled_count: usize,
    pub high_priority: usize,
    pub avg_score: f64,
    pub status: String,
}

impl From<&PlanSnapshot> for HistoryEntryDto {
    fn from(s: &PlanSnapshot) -> Self {
        Self {
            snapshot_id: s.snapshot_id.clone(),
            generated_at: s.generated_at.to_rfc3339(),
            generated_by: s.generated_by.clone(),
            trains_scheduled: s.trains_scheduled,
            unscheduled_count: s.unscheduled_count,
            high_priority: s.high_priority,
            avg_score: s.avg_score,
            status: s.status.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub entries: Vec<HistoryEntryDto>,
    pub total: usize,
}

// ==========================================
// 驾驶舱
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepotUtilizationDto {
    pub depot_id: i64,
    pub name: String,
    pub total_bays: u32,
    pub occupied_bays: u32,
    pub available_bays: u32,
    pub utilization_pct: f64,
}

impl From<&DepotUtilization> for DepotUtilizationDto {
    fn from(d: &DepotUtilization) -> Self {
        Self {
            depot_id: d.depot_id,
            name: d.name.clone(),
            total_bays: d.total_bays,
            occupied_bays: d.occupied_bays,
            available_bays: d.available_bays,
            utilization_pct: (d.utilization_pct * 10.0).round() / 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_trains: usize,
    pub available_trains: usize,
    pub in_service_trains: usize,
    pub maintenance_trains: usize,
    pub out_of_order_trains: usize,
    pub availability_pct: f64,
    pub total_anomalies: usize,
    pub trains_with_anomalies: usize,
    pub depot_utilization: Vec<DepotUtilizationDto>,
}

impl From<&FleetOverview> for DashboardResponse {
    fn from(o: &FleetOverview) -> Self {
        Self {
            total_trains: o.total_trains,
            available_trains: o.available_trains,
            in_service_trains: o.in_service_trains,
            maintenance_trains: o.maintenance_trains,
            out_of_order_trains: o.out_of_order_trains,
            availability_pct: (o.availability_pct * 10.0).round() / 10.0,
            total_anomalies: o.total_anomalies,
            trains_with_anomalies: o.trains_with_anomalies,
            depot_utilization: o.depot_utilization.iter().map(DepotUtilizationDto::from).collect(),
        }
    }
}

// ==========================================
// 健康检查
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}
