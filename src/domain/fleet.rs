// ==========================================
// 地铁车队入段排程系统 - 车队快照与概览
// ==========================================
// 职责: 单次调用内使用的车队/车辆段快照，驾驶舱概览
// ==========================================

use crate::domain::depot::{BayCapacity, Depot};
use crate::domain::train::Train;
use crate::domain::types::TrainStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 车队快照
///
/// 每次排程/模拟在调用开始时从车辆台账读取一次，计算期间不再变化
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub trains: Vec<Train>,
    pub depots: Vec<Depot>,
    pub fetched_at: DateTime<Utc>,
}

impl FleetSnapshot {
    pub fn new(trains: Vec<Train>, depots: Vec<Depot>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            trains,
            depots,
            fetched_at,
        }
    }

    pub fn train(&self, train_id: i64) -> Option<&Train> {
        self.trains.iter().find(|t| t.train_id == train_id)
    }

    pub fn depot(&self, depot_id: i64) -> Option<&Depot> {
        self.depots.iter().find(|d| d.depot_id == depot_id)
    }

    /// 可参与排程的车辆数
    pub fn plannable_count(&self) -> usize {
        self.trains.iter().filter(|t| t.is_plannable()).count()
    }

    /// 生成驾驶舱概览
    pub fn overview(&self) -> FleetOverview {
        let active: Vec<&Train> = self.trains.iter().filter(|t| !t.retired).collect();
        let count = |status: TrainStatus| active.iter().filter(|t| t.status == status).count();

        let total_trains = active.len();
        let available_trains = count(TrainStatus::Available);
        let availability_pct = if total_trains > 0 {
            available_trains as f64 * 100.0 / total_trains as f64
        } else {
            0.0
        };

        let depot_utilization = self
            .depots
            .iter()
            .map(|d| DepotUtilization {
                depot_id: d.depot_id,
                name: d.name.clone(),
                total_bays: d.total_bays,
                occupied_bays: d.occupied_bays,
                available_bays: d.available_bays(),
                utilization_pct: d.utilization() * 100.0,
            })
            .collect();

        FleetOverview {
            total_trains,
            available_trains,
            in_service_trains: count(TrainStatus::InService),
            maintenance_trains: count(TrainStatus::Maintenance),
            out_of_order_trains: count(TrainStatus::OutOfOrder),
            availability_pct,
            total_anomalies: active.iter().map(|t| t.open_anomaly_count as usize).sum(),
            trains_with_anomalies: active.iter().filter(|t| t.open_anomaly_count > 0).count(),
            depot_utilization,
        }
    }
}

/// 驾驶舱车队概览
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetOverview {
    // ===== 车队指标 =====
    pub total_trains: usize,
    pub available_trains: usize,
    pub in_service_trains: usize,
    pub maintenance_trains: usize,
    pub out_of_order_trains: usize,
    pub availability_pct: f64,

    // ===== 异常指标 =====
    pub total_anomalies: usize,
    pub trains_with_anomalies: usize,

    // ===== 车辆段利用率 =====
    pub depot_utilization: Vec<DepotUtilization>,
}

/// 单个车辆段利用率
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepotUtilization {
    pub depot_id: i64,
    pub name: String,
    pub total_bays: u32,
    pub occupied_bays: u32,
    pub available_bays: u32,
    pub utilization_pct: f64,
}
