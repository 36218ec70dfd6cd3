// ==========================================
// 地铁车队入段排程系统 - 车辆台账 Trait
// ==========================================
// 职责: 定义车辆/车辆段只读快照接口（不包含业务逻辑）
// 红线: 台账只提供数据，评分与排程在引擎层完成
// ==========================================

use crate::domain::depot::Depot;
use crate::domain::fleet::FleetSnapshot;
use crate::domain::train::Train;
use crate::repository::error::RepositoryResult;
use chrono::Utc;

// ==========================================
// TrainRegistry Trait
// ==========================================
// 用途: 计划生成与模拟的数据来源
// 实现者: SqliteTrainRegistry / FallbackTrainRegistry
// 调用方: 服务层在 spawn_blocking 中调用（同步接口）
pub trait TrainRegistry: Send + Sync {
    /// 全部车辆（含退役车辆，open_anomaly_count 已聚合）
    fn list_trains(&self) -> RepositoryResult<Vec<Train>>;

    /// 全部车辆段
    fn list_depots(&self) -> RepositoryResult<Vec<Depot>>;

    /// 读取一致的车队快照
    fn fleet_snapshot(&self) -> RepositoryResult<FleetSnapshot> {
        let trains = self.list_trains()?;
        let depots = self.list_depots()?;
        Ok(FleetSnapshot::new(trains, depots, Utc::now()))
    }
}
