// ==========================================
// 地铁车队入段排程系统 - 车辆台账兜底装饰器
// ==========================================
// 职责: 主台账读取失败时返回最近一次成功的快照
// 红线: 兜底只在引擎外部发生；从未成功过则原样返回错误
// ==========================================

use crate::domain::depot::Depot;
use crate::domain::fleet::FleetSnapshot;
use crate::domain::train::Train;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::train_registry::TrainRegistry;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tracing::warn;

#[derive(Default)]
struct LastGood {
    trains: Option<Vec<Train>>,
    depots: Option<Vec<Depot>>,
}

// ==========================================
// FallbackTrainRegistry
// ==========================================
pub struct FallbackTrainRegistry {
    primary: Arc<dyn TrainRegistry>,
    last_good: Mutex<LastGood>,
}

impl FallbackTrainRegistry {
    pub fn new(primary: Arc<dyn TrainRegistry>) -> Self {
        Self {
            primary,
            last_good: Mutex::new(LastGood::default()),
        }
    }

    fn cache(&self) -> RepositoryResult<std::sync::MutexGuard<'_, LastGood>> {
        self.last_good
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl TrainRegistry for FallbackTrainRegistry {
    fn list_trains(&self) -> RepositoryResult<Vec<Train>> {
        match self.primary.list_trains() {
            Ok(trains) => {
                self.cache()?.trains = Some(trains.clone());
                Ok(trains)
            }
            Err(err) => match self.cache()?.trains.clone() {
                Some(cached) => {
                    warn!(error = %err, cached = cached.len(), "车辆台账读取失败，使用上次成功的车辆快照");
                    Ok(cached)
                }
                None => Err(err),
            },
        }
    }

    fn list_depots(&self) -> RepositoryResult<Vec<Depot>> {
        match self.primary.list_depots() {
            Ok(depots) => {
                self.cache()?.depots = Some(depots.clone());
                Ok(depots)
            }
            Err(err) => match self.cache()?.depots.clone() {
                Some(cached) => {
                    warn!(error = %err, cached = cached.len(), "车辆段读取失败，使用上次成功的车辆段快照");
                    Ok(cached)
                }
                None => Err(err),
            },
        }
    }

    /// 整体读取主台账快照；失败时车辆与车辆段都取上次成功的值
    fn fleet_snapshot(&self) -> RepositoryResult<FleetSnapshot> {
        match self.primary.fleet_snapshot() {
            Ok(fleet) => {
                let mut cache = self.cache()?;
                cache.trains = Some(fleet.trains.clone());
                cache.depots = Some(fleet.depots.clone());
                Ok(fleet)
            }
            Err(err) => {
                let cache = self.cache()?;
                match (cache.trains.clone(), cache.depots.clone()) {
                    (Some(trains), Some(depots)) => {
                        warn!(error = %err, cached = trains.len(), "车辆台账读取失败，使用上次成功的车队快照");
                        Ok(FleetSnapshot::new(trains, depots, Utc::now()))
                    }
                    _ => Err(err),
                }
            }
        }
    }
}
