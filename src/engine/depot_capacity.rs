// ==========================================
// 地铁车队入段排程系统 - 车辆段容量模型
// ==========================================
// 职责: 维护单次计划生成期间的股道占用计数
// 红线: 任一车辆段 occupied + reserved ≤ total，预留全有或全无
// ==========================================
// 生命周期: 每次计划生成复制一份计数，不与其他请求共享
// ==========================================

use crate::domain::depot::{BayCapacity, Depot};
use crate::engine::error::{EngineError, EngineResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct DepotCounter {
    total_bays: u32,
    occupied_bays: u32,
    reserved_bays: u32,
}

impl BayCapacity for DepotCounter {
    fn available_bays(&self) -> u32 {
        self.total_bays
            .saturating_sub(self.occupied_bays)
            .saturating_sub(self.reserved_bays)
    }

    fn utilization(&self) -> f64 {
        if self.total_bays == 0 {
            return 1.0;
        }
        ((self.occupied_bays + self.reserved_bays) as f64 / self.total_bays as f64).min(1.0)
    }
}

// ==========================================
// DepotCapacityModel - 车辆段容量模型
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct DepotCapacityModel {
    counters: BTreeMap<i64, DepotCounter>,
}

impl DepotCapacityModel {
    /// 由车辆段快照构建（复制计数）
    pub fn from_depots(depots: &[Depot]) -> Self {
        let counters = depots
            .iter()
            .map(|d| {
                (
                    d.depot_id,
                    DepotCounter {
                        total_bays: d.total_bays,
                        // 脏数据按已满处理
                        occupied_bays: d.occupied_bays.min(d.total_bays),
                        reserved_bays: 0,
                    },
                )
            })
            .collect();
        Self { counters }
    }

    /// 剩余可用股道（未知车辆段为 0）
    pub fn available_bays(&self, depot_id: i64) -> u32 {
        self.counters
            .get(&depot_id)
            .map(|c| c.available_bays())
            .unwrap_or(0)
    }

    /// 预留股道
    ///
    /// # 错误
    /// - DepotNotFound: 车辆段不存在
    /// - CapacityExceeded: 可用股道不足（不做部分预留）
    pub fn reserve(&mut self, depot_id: i64, count: u32) -> EngineResult<()> {
        let counter = self
            .counters
            .get_mut(&depot_id)
            .ok_or(EngineError::DepotNotFound(depot_id))?;

        let available = counter.available_bays();
        if count > available {
            return Err(EngineError::CapacityExceeded {
                depot_id,
                requested: count,
                available,
            });
        }

        counter.reserved_bays += count;
        Ok(())
    }

    /// 兜底车辆段：可用股道最多者（同数取 ID 小者），排除 exclude，无可用返回 None
    pub fn best_fallback(&self, exclude: i64) -> Option<i64> {
        self.counters
            .iter()
            .filter(|(id, c)| **id != exclude && c.available_bays() > 0)
            // 同可用数时 Reverse(id) 使 ID 小者胜出
            .max_by_key(|(id, c)| (c.available_bays(), std::cmp::Reverse(**id)))
            .map(|(id, _)| *id)
    }

    /// 利用率（含本次预留），未知车辆段为 None
    pub fn utilization(&self, depot_id: i64) -> Option<f64> {
        self.counters.get(&depot_id).map(|c| c.utilization())
    }

    /// 本次计划已分配车辆数
    pub fn assigned(&self, depot_id: i64) -> u32 {
        self.counters
            .get(&depot_id)
            .map(|c| c.reserved_bays)
            .unwrap_or(0)
    }

    /// 全部车辆段剩余可用股道
    pub fn total_available(&self) -> u32 {
        self.counters.values().map(|c| c.available_bays()).sum()
    }

    pub fn depot_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.counters.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_depot(depot_id: i64, total: u32, occupied: u32) -> Depot {
        Depot {
            depot_id,
            name: format!("Depot {}", depot_id),
            total_bays: total,
            occupied_bays: occupied,
        }
    }

    #[test]
    fn test_full_depot_rejects_reservation() {
        let mut model = DepotCapacityModel::from_depots(&[create_test_depot(1, 10, 10)]);

        let err = model.reserve(1, 1).unwrap_err();
        assert_eq!(
            err,
            EngineError::CapacityExceeded {
                depot_id: 1,
                requested: 1,
                available: 0
            }
        );
        assert_eq!(model.assigned(1), 0);
    }

    #[test]
    fn test_reserve_is_all_or_nothing() {
        let mut model = DepotCapacityModel::from_depots(&[create_test_depot(1, 10, 7)]);

        assert!(model.reserve(1, 4).is_err());
        assert_eq!(model.available_bays(1), 3);

        model.reserve(1, 3).unwrap();
        assert_eq!(model.available_bays(1), 0);
        assert_eq!(model.assigned(1), 3);
        assert_eq!(model.utilization(1), Some(1.0));
    }

    #[test]
    fn test_unknown_depot() {
        let mut model = DepotCapacityModel::from_depots(&[create_test_depot(1, 5, 0)]);
        assert_eq!(model.available_bays(99), 0);
        assert_eq!(model.reserve(99, 1), Err(EngineError::DepotNotFound(99)));
        assert_eq!(model.utilization(99), None);
    }

    #[test]
    fn test_best_fallback_prefers_most_available_then_lower_id() {
        let model = DepotCapacityModel::from_depots(&[
            create_test_depot(1, 10, 10),
            create_test_depot(2, 10, 6),
            create_test_depot(3, 12, 8),
            create_test_depot(4, 8, 7),
        ]);

        // 2 与 3 均剩 4 个股道，取 ID 小者
        assert_eq!(model.best_fallback(1), Some(2));
        assert_eq!(model.best_fallback(2), Some(3));
    }

    #[test]
    fn test_best_fallback_none_when_all_full() {
        let model = DepotCapacityModel::from_depots(&[
            create_test_depot(1, 4, 4),
            create_test_depot(2, 3, 3),
        ]);
        assert_eq!(model.best_fallback(1), None);
        assert_eq!(model.total_available(), 0);
    }

    #[test]
    fn test_model_copies_counters() {
        let depots = vec![create_test_depot(1, 5, 2)];
        let mut first = DepotCapacityModel::from_depots(&depots);
        first.reserve(1, 3).unwrap();

        let second = DepotCapacityModel::from_depots(&depots);
        assert_eq!(second.available_bays(1), 3);
        assert_eq!(depots[0].occupied_bays, 2);
    }
}
