// ==========================================
// 地铁车队入段排程系统 - 车辆段领域模型
// ==========================================
// 依据: depots 表 (capacity / current_occupancy)
// 红线: 任一时刻分配到车辆段的车辆数 ≤ 股道总数
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Depot - 车辆段
// ==========================================
// 不变式: 0 ≤ occupied_bays ≤ total_bays, total_bays > 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    pub depot_id: i64,        // 车辆段ID
    pub name: String,         // 名称 (如 Aluva Depot)
    pub total_bays: u32,      // 检修股道总数
    pub occupied_bays: u32,   // 当前已占用股道
}

impl Depot {
    /// 校验车辆段不变式
    pub fn validate(&self) -> Result<(), String> {
        if self.total_bays == 0 {
            return Err(format!("车辆段{}股道总数必须为正", self.depot_id));
        }
        if self.occupied_bays > self.total_bays {
            return Err(format!(
                "车辆段{}占用股道超过总数: {} > {}",
                self.depot_id, self.occupied_bays, self.total_bays
            ));
        }
        Ok(())
    }
}

// ==========================================
// Trait: BayCapacity
// ==========================================
// 用途: 车辆段容量查询接口
pub trait BayCapacity {
    /// 剩余可用股道
    fn available_bays(&self) -> u32;

    /// 利用率（0.0 - 1.0）
    fn utilization(&self) -> f64;

    /// 是否已满
    fn is_full(&self) -> bool {
        self.available_bays() == 0
    }
}

impl BayCapacity for Depot {
    fn available_bays(&self) -> u32 {
        self.total_bays.saturating_sub(self.occupied_bays)
    }

    fn utilization(&self) -> f64 {
        if self.total_bays == 0 {
            return 1.0;
        }
        (self.occupied_bays as f64 / self.total_bays as f64).min(1.0)
    }
}
