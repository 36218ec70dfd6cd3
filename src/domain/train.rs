// ==========================================
// 地铁车队入段排程系统 - 车辆领域模型
// ==========================================
// 依据: trains / sensor_data 表
// 红线: 被历史计划引用的车辆只能软退役，不可删除
// ==========================================

use crate::domain::types::{CertificateStatus, TrainStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// BrandingContract - 车身广告合同
// ==========================================
// 不变式: used_hours ≤ contracted_hours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandingContract {
    pub company_name: String,   // 广告主
    pub contracted_hours: i64,  // 合同小时数
    pub used_hours: i64,        // 已投放小时数
}

impl BrandingContract {
    /// 已使用比例（0.0 - 1.0）
    pub fn usage_ratio(&self) -> f64 {
        if self.contracted_hours <= 0 {
            return 1.0;
        }
        (self.used_hours.max(0) as f64 / self.contracted_hours as f64).clamp(0.0, 1.0)
    }

    /// 合同仍有剩余小时数
    pub fn is_active(&self) -> bool {
        self.contracted_hours > 0 && self.used_hours < self.contracted_hours
    }

    /// 校验合同不变式
    pub fn validate(&self) -> Result<(), String> {
        if self.contracted_hours < 0 || self.used_hours < 0 {
            return Err(format!(
                "广告合同小时数不能为负: contracted={}, used={}",
                self.contracted_hours, self.used_hours
            ));
        }
        if self.used_hours > self.contracted_hours {
            return Err(format!(
                "广告合同已用小时数超过合同小时数: used={} > contracted={}",
                self.used_hours, self.contracted_hours
            ));
        }
        Ok(())
    }
}

// ==========================================
// Train - 车辆
// ==========================================
// 用途: 评分引擎输入，入段计划的主体
// 对齐: trains 表 (open_anomaly_count 由 sensor_data 聚合)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Train {
    // ===== 主键 =====
    pub train_id: i64,            // 车辆ID
    pub train_number: String,     // 车号 (如 KMRL-001)

    // ===== 基本信息 =====
    pub model: Option<String>,    // 车型
    pub status: TrainStatus,      // 车辆状态
    pub depot_id: i64,            // 所属车辆段

    // ===== 运行指标 =====
    pub mileage_km: i64,          // 累计里程 (km)
    pub health_score: i32,        // 健康度 (0-100)

    // ===== 检修 =====
    pub last_maintenance: Option<NaiveDate>,
    pub next_maintenance: Option<NaiveDate>,

    // ===== 证书与合同 =====
    pub certificate_status: CertificateStatus,
    pub branding: Option<BrandingContract>,

    // ===== 外部输入 =====
    pub open_anomaly_count: u32,  // 未关闭的传感器异常数

    // ===== 生命周期 =====
    pub retired: bool,            // 软退役标志
}

impl Train {
    /// 是否参与入段计划
    ///
    /// 退役车辆和故障停用车辆不参与排程
    pub fn is_plannable(&self) -> bool {
        !self.retired && self.status != TrainStatus::OutOfOrder
    }

    /// 距下次检修的天数（已逾期为负数，未知为 None）
    pub fn days_until_maintenance(&self, today: NaiveDate) -> Option<i64> {
        self.next_maintenance.map(|d| (d - today).num_days())
    }

    /// 是否处于有效广告合同中
    pub fn has_active_branding(&self) -> bool {
        self.branding.as_ref().map(|b| b.is_active()).unwrap_or(false)
    }
}
