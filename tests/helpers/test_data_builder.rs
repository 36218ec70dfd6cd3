// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use metro_induction::domain::types::{CertificateStatus, TrainStatus};
use metro_induction::domain::{BrandingContract, Depot, FleetSnapshot, Train};

/// 固定计划基准时刻 2024-03-15 06:00 UTC
pub fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 6, 0, 0).unwrap()
}

pub fn today() -> NaiveDate {
    as_of().date_naive()
}

// ==========================================
// Train 构建器
// ==========================================

pub struct TrainBuilder {
    train: Train,
}

impl TrainBuilder {
    pub fn new(train_id: i64) -> Self {
        Self {
            train: Train {
                train_id,
                train_number: format!("KMRL-{:03}", train_id),
                model: Some("Alstom Metropolis".to_string()),
                status: TrainStatus::Available,
                depot_id: 1,
                mileage_km: 20_000,
                health_score: 90,
                last_maintenance: None,
                next_maintenance: Some(today() + Duration::days(20)),
                certificate_status: CertificateStatus::Valid,
                branding: None,
                open_anomaly_count: 0,
                retired: false,
            },
        }
    }

    pub fn depot(mut self, depot_id: i64) -> Self {
        self.train.depot_id = depot_id;
        self
    }

    pub fn mileage(mut self, km: i64) -> Self {
        self.train.mileage_km = km;
        self
    }

    pub fn health(mut self, score: i32) -> Self {
        self.train.health_score = score;
        self
    }

    pub fn status(mut self, status: TrainStatus) -> Self {
        self.train.status = status;
        self
    }

    /// 距下次检修天数（负数为逾期）
    pub fn maintenance_in_days(mut self, days: i64) -> Self {
        self.train.next_maintenance = Some(today() + Duration::days(days));
        self
    }

    pub fn no_maintenance_date(mut self) -> Self {
        self.train.next_maintenance = None;
        self
    }

    pub fn certificate(mut self, status: CertificateStatus) -> Self {
        self.train.certificate_status = status;
        self
    }

    pub fn anomalies(mut self, count: u32) -> Self {
        self.train.open_anomaly_count = count;
        self
    }

    pub fn branding(mut self, contracted_hours: i64, used_hours: i64) -> Self {
        self.train.branding = Some(BrandingContract {
            company_name: "Kerala Tourism".to_string(),
            contracted_hours,
            used_hours,
        });
        self
    }

    pub fn retired(mut self) -> Self {
        self.train.retired = true;
        self
    }

    pub fn build(self) -> Train {
        self.train
    }
}

// ==========================================
// Depot 构建器
// ==========================================

pub struct DepotBuilder {
    depot: Depot,
}

impl DepotBuilder {
    pub fn new(depot_id: i64) -> Self {
        Self {
            depot: Depot {
                depot_id,
                name: format!("Depot {}", depot_id),
                total_bays: 10,
                occupied_bays: 0,
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.depot.name = name.to_string();
        self
    }

    pub fn bays(mut self, total: u32, occupied: u32) -> Self {
        self.depot.total_bays = total;
        self.depot.occupied_bays = occupied;
        self
    }

    pub fn build(self) -> Depot {
        self.depot
    }
}

// ==========================================
// 预置车队
// ==========================================

/// 三个车辆段（Aluva 3 空位 / Pettah 2 空位 / Kalamassery 3 空位）
pub fn kmrl_depots() -> Vec<Depot> {
    vec![
        DepotBuilder::new(1).name("Aluva Depot").bays(15, 12).build(),
        DepotBuilder::new(2).name("Pettah Depot").bays(10, 8).build(),
        DepotBuilder::new(3).name("Kalamassery Depot").bays(12, 9).build(),
    ]
}

/// 十辆车，分数分布覆盖 High/Medium/Low
///
/// 默认参数下排序: 5, 8, 3, 1, 7, 10, 6, 2, 9, 4
/// 可用股道共 8 个：KMRL-002 跨段调往 Kalamassery，KMRL-009 / KMRL-004 未排入
pub fn kmrl_trains() -> Vec<Train> {
    vec![
        TrainBuilder::new(1).depot(1).mileage(45_000).health(85).maintenance_in_days(-2).build(),
        TrainBuilder::new(2)
            .depot(2)
            .status(TrainStatus::InService)
            .mileage(32_000)
            .health(92)
            .maintenance_in_days(12)
            .build(),
        TrainBuilder::new(3).depot(3).mileage(48_000).health(78).maintenance_in_days(1).anomalies(1).build(),
        TrainBuilder::new(4).depot(1).mileage(28_000).health(95).maintenance_in_days(25).build(),
        TrainBuilder::new(5)
            .depot(2)
            .mileage(49_500)
            .health(66)
            .maintenance_in_days(0)
            .certificate(CertificateStatus::Expired)
            .anomalies(3)
            .build(),
        TrainBuilder::new(6).depot(3).mileage(35_000).health(89).maintenance_in_days(9).branding(2400, 600).build(),
        TrainBuilder::new(7).depot(1).mileage(41_000).health(82).maintenance_in_days(4).build(),
        TrainBuilder::new(8)
            .depot(2)
            .status(TrainStatus::Maintenance)
            .mileage(47_000)
            .health(72)
            .maintenance_in_days(2)
            .certificate(CertificateStatus::UnderReview)
            .build(),
        TrainBuilder::new(9).depot(3).mileage(30_000).health(92).maintenance_in_days(30).branding(2400, 2000).build(),
        TrainBuilder::new(10).depot(1).mileage(38_000).health(87).maintenance_in_days(6).build(),
    ]
}

pub fn kmrl_fleet() -> FleetSnapshot {
    FleetSnapshot::new(kmrl_trains(), kmrl_depots(), as_of())
}
