// ==========================================
// 地铁车队入段排程系统 - 开发库种子数据
// ==========================================
// 用法: seed_fleet_db [db_path]
// 说明: 旧库先备份再重建；检修日期相对今天生成，便于随时演示
// ==========================================

use chrono::{Duration, Local, Utc};
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use metro_induction::db::{ensure_schema, get_default_db_path, open_sqlite_connection};
use metro_induction::domain::{BrandingContract, Depot, Train};
use metro_induction::domain::types::{CertificateStatus, TrainStatus};
use metro_induction::repository::{SqliteTrainRegistry, TrainRegistry};

/// (depot_id, name, location, total_bays, occupied_bays)
const DEPOTS: [(i64, &str, &str, u32, u32); 3] = [
    (1, "Aluva Depot", "Aluva", 15, 12),
    (2, "Pettah Depot", "Pettah", 10, 8),
    (3, "Kalamassery Depot", "Kalamassery", 12, 9),
];

/// (status, depot_id, mileage_km, health_score, 距上次检修天数, 传感器状态)
const TRAINS: [(&str, i64, i64, i32, i64, &str); 20] = [
    ("Available", 1, 45000, 86, 31, "Normal"),
    ("In Service", 2, 32000, 92, 33, "Normal"),
    ("Maintenance", 3, 48000, 78, 29, "Warning"),
    ("Available", 1, 28000, 95, 32, "Normal"),
    ("Maintenance", 2, 49500, 66, 26, "Critical"),
    ("In Service", 3, 35000, 89, 34, "Normal"),
    ("Available", 1, 41000, 82, 30, "Normal"),
    ("Maintenance", 2, 47000, 72, 27, "Warning"),
    ("In Service", 3, 30000, 92, 35, "Normal"),
    ("Available", 1, 38000, 87, 28, "Normal"),
    ("In Service", 2, 33000, 89, 36, "Normal"),
    ("Available", 3, 44000, 80, 25, "Normal"),
    ("Maintenance", 1, 49800, 68, 24, "Critical"),
    ("In Service", 2, 36000, 88, 37, "Normal"),
    ("Available", 3, 29000, 94, 23, "Normal"),
    ("Available", 1, 42000, 81, 38, "Normal"),
    ("In Service", 2, 37000, 86, 22, "Normal"),
    ("Available", 3, 31000, 90, 39, "Normal"),
    ("Maintenance", 1, 46000, 76, 21, "Warning"),
    ("Available", 2, 34000, 88, 40, "Normal"),
];

const MAINTENANCE_INTERVAL_DAYS: i64 = 30;
const BRANDING_CONTRACT_HOURS: i64 = 2400;
const BRANDING_COMPANIES: [&str; 3] = ["Kerala Tourism", "Lulu Mall", "Federal Bank"];

fn main() -> Result<(), Box<dyn Error>> {
    metro_induction::logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);

    backup_and_reset_db(&db_path)?;

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;
    let registry = SqliteTrainRegistry::from_connection(Arc::new(Mutex::new(conn)));

    for (depot_id, name, location, total_bays, occupied_bays) in DEPOTS {
        let depot = Depot {
            depot_id,
            name: name.to_string(),
            total_bays,
            occupied_bays,
        };
        registry.upsert_depot(&depot, Some(location))?;
    }

    let today = Local::now().date_naive();
    let now = Utc::now();

    for (idx, (status, depot_id, mileage_km, health_score, since_last, sensor)) in
        TRAINS.iter().enumerate()
    {
        let train_id = idx as i64 + 1;
        let last_maintenance = today - Duration::days(*since_last);

        let branding = (train_id % 3 == 0).then(|| BrandingContract {
            company_name: BRANDING_COMPANIES[(train_id as usize / 3) % BRANDING_COMPANIES.len()]
                .to_string(),
            contracted_hours: BRANDING_CONTRACT_HOURS,
            used_hours: (mileage_km / 20).min(BRANDING_CONTRACT_HOURS),
        });

        let certificate_status = match train_id {
            5 | 13 => CertificateStatus::Expired,
            8 => CertificateStatus::UnderReview,
            _ => CertificateStatus::Valid,
        };

        let train = Train {
            train_id,
            train_number: format!("KMRL-{:03}", train_id),
            model: Some("Alstom Metropolis".to_string()),
            status: status.parse::<TrainStatus>()?,
            depot_id: *depot_id,
            mileage_km: *mileage_km,
            health_score: *health_score,
            last_maintenance: Some(last_maintenance),
            next_maintenance: Some(last_maintenance + Duration::days(MAINTENANCE_INTERVAL_DAYS)),
            certificate_status,
            branding,
            open_anomaly_count: 0,
            retired: false,
        };
        registry.upsert_train(&train)?;

        let anomalies = match *sensor {
            "Critical" => 3,
            "Warning" => 1,
            _ => 0,
        };
        for n in 0..anomalies {
            let recorded_at = now - Duration::hours(6 * (n + 1));
            registry.record_sensor_reading(
                train_id,
                "brake_temperature",
                96.5 + n as f64,
                recorded_at,
                true,
            )?;
        }
        registry.record_sensor_reading(train_id, "vibration", 0.42, now, false)?;
    }

    let fleet = registry.fleet_snapshot()?;
    let overview = fleet.overview();
    eprintln!(
        "Seeded {}: trains={} available={} anomalies={} depots={}",
        db_path,
        overview.total_trains,
        overview.available_trains,
        overview.total_anomalies,
        overview.depot_utilization.len()
    );

    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}
