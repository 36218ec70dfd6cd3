// ==========================================
// 地铁车队入段排程系统 - 车辆台账 SQLite 实现
// ==========================================
// 职责: trains / depots / sensor_data 表的数据访问
// 红线: Repository 不含业务规则，只做数据 CRUD；车辆只软退役不删除
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::depot::Depot;
use crate::domain::fleet::FleetSnapshot;
use crate::domain::train::{BrandingContract, Train};
use crate::domain::types::{CertificateStatus, TrainStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::train_registry::TrainRegistry;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};
use tracing::warn;

const SELECT_TRAINS_SQL: &str = r#"
    SELECT
        t.train_id, t.train_number, t.model, t.status, t.depot_id,
        t.mileage_km, t.health_score, t.last_maintenance, t.next_maintenance,
        t.certificate_status, t.branding_company, t.branding_contracted_hours,
        t.branding_used_hours, t.retired,
        COALESCE(a.open_anomalies, 0) AS open_anomalies
    FROM trains t
    LEFT JOIN (
        SELECT train_id, COUNT(*) AS open_anomalies
        FROM sensor_data
        WHERE is_anomaly = 1 AND resolved = 0
        GROUP BY train_id
    ) a ON a.train_id = t.train_id
"#;

/// trains 表原始行（状态字段尚未解析）
struct TrainRow {
    train_id: i64,
    train_number: String,
    model: Option<String>,
    status: String,
    depot_id: i64,
    mileage_km: i64,
    health_score: i32,
    last_maintenance: Option<NaiveDate>,
    next_maintenance: Option<NaiveDate>,
    certificate_status: String,
    branding_company: Option<String>,
    branding_contracted_hours: Option<i64>,
    branding_used_hours: Option<i64>,
    retired: bool,
    open_anomalies: i64,
}

impl TrainRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            train_id: row.get(0)?,
            train_number: row.get(1)?,
            model: row.get(2)?,
            status: row.get(3)?,
            depot_id: row.get(4)?,
            mileage_km: row.get(5)?,
            health_score: row.get(6)?,
            last_maintenance: row.get(7)?,
            next_maintenance: row.get(8)?,
            certificate_status: row.get(9)?,
            branding_company: row.get(10)?,
            branding_contracted_hours: row.get(11)?,
            branding_used_hours: row.get(12)?,
            retired: row.get(13)?,
            open_anomalies: row.get(14)?,
        })
    }

    fn into_train(self) -> RepositoryResult<Train> {
        let status = self
            .status
            .parse::<TrainStatus>()
            .map_err(|message| RepositoryError::FieldValueError {
                field: "trains.status".to_string(),
                message,
            })?;
        let certificate_status = self
            .certificate_status
            .parse::<CertificateStatus>()
            .map_err(|message| RepositoryError::FieldValueError {
                field: "trains.certificate_status".to_string(),
                message,
            })?;

        let branding = self.branding_company.map(|company_name| BrandingContract {
            company_name,
            contracted_hours: self.branding_contracted_hours.unwrap_or(0),
            used_hours: self.branding_used_hours.unwrap_or(0),
        });

        Ok(Train {
            train_id: self.train_id,
            train_number: self.train_number,
            model: self.model,
            status,
            depot_id: self.depot_id,
            mileage_km: self.mileage_km,
            health_score: self.health_score,
            last_maintenance: self.last_maintenance,
            next_maintenance: self.next_maintenance,
            certificate_status,
            branding,
            open_anomaly_count: u32::try_from(self.open_anomalies).unwrap_or(u32::MAX),
            retired: self.retired,
        })
    }
}

// ==========================================
// SqliteTrainRegistry - 车辆台账
// ==========================================
pub struct SqliteTrainRegistry {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTrainRegistry {
    /// 创建新的 SqliteTrainRegistry 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== 车辆段 =====

    /// 插入或更新车辆段
    pub fn upsert_depot(&self, depot: &Depot, location: Option<&str>) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO depots (depot_id, name, location, total_bays, occupied_bays)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(depot_id) DO UPDATE SET
                name = excluded.name,
                location = excluded.location,
                total_bays = excluded.total_bays,
                occupied_bays = excluded.occupied_bays
            "#,
            params![
                depot.depot_id,
                depot.name,
                location,
                depot.total_bays,
                depot.occupied_bays
            ],
        )?;
        Ok(())
    }

    // ===== 车辆 =====

    /// 插入或更新车辆（open_anomaly_count 由 sensor_data 聚合，不写入）
    pub fn upsert_train(&self, train: &Train) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let (company, contracted, used) = match &train.branding {
            Some(b) => (
                Some(b.company_name.as_str()),
                Some(b.contracted_hours),
                Some(b.used_hours),
            ),
            None => (None, None, None),
        };

        conn.execute(
            r#"
            INSERT INTO trains (
                train_id, train_number, model, status, depot_id,
                mileage_km, health_score, last_maintenance, next_maintenance,
                certificate_status, branding_company, branding_contracted_hours,
                branding_used_hours, retired, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, datetime('now'))
            ON CONFLICT(train_id) DO UPDATE SET
                train_number = excluded.train_number,
                model = excluded.model,
                status = excluded.status,
                depot_id = excluded.depot_id,
                mileage_km = excluded.mileage_km,
                health_score = excluded.health_score,
                last_maintenance = excluded.last_maintenance,
                next_maintenance = excluded.next_maintenance,
                certificate_status = excluded.certificate_status,
                branding_company = excluded.branding_company,
                branding_contracted_hours = excluded.branding_contracted_hours,
                branding_used_hours = excluded.branding_used_hours,
                retired = excluded.retired,
                updated_at = excluded.updated_at
            "#,
            params![
                train.train_id,
                train.train_number,
                train.model,
                train.status.to_string(),
                train.depot_id,
                train.mileage_km,
                train.health_score,
                train.last_maintenance,
                train.next_maintenance,
                train.certificate_status.to_string(),
                company,
                contracted,
                used,
                train.retired,
            ],
        )?;
        Ok(())
    }

    /// 按 ID 查询车辆
    pub fn find_train(&self, train_id: i64) -> RepositoryResult<Option<Train>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE t.train_id = ?1", SELECT_TRAINS_SQL);
        let row = conn
            .query_row(&sql, params![train_id], TrainRow::from_row)
            .optional()?;
        row.map(TrainRow::into_train).transpose()
    }

    /// 软退役（被历史计划引用的车辆不可删除）
    pub fn retire_train(&self, train_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE trains SET retired = 1, updated_at = datetime('now') WHERE train_id = ?1",
            params![train_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Train".to_string(),
                id: train_id.to_string(),
            });
        }
        Ok(())
    }

    // ===== 传感器 =====

    /// 记录传感器读数
    ///
    /// # 返回
    /// - Ok(i64): reading_id
    pub fn record_sensor_reading(
        &self,
        train_id: i64,
        sensor_type: &str,
        value: f64,
        recorded_at: DateTime<Utc>,
        is_anomaly: bool,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO sensor_data (train_id, sensor_type, value, recorded_at, is_anomaly)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![train_id, sensor_type, value, recorded_at.to_rfc3339(), is_anomaly],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 关闭车辆的全部未关闭异常
    ///
    /// # 返回
    /// - Ok(usize): 关闭的异常数
    pub fn resolve_anomalies(&self, train_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE sensor_data SET resolved = 1 WHERE train_id = ?1 AND is_anomaly = 1 AND resolved = 0",
            params![train_id],
        )?;
        Ok(affected)
    }
}

/// 读取全部车辆；单行解析失败只跳过该行
fn query_trains(conn: &Connection) -> RepositoryResult<Vec<Train>> {
    let sql = format!("{} ORDER BY t.train_id", SELECT_TRAINS_SQL);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], TrainRow::from_row)?;

    let mut trains = Vec::new();
    let mut skipped = 0usize;
    for row in rows {
        let parsed = match row {
            Ok(raw) => {
                let train_id = raw.train_id;
                raw.into_train().map_err(|err| (Some(train_id), err))
            }
            Err(
                err @ (rusqlite::Error::InvalidColumnType(..)
                | rusqlite::Error::FromSqlConversionFailure(..)
                | rusqlite::Error::IntegralValueOutOfRange(..)),
            ) => Err((None, RepositoryError::from(err))),
            Err(err) => return Err(err.into()),
        };

        match parsed {
            Ok(train) => trains.push(train),
            Err((train_id, err)) => {
                skipped += 1;
                warn!(train_id = ?train_id, error = %err, "车辆记录无法解析，已跳过");
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, loaded = trains.len(), "车辆台账存在无法解析的记录");
    }
    Ok(trains)
}

fn query_depots(conn: &Connection) -> RepositoryResult<Vec<Depot>> {
    let mut stmt = conn.prepare(
        "SELECT depot_id, name, total_bays, occupied_bays FROM depots ORDER BY depot_id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Depot {
            depot_id: row.get(0)?,
            name: row.get(1)?,
            total_bays: row.get(2)?,
            occupied_bays: row.get(3)?,
        })
    })?;

    let mut depots = Vec::new();
    for row in rows {
        depots.push(row?);
    }
    Ok(depots)
}

impl TrainRegistry for SqliteTrainRegistry {
    fn list_trains(&self) -> RepositoryResult<Vec<Train>> {
        let conn = self.get_conn()?;
        query_trains(&conn)
    }

    fn list_depots(&self) -> RepositoryResult<Vec<Depot>> {
        let conn = self.get_conn()?;
        query_depots(&conn)
    }

    /// 车辆与车辆段在同一把锁、同一个读事务内读取
    fn fleet_snapshot(&self) -> RepositoryResult<FleetSnapshot> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let trains = query_trains(&tx)?;
        let depots = query_depots(&tx)?;
        tx.commit()?;
        Ok(FleetSnapshot::new(trains, depots, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    fn create_test_registry() -> SqliteTrainRegistry {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        SqliteTrainRegistry::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn create_test_depot(depot_id: i64) -> Depot {
        Depot {
            depot_id,
            name: format!("Depot {}", depot_id),
            total_bays: 8,
            occupied_bays: 3,
        }
    }

    fn create_test_train(train_id: i64) -> Train {
        Train {
            train_id,
            train_number: format!("KMRL-{:03}", train_id),
            model: Some("Alstom Metropolis".to_string()),
            status: TrainStatus::InService,
            depot_id: 1,
            mileage_km: 32_000,
            health_score: 88,
            last_maintenance: NaiveDate::from_ymd_opt(2024, 1, 10),
            next_maintenance: NaiveDate::from_ymd_opt(2024, 4, 10),
            certificate_status: CertificateStatus::UnderReview,
            branding: Some(BrandingContract {
                company_name: "Kerala Tourism".to_string(),
                contracted_hours: 2400,
                used_hours: 1600,
            }),
            open_anomaly_count: 0,
            retired: false,
        }
    }

    #[test]
    fn test_upsert_and_list_round_trip() {
        let registry = create_test_registry();
        registry.upsert_depot(&create_test_depot(1), Some("Aluva")).unwrap();
        registry.upsert_train(&create_test_train(1)).unwrap();

        let trains = registry.list_trains().unwrap();
        assert_eq!(trains.len(), 1);
        let train = &trains[0];
        assert_eq!(train.status, TrainStatus::InService);
        assert_eq!(train.certificate_status, CertificateStatus::UnderReview);
        assert_eq!(train.next_maintenance, NaiveDate::from_ymd_opt(2024, 4, 10));
        assert_eq!(train.branding.as_ref().unwrap().used_hours, 1600);

        let depots = registry.list_depots().unwrap();
        assert_eq!(depots, vec![create_test_depot(1)]);
    }

    #[test]
    fn test_open_anomalies_are_aggregated() {
        let registry = create_test_registry();
        registry.upsert_depot(&create_test_depot(1), None).unwrap();
        registry.upsert_train(&create_test_train(1)).unwrap();

        let now = Utc::now();
        registry.record_sensor_reading(1, "brake_temp", 98.5, now, true).unwrap();
        registry.record_sensor_reading(1, "brake_temp", 97.0, now, true).unwrap();
        registry.record_sensor_reading(1, "vibration", 0.2, now, false).unwrap();

        let train = registry.find_train(1).unwrap().unwrap();
        assert_eq!(train.open_anomaly_count, 2);

        assert_eq!(registry.resolve_anomalies(1).unwrap(), 2);
        let train = registry.find_train(1).unwrap().unwrap();
        assert_eq!(train.open_anomaly_count, 0);
    }

    #[test]
    fn test_retire_is_soft() {
        let registry = create_test_registry();
        registry.upsert_depot(&create_test_depot(1), None).unwrap();
        registry.upsert_train(&create_test_train(1)).unwrap();

        registry.retire_train(1).unwrap();
        let trains = registry.list_trains().unwrap();
        assert_eq!(trains.len(), 1);
        assert!(trains[0].retired);

        assert!(matches!(
            registry.retire_train(42),
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_unknown_depot_violates_foreign_key() {
        let registry = create_test_registry();
        let result = registry.upsert_train(&create_test_train(1));
        assert!(matches!(result, Err(RepositoryError::ForeignKeyViolation(_))));
    }

    #[test]
    fn test_malformed_row_is_skipped_others_load() {
        let registry = create_test_registry();
        registry.upsert_depot(&create_test_depot(1), None).unwrap();
        registry.upsert_train(&create_test_train(1)).unwrap();
        registry.upsert_train(&create_test_train(2)).unwrap();
        {
            let conn = registry.get_conn().unwrap();
            conn.execute("UPDATE trains SET status = 'PARKED' WHERE train_id = 1", [])
                .unwrap();
        }

        let trains = registry.list_trains().unwrap();
        assert_eq!(trains.len(), 1);
        assert_eq!(trains[0].train_id, 2);

        // 单条查询仍返回字段错误
        assert!(matches!(
            registry.find_train(1),
            Err(RepositoryError::FieldValueError { .. })
        ));
    }

    #[test]
    fn test_fleet_snapshot_reads_trains_and_depots_together() {
        let registry = create_test_registry();
        registry.upsert_depot(&create_test_depot(1), None).unwrap();
        registry.upsert_depot(&create_test_depot(2), None).unwrap();
        registry.upsert_train(&create_test_train(1)).unwrap();

        let fleet = registry.fleet_snapshot().unwrap();
        assert_eq!(fleet.trains.len(), 1);
        assert_eq!(fleet.depots.len(), 2);

        // 快照读取后连接可继续写入（读事务已结束）
        registry.upsert_train(&create_test_train(2)).unwrap();
        assert_eq!(registry.fleet_snapshot().unwrap().trains.len(), 2);
    }
}
