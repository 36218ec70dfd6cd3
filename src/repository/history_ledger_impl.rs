// ==========================================
// 地铁车队入段排程系统 - 历史台账 SQLite 实现
// ==========================================
// 职责: induction_history 表的追加与查询
// 存储: 入段候选整体序列化为 candidates_json（不可变副本）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::induction::{InductionCandidate, PlanSnapshot};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::history_ledger::HistoryLedger;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteHistoryLedger - 历史台账
// ==========================================
pub struct SqliteHistoryLedger {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHistoryLedger {
    /// 创建新的 SqliteHistoryLedger 实例
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

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 快照总数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM induction_history", [], |row| {
            row.get(0)
        })?;
        Ok(usize::try_from(n).unwrap_or(0))
    }
}

impl HistoryLedger for SqliteHistoryLedger {
    fn append(&self, snapshot: &PlanSnapshot) -> RepositoryResult<()> {
        let candidates_json = serde_json::to_string(&snapshot.candidates)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO induction_history (
                snapshot_id, generated_at, generated_by,
                trains_scheduled, unscheduled_count, high_priority, avg_score,
                status, config_snapshot_json, candidates_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                snapshot.snapshot_id,
                snapshot.generated_at.to_rfc3339(),
                snapshot.generated_by,
                snapshot.trains_scheduled as i64,
                snapshot.unscheduled_count as i64,
                snapshot.high_priority as i64,
                snapshot.avg_score,
                snapshot.status,
                snapshot.config_snapshot,
                candidates_json,
            ],
        )?;
        Ok(())
    }

    fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<PlanSnapshot>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                snapshot_id, generated_at, generated_by,
                trains_scheduled, unscheduled_count, high_priority, avg_score,
                status, config_snapshot_json, candidates_json
            FROM induction_history
            ORDER BY generated_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, f64>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, Option<String>>(8)?,
                row.get::<_, String>(9)?,
            ))
        })?;

        let mut snapshots = Vec::new();
        for row in rows {
            let (
                snapshot_id,
                generated_at,
                generated_by,
                trains_scheduled,
                unscheduled_count,
                high_priority,
                avg_score,
                status,
                config_snapshot,
                candidates_json,
            ) = row?;

            let generated_at = DateTime::parse_from_rfc3339(&generated_at)
                .map_err(|e| RepositoryError::FieldValueError {
                    field: "induction_history.generated_at".to_string(),
                    message: e.to_string(),
                })?
                .with_timezone(&Utc);
            let candidates: Vec<InductionCandidate> = serde_json::from_str(&candidates_json)?;

            snapshots.push(PlanSnapshot {
                snapshot_id,
                generated_at,
                generated_by,
                trains_scheduled: usize::try_from(trains_scheduled).unwrap_or(0),
                unscheduled_count: usize::try_from(unscheduled_count).unwrap_or(0),
                high_priority: usize::try_from(high_priority).unwrap_or(0),
                avg_score,
                status,
                config_snapshot,
                candidates,
            });
        }
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;
    use crate::domain::induction::InductionPlan;
    use crate::domain::types::PriorityTier;
    use chrono::{Duration, TimeZone};

    fn create_test_ledger() -> SqliteHistoryLedger {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        SqliteHistoryLedger::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn create_test_snapshot(id: &str, generated_at: DateTime<Utc>) -> PlanSnapshot {
        let mut plan = InductionPlan::empty(generated_at);
        plan.candidates.push(InductionCandidate {
            train_id: 1,
            train_number: "KMRL-001".to_string(),
            priority_score: 79.0,
            tier: PriorityTier::High,
            slot_index: 0,
            scheduled_at: generated_at + Duration::hours(24),
            depot_id: 1,
            home_depot_id: 1,
            reasoning: vec!["High mileage (45,000 km)".to_string()],
        });
        PlanSnapshot::from_plan(&plan, id.to_string(), "planner", generated_at, None)
    }

    #[test]
    fn test_append_and_list_recent_order() {
        let ledger = create_test_ledger();
        let t0 = Utc.with_ymd_and_hms(2024, 3, 15, 6, 0, 0).unwrap();

        for i in 0..3 {
            let snapshot = create_test_snapshot(&format!("snap-{}", i), t0 + Duration::minutes(i));
            ledger.append(&snapshot).unwrap();
        }

        let recent = ledger.list_recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].snapshot_id, "snap-2");
        assert_eq!(recent[1].snapshot_id, "snap-1");
        assert_eq!(ledger.count().unwrap(), 3);
    }

    #[test]
    fn test_snapshot_round_trips_candidates() {
        let ledger = create_test_ledger();
        let t0 = Utc.with_ymd_and_hms(2024, 3, 15, 6, 0, 0).unwrap();
        let snapshot = create_test_snapshot("snap-a", t0);
        ledger.append(&snapshot).unwrap();

        let loaded = ledger.list_recent(10).unwrap();
        assert_eq!(loaded, vec![snapshot]);
    }

    #[test]
    fn test_duplicate_snapshot_id_rejected() {
        let ledger = create_test_ledger();
        let t0 = Utc.with_ymd_and_hms(2024, 3, 15, 6, 0, 0).unwrap();
        ledger.append(&create_test_snapshot("dup", t0)).unwrap();

        let result = ledger.append(&create_test_snapshot("dup", t0));
        assert!(matches!(result, Err(RepositoryError::UniqueConstraintViolation(_))));
    }
}
