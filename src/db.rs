// ==========================================
// 地铁车队入段排程系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 幂等建表（服务启动、测试、种子数据共用）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 建表语句
///
/// 说明：
/// - trains 的里程/健康度不设 CHECK，脏数据由评分引擎拒绝并给出原因
/// - induction_history 只追加，不提供更新/删除路径
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS depots (
    depot_id       INTEGER PRIMARY KEY,
    name           TEXT    NOT NULL UNIQUE,
    location       TEXT,
    total_bays     INTEGER NOT NULL CHECK (total_bays > 0),
    occupied_bays  INTEGER NOT NULL DEFAULT 0
                   CHECK (occupied_bays >= 0 AND occupied_bays <= total_bays)
);

CREATE TABLE IF NOT EXISTS trains (
    train_id                   INTEGER PRIMARY KEY,
    train_number               TEXT    NOT NULL UNIQUE,
    model                      TEXT,
    status                     TEXT    NOT NULL,
    depot_id                   INTEGER NOT NULL REFERENCES depots(depot_id),
    mileage_km                 INTEGER NOT NULL DEFAULT 0,
    health_score               INTEGER NOT NULL DEFAULT 100,
    last_maintenance           TEXT,
    next_maintenance           TEXT,
    certificate_status         TEXT    NOT NULL DEFAULT 'VALID',
    branding_company           TEXT,
    branding_contracted_hours  INTEGER,
    branding_used_hours        INTEGER,
    retired                    INTEGER NOT NULL DEFAULT 0,
    updated_at                 TEXT    NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS sensor_data (
    reading_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    train_id     INTEGER NOT NULL REFERENCES trains(train_id),
    sensor_type  TEXT    NOT NULL,
    value        REAL    NOT NULL,
    recorded_at  TEXT    NOT NULL,
    is_anomaly   INTEGER NOT NULL DEFAULT 0,
    resolved     INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_sensor_data_train_open
    ON sensor_data (train_id, is_anomaly, resolved);

CREATE TABLE IF NOT EXISTS induction_history (
    snapshot_id           TEXT    PRIMARY KEY,
    generated_at          TEXT    NOT NULL,
    generated_by          TEXT    NOT NULL,
    trains_scheduled      INTEGER NOT NULL,
    unscheduled_count     INTEGER NOT NULL,
    high_priority         INTEGER NOT NULL,
    avg_score             REAL    NOT NULL,
    status                TEXT    NOT NULL,
    config_snapshot_json  TEXT,
    candidates_json       TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_induction_history_generated_at
    ON induction_history (generated_at DESC);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id    TEXT NOT NULL,
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 幂等建表并登记 schema_version
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    configure_sqlite_connection(conn)?;
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 获取默认数据库路径
///
/// 优先级: METRO_INDUCTION_DB_PATH > DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    for key in ["METRO_INDUCTION_DB_PATH", "DB_PATH"] {
        if let Ok(path) = std::env::var(key) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }

    let mut path = PathBuf::from("./metro_induction.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        let dir = data_dir.join("metro-induction-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("metro-induction");

        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("metro_induction.db"),
            Err(e) => tracing::warn!(error = %e, "无法创建数据目录，使用当前目录"),
        }
    }

    path.to_string_lossy().to_string()
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
