// ==========================================
// 地铁车队入段排程系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::induction_config_trait::InductionConfigReader;
use crate::config::scoring_profile::{
    CostModel, PlanPolicy, ScoringProfile, ScoringWeights, MAX_SLOT_INTERVAL_HOURS,
};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// 默认车辆台账读取超时（毫秒）
pub const DEFAULT_REGISTRY_TIMEOUT_MS: u64 = 3_000;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 读取并解析配置值；缺失或格式错误时回落默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        let value = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match value.trim().parse::<T>() {
            Ok(parsed) => Ok(parsed),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %value,
                    default = %default,
                    "配置值格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 在生成入段计划时随快照写入历史台账
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 同步读取评分参数（供非异步上下文使用）
    pub fn load_scoring_profile(&self) -> ConfigResult<ScoringProfile> {
        let defaults = ScoringProfile::default();
        let default_weights = ScoringWeights::default();

        let profile = ScoringProfile {
            weights: ScoringWeights {
                mileage: self
                    .get_parsed_or_default(config_keys::WEIGHT_MILEAGE, default_weights.mileage)?,
                health: self
                    .get_parsed_or_default(config_keys::WEIGHT_HEALTH, default_weights.health)?,
                maintenance: self.get_parsed_or_default(
                    config_keys::WEIGHT_MAINTENANCE,
                    default_weights.maintenance,
                )?,
            },
            mileage_ceiling_km: self
                .get_parsed_or_default(config_keys::MILEAGE_CEILING_KM, defaults.mileage_ceiling_km)?,
            maintenance_saturation_days: self.get_parsed_or_default(
                config_keys::MAINTENANCE_SATURATION_DAYS,
                defaults.maintenance_saturation_days,
            )?,
            certificate_bonus: self
                .get_parsed_or_default(config_keys::CERTIFICATE_BONUS, defaults.certificate_bonus)?,
            anomaly_bonus_per_event: self.get_parsed_or_default(
                config_keys::ANOMALY_BONUS_PER_EVENT,
                defaults.anomaly_bonus_per_event,
            )?,
            anomaly_bonus_cap: self
                .get_parsed_or_default(config_keys::ANOMALY_BONUS_CAP, defaults.anomaly_bonus_cap)?,
            branding_boost: defaults.branding_boost,
            branding_target_ids: defaults.branding_target_ids,
        };

        // 非法组合整体回落默认值，避免半套配置参与评分
        if let Err(reason) = profile.validate() {
            tracing::warn!(reason = %reason, "评分参数校验失败，使用默认评分参数");
            return Ok(ScoringProfile::default());
        }

        Ok(profile)
    }

    /// 同步读取计划策略
    pub fn load_plan_policy(&self) -> ConfigResult<PlanPolicy> {
        let defaults = PlanPolicy::default();

        let slot_interval_hours = self
            .get_parsed_or_default(config_keys::SLOT_INTERVAL_HOURS, defaults.slot_interval_hours)?;
        let allow_cross_depot_fallback = self.get_parsed_or_default(
            config_keys::ALLOW_CROSS_DEPOT_FALLBACK,
            defaults.allow_cross_depot_fallback,
        )?;
        let reason_min_contribution = self.get_parsed_or_default(
            config_keys::REASON_MIN_CONTRIBUTION,
            defaults.reason_min_contribution,
        )?;
        let max_reasons =
            self.get_parsed_or_default(config_keys::MAX_REASONS, defaults.max_reasons)?;

        Ok(PlanPolicy {
            // 时段间隔必须在 (0, 一年]，保证入段时刻严格递增且不溢出
            slot_interval_hours: if (1..=MAX_SLOT_INTERVAL_HOURS).contains(&slot_interval_hours) {
                slot_interval_hours
            } else {
                tracing::warn!(slot_interval_hours, "时段间隔越界，使用默认值");
                defaults.slot_interval_hours
            },
            allow_cross_depot_fallback,
            reason_min_contribution,
            max_reasons,
        })
    }

    /// 同步读取成本参数
    pub fn load_cost_model(&self) -> ConfigResult<CostModel> {
        let defaults = CostModel::default();
        Ok(CostModel {
            cross_depot_move_cost: self.get_parsed_or_default(
                config_keys::CROSS_DEPOT_MOVE_COST,
                defaults.cross_depot_move_cost,
            )?,
            deferral_cost: self
                .get_parsed_or_default(config_keys::DEFERRAL_COST, defaults.deferral_cost)?,
        })
    }
}

// ==========================================
// InductionConfigReader Trait 实现
// ==========================================
#[async_trait]
impl InductionConfigReader for ConfigManager {
    async fn get_scoring_profile(&self) -> ConfigResult<ScoringProfile> {
        self.load_scoring_profile()
    }

    async fn get_plan_policy(&self) -> ConfigResult<PlanPolicy> {
        self.load_plan_policy()
    }

    async fn get_cost_model(&self) -> ConfigResult<CostModel> {
        self.load_cost_model()
    }

    async fn get_registry_timeout_ms(&self) -> ConfigResult<u64> {
        let value = self
            .get_parsed_or_default(config_keys::REGISTRY_TIMEOUT_MS, DEFAULT_REGISTRY_TIMEOUT_MS)?;
        Ok(if value == 0 {
            DEFAULT_REGISTRY_TIMEOUT_MS
        } else {
            value
        })
    }

    async fn get_config_snapshot_json(&self) -> ConfigResult<String> {
        self.get_config_snapshot()
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 评分权重
    pub const WEIGHT_MILEAGE: &str = "induction/weight_mileage";
    pub const WEIGHT_HEALTH: &str = "induction/weight_health";
    pub const WEIGHT_MAINTENANCE: &str = "induction/weight_maintenance";

    // 评分因子
    pub const MILEAGE_CEILING_KM: &str = "induction/mileage_ceiling_km";
    pub const MAINTENANCE_SATURATION_DAYS: &str = "induction/maintenance_saturation_days";
    pub const CERTIFICATE_BONUS: &str = "induction/certificate_bonus";
    pub const ANOMALY_BONUS_PER_EVENT: &str = "induction/anomaly_bonus_per_event";
    pub const ANOMALY_BONUS_CAP: &str = "induction/anomaly_bonus_cap";

    // 计划策略
    pub const SLOT_INTERVAL_HOURS: &str = "induction/slot_interval_hours";
    pub const ALLOW_CROSS_DEPOT_FALLBACK: &str = "induction/allow_cross_depot_fallback";
    pub const REASON_MIN_CONTRIBUTION: &str = "induction/reason_min_contribution";
    pub const MAX_REASONS: &str = "induction/max_reasons";

    // 成本
    pub const CROSS_DEPOT_MOVE_COST: &str = "induction/cross_depot_move_cost";
    pub const DEFERRAL_COST: &str = "induction/deferral_cost";

    // 外部协作
    pub const REGISTRY_TIMEOUT_MS: &str = "induction/registry_timeout_ms";
}
