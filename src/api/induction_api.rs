// ==========================================
// 地铁车队入段排程系统 - 入段计划 API
// ==========================================
// 职责: 编排 车辆台账 → 评分/排程引擎 → 历史台账
// 并发: 台账读取在 spawn_blocking 中执行，超时是唯一取消点
// 红线: 引擎不做 I/O；每次调用独立持有车辆段计数
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::induction_config_trait::InductionConfigReader;
use crate::domain::fleet::{FleetOverview, FleetSnapshot};
use crate::domain::induction::{InductionPlan, PlanSnapshot};
use crate::domain::simulation::{SimulationResult, SimulationScenario};
use crate::domain::types::ScenarioKind;
use crate::engine::plan_builder::PlanBuilder;
use crate::engine::scoring::ScoringEngine;
use crate::engine::simulation::{parse_scenario_kind, SimulationEngine};
use crate::repository::history_ledger::{HistoryLedger, DEFAULT_HISTORY_LIMIT};
use crate::repository::train_registry::TrainRegistry;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 历史查询上限
pub const MAX_HISTORY_LIMIT: usize = 500;

/// 默认生成人
pub const DEFAULT_GENERATED_BY: &str = "system";

/// 模拟请求
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationRequest {
    pub scenario_type: String,
    pub train_id: Option<i64>,
    pub replacement_train_id: Option<i64>,
    pub target_train_ids: Vec<i64>,
}

/// 计划生成结果（计划本体 + 已写入台账的快照）
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    pub plan: InductionPlan,
    pub snapshot: PlanSnapshot,
}

// ==========================================
// InductionApi - 入段计划 API
// ==========================================
pub struct InductionApi {
    registry: Arc<dyn TrainRegistry>,
    ledger: Arc<dyn HistoryLedger>,
    config: Arc<dyn InductionConfigReader>,
}

impl InductionApi {
    pub fn new(
        registry: Arc<dyn TrainRegistry>,
        ledger: Arc<dyn HistoryLedger>,
        config: Arc<dyn InductionConfigReader>,
    ) -> Self {
        Self {
            registry,
            ledger,
            config,
        }
    }

    // ==========================================
    // 计划生成
    // ==========================================

    /// 生成入段计划并追加到历史台账
    ///
    /// # 返回
    /// - Ok(PlanOutcome): 计划与快照
    /// - Err(ApiError::RegistryTimeout): 台账读取超时
    #[instrument(skip(self), fields(as_of = %as_of))]
    pub async fn generate_plan(
        &self,
        as_of: DateTime<Utc>,
        generated_by: Option<&str>,
    ) -> ApiResult<PlanOutcome> {
        let fleet = self.fetch_fleet().await?;
        let builder = self.plan_builder().await?;
        let plan = builder.generate_plan(&fleet.trains, &fleet.depots, as_of);

        let config_snapshot = match self.config.get_config_snapshot_json().await {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(error = %e, "配置快照读取失败，快照中不记录配置");
                None
            }
        };

        let generated_by = generated_by
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_GENERATED_BY);
        let snapshot = PlanSnapshot::from_plan(
            &plan,
            Uuid::new_v4().to_string(),
            generated_by,
            as_of,
            config_snapshot,
        );

        let ledger = self.ledger.clone();
        let to_append = snapshot.clone();
        tokio::task::spawn_blocking(move || ledger.append(&to_append))
            .await
            .map_err(|e| ApiError::InternalError(format!("历史台账写入任务失败: {}", e)))??;

        info!(
            snapshot_id = %snapshot.snapshot_id,
            scheduled = snapshot.trains_scheduled,
            unscheduled = snapshot.unscheduled_count,
            status = %snapshot.status,
            "入段计划已生成并写入历史台账"
        );

        Ok(PlanOutcome { plan, snapshot })
    }

    // ==========================================
    // 模拟
    // ==========================================

    /// 执行假设场景模拟（结果不落库）
    #[instrument(skip(self, request), fields(scenario = %request.scenario_type, as_of = %as_of))]
    pub async fn simulate(
        &self,
        request: &SimulationRequest,
        as_of: DateTime<Utc>,
    ) -> ApiResult<SimulationResult> {
        let scenario = build_scenario(request)?;

        let fleet = self.fetch_fleet().await?;
        let builder = self.plan_builder().await?;
        let base_plan = builder.generate_plan(&fleet.trains, &fleet.depots, as_of);

        let engine = SimulationEngine::new(
            builder.scoring().profile().clone(),
            builder.policy().clone(),
            self.config_value(self.config.get_cost_model().await)?,
        );

        Ok(engine.simulate(&base_plan, &scenario, &fleet, as_of)?)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 最近的计划快照（limit 为空取默认值，超过上限截断）
    pub async fn list_history(&self, limit: Option<usize>) -> ApiResult<Vec<PlanSnapshot>> {
        let limit = match limit {
            None => DEFAULT_HISTORY_LIMIT,
            Some(0) => return Err(ApiError::InvalidInput("limit 必须大于 0".to_string())),
            Some(n) => n.min(MAX_HISTORY_LIMIT),
        };

        let ledger = self.ledger.clone();
        let snapshots = tokio::task::spawn_blocking(move || ledger.list_recent(limit))
            .await
            .map_err(|e| ApiError::InternalError(format!("历史台账查询任务失败: {}", e)))??;
        Ok(snapshots)
    }

    /// 车队概览（驾驶舱）
    pub async fn fleet_overview(&self) -> ApiResult<FleetOverview> {
        let fleet = self.fetch_fleet().await?;
        Ok(fleet.overview())
    }

    /// 数据库/台账可达性
    pub async fn registry_reachable(&self) -> bool {
        match self.fetch_fleet().await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "车辆台账健康检查失败");
                false
            }
        }
    }

    // ==========================================
    // 内部方法
    // ==========================================

    /// 读取车队快照（spawn_blocking + 超时）
    async fn fetch_fleet(&self) -> ApiResult<FleetSnapshot> {
        let timeout_ms = self.config_value(self.config.get_registry_timeout_ms().await)?;
        let registry = self.registry.clone();

        let task = tokio::task::spawn_blocking(move || registry.fleet_snapshot());
        match tokio::time::timeout(Duration::from_millis(timeout_ms), task).await {
            Err(_) => {
                warn!(timeout_ms, "车辆台账读取超时");
                Err(ApiError::RegistryTimeout { timeout_ms })
            }
            Ok(Err(join_err)) => Err(ApiError::InternalError(format!(
                "车辆台账读取任务失败: {}",
                join_err
            ))),
            Ok(Ok(result)) => Ok(result?),
        }
    }

    async fn plan_builder(&self) -> ApiResult<PlanBuilder> {
        let profile = self.config_value(self.config.get_scoring_profile().await)?;
        let policy = self.config_value(self.config.get_plan_policy().await)?;
        Ok(PlanBuilder::new(ScoringEngine::new(profile), policy))
    }

    fn config_value<T>(
        &self,
        result: Result<T, Box<dyn std::error::Error + Send + Sync>>,
    ) -> ApiResult<T> {
        result.map_err(|e| ApiError::ConfigError(e.to_string()))
    }
}

/// 由请求构建场景（场景类型未知时返回 UnknownScenario）
pub fn build_scenario(request: &SimulationRequest) -> ApiResult<SimulationScenario> {
    let kind = parse_scenario_kind(&request.scenario_type)?;

    let mut targets = request.target_train_ids.clone();
    if let Some(id) = request.train_id {
        if !targets.contains(&id) {
            targets.insert(0, id);
        }
    }

    let scenario = match kind {
        ScenarioKind::TrainReplacement => SimulationScenario {
            kind,
            target_train_ids: targets,
            replacement_train_id: request.replacement_train_id,
        },
        _ => SimulationScenario::reweight(kind).with_targets(targets),
    };
    Ok(scenario)
}
