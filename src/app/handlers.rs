//! HTTP 处理器
//!
//! 每个处理器只做请求解析与 DTO 转换，业务编排委托给 `InductionApi`。

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use super::dto::{
    DashboardResponse, HealthResponse, HistoryEntryDto, HistoryQuery, HistoryResponse,
    PlanRequest, PlanResponse, SimulateRequest, SimulateResponse,
};
use super::http_error::AppError;
use super::state::AppState;
use crate::api::SimulationRequest;

/// 处理器返回类型
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// ==========================================
// 健康检查
// ==========================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = if state.induction_api.registry_reachable().await {
        "connected"
    } else {
        "disconnected"
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        database: database.to_string(),
    }))
}

// ==========================================
// 入段计划
// ==========================================

/// POST /induction/plan
///
/// 请求体可为空；非空时必须是 `{ "generatedBy": ... }`
pub async fn generate_plan(
    State(state): State<AppState>,
    body: Bytes,
) -> HandlerResult<PlanResponse> {
    let request = if body.iter().all(|b| b.is_ascii_whitespace()) {
        PlanRequest::default()
    } else {
        serde_json::from_slice::<PlanRequest>(&body)
            .map_err(|e| AppError::BadRequest(format!("请求体格式错误: {}", e)))?
    };

    let outcome = state
        .induction_api
        .generate_plan(Utc::now(), request.generated_by.as_deref())
        .await?;

    Ok(Json(PlanResponse::from(&outcome)))
}

/// POST /induction/simulate
pub async fn simulate(
    State(state): State<AppState>,
    Json(request): Json<SimulateRequest>,
) -> HandlerResult<SimulateResponse> {
    let request = SimulationRequest::from(request);
    let result = state.induction_api.simulate(&request, Utc::now()).await?;

    Ok(Json(SimulateResponse::from(&result)))
}

/// GET /induction/history?limit=N
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> HandlerResult<HistoryResponse> {
    let snapshots = state.induction_api.list_history(query.limit).await?;
    let entries: Vec<HistoryEntryDto> = snapshots.iter().map(HistoryEntryDto::from).collect();
    let total = entries.len();

    Ok(Json(HistoryResponse { entries, total }))
}

/// GET /induction/dashboard
pub async fn dashboard(State(state): State<AppState>) -> HandlerResult<DashboardResponse> {
    let overview = state.induction_api.fleet_overview().await?;
    Ok(Json(DashboardResponse::from(&overview)))
}
