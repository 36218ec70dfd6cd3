// ==========================================
// HTTP 路由集成测试
// ==========================================
// 测试范围: 路由、JSON 字段命名、错误码映射
// ==========================================

#![cfg(feature = "http-server")]

mod helpers;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use helpers::mock_config::MockConfig;
use helpers::mock_registry::{InMemoryLedger, InMemoryRegistry};
use helpers::test_data_builder::*;
use metro_induction::api::InductionApi;
use metro_induction::app::{create_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn router_with(registry: InMemoryRegistry, config: MockConfig) -> Router {
    let api = InductionApi::new(
        Arc::new(registry),
        Arc::new(InMemoryLedger::new()),
        Arc::new(config),
    );
    create_router(AppState::from_api(":memory:".to_string(), Arc::new(api)))
}

fn kmrl_router() -> Router {
    router_with(
        InMemoryRegistry::new(kmrl_trains(), kmrl_depots()),
        MockConfig::new(),
    )
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ==========================================
// 健康检查
// ==========================================

#[tokio::test]
async fn test_health_reports_database_state() {
    let (status, body) = send(kmrl_router(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");

    let offline = InMemoryRegistry::new(kmrl_trains(), kmrl_depots());
    offline.set_offline(true);
    let (status, body) = send(router_with(offline, MockConfig::new()), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "disconnected");
}

// ==========================================
// 入段计划
// ==========================================

#[tokio::test]
async fn test_plan_with_empty_body() {
    let (status, body) = send(kmrl_router(), post_json("/induction/plan", "")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generatedBy"], "system");
    assert_eq!(body["data"].as_array().unwrap().len(), 8);
    assert_eq!(body["unscheduled"].as_array().unwrap().len(), 2);
    assert!(body["snapshotId"].as_str().is_some());

    let first = &body["data"][0];
    assert_eq!(first["slot"], 0);
    assert!(first["trainNumber"].as_str().unwrap().starts_with("KMRL-"));
    assert!(first["scheduledDate"].as_str().is_some());
    assert!(first["crossDepot"].is_boolean());
}

#[tokio::test]
async fn test_plan_records_generated_by() {
    let (status, body) = send(
        kmrl_router(),
        post_json("/induction/plan", r#"{"generatedBy":"depot-control"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generatedBy"], "depot-control");
}

#[tokio::test]
async fn test_plan_rejects_malformed_body() {
    let (status, body) = send(kmrl_router(), post_json("/induction/plan", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_plan_registry_timeout_is_504() {
    let slow = InMemoryRegistry::new(kmrl_trains(), kmrl_depots())
        .with_delay(Duration::from_millis(300));
    let router = router_with(slow, MockConfig::with_timeout_ms(20));

    let (status, body) = send(router, post_json("/induction/plan", "")).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["code"], "REGISTRY_TIMEOUT");
    assert_eq!(body["details"], "timeout_ms=20");
}

#[tokio::test]
async fn test_plan_registry_offline_is_503() {
    let offline = InMemoryRegistry::new(kmrl_trains(), kmrl_depots());
    offline.set_offline(true);

    let (status, body) = send(
        router_with(offline, MockConfig::new()),
        post_json("/induction/plan", ""),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "REGISTRY_UNAVAILABLE");
}

// ==========================================
// 模拟
// ==========================================

#[tokio::test]
async fn test_simulate_replacement() {
    let (status, body) = send(
        kmrl_router(),
        post_json(
            "/induction/simulate",
            r#"{"scenarioType":"train_replacement","trainId":1,"replacementTrainId":4}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scenarioType"], "train_replacement");
    assert_eq!(body["replacementDetails"]["originalTrain"], "KMRL-001");
    assert_eq!(body["replacementDetails"]["replacementTrain"], "KMRL-004");
    assert!(body["baseMetrics"]["scheduledTrains"].is_number());
    assert!(body["changes"].as_array().unwrap().iter().any(|c| c["trainId"] == 1));
}

#[tokio::test]
async fn test_simulate_reweight_omits_replacement_details() {
    let (status, body) = send(
        kmrl_router(),
        post_json("/induction/simulate", r#"{"scenarioType":"shunting_cost"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("replacementDetails").is_none());
    assert_eq!(body["simulationMetrics"]["crossDepotMoves"], 0);
}

#[tokio::test]
async fn test_simulate_unknown_scenario_is_400() {
    let (status, body) = send(
        kmrl_router(),
        post_json("/induction/simulate", r#"{"scenarioType":"monsoon_closure"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_SCENARIO");
}

#[tokio::test]
async fn test_simulate_maintenance_replacement_is_422() {
    let (status, body) = send(
        kmrl_router(),
        post_json(
            "/induction/simulate",
            r#"{"scenarioType":"TrainReplacement","trainId":1,"replacementTrainId":8}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_REPLACEMENT");
}

// ==========================================
// 历史 / 驾驶舱
// ==========================================

#[tokio::test]
async fn test_history_respects_limit() {
    let router = kmrl_router();
    for _ in 0..3 {
        let (status, _) = send(router.clone(), post_json("/induction/plan", "")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(router.clone(), get("/induction/history?limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["entries"][0]["trainsScheduled"], 8);
    assert_eq!(body["entries"][0]["status"], "Partially Completed");

    let (status, body) = send(router, get("/induction/history?limit=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_dashboard_overview() {
    let (status, body) = send(kmrl_router(), get("/induction/dashboard")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalTrains"], 10);
    assert_eq!(body["availableTrains"], 8);
    assert_eq!(body["availabilityPct"], 80.0);
    assert_eq!(body["depotUtilization"].as_array().unwrap().len(), 3);
    assert_eq!(body["depotUtilization"][0]["availableBays"], 3);
}
