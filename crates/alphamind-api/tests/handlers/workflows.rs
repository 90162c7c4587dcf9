//! Tests for workflow handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use alphamind_api::handlers::workflows::*;
use alphamind_api::models::PaginationQuery;
use alphamind_storage::{ExecutionStatus, WorkflowExecution};

fn execution_query() -> ExecutionListQuery {
    ExecutionListQuery { status: None }
}

#[tokio::test]
async fn test_execute_against_unreachable_engine_yields_failed_row() {
    // Engine endpoint points at a closed port
    let state = crate::common::create_test_server_state();

    let response = execute_workflow_handler(
        State(state.clone()),
        Path("wf_1".to_string()),
        Some(Json(json!({"input_data": {"x": 1}}))),
    )
    .await
    .unwrap();

    assert!(response.0.success);
    let execution = response.0.data.unwrap();
    assert_eq!(execution.status, ExecutionStatus::Failed);
    assert!(execution.error_message.is_some());

    // The failed row is tracked and queryable
    let listed = list_executions_handler(
        State(state),
        Path("wf_1".to_string()),
        Query(execution_query()),
        Query(PaginationQuery::default()),
    )
    .await
    .unwrap();
    assert_eq!(listed.0.data.unwrap().len(), 1);
}

#[tokio::test]
async fn test_execute_with_reachable_engine_completes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/wf_ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "executionId": 5, "result": "fine"
        })))
        .mount(&server)
        .await;

    let state = crate::common::create_test_server_state_with_engine(&server.uri());
    let response = execute_workflow_handler(
        State(state),
        Path("wf_ok".to_string()),
        Some(Json(json!({"input_data": {"x": 1}}))),
    )
    .await
    .unwrap();

    let execution = response.0.data.unwrap();
    assert_eq!(execution.status, ExecutionStatus::Completed);
    assert_eq!(execution.output_data.unwrap()["result"], "fine");
    assert!(execution.execution_time_ms.is_some());
}

#[tokio::test]
async fn test_execute_without_body_defaults_input() {
    let state = crate::common::create_test_server_state();

    let response = execute_workflow_handler(State(state), Path("wf_1".to_string()), None)
        .await
        .unwrap();
    let execution = response.0.data.unwrap();
    assert_eq!(execution.input_data, json!({}));
}

#[tokio::test]
async fn test_list_executions_filters_by_status() {
    let state = crate::common::create_test_server_state();

    // One failed run via the handler, one cancelled row seeded by hand
    execute_workflow_handler(
        State(state.clone()),
        Path("wf_1".to_string()),
        Some(Json(json!({})))
    )
    .await
    .unwrap();

    let seeded = WorkflowExecution::new("wf_1", json!({}));
    state.runner.store().insert(&seeded).await.unwrap();
    state.runner.store().mark_running(&seeded.id).await.unwrap();
    state.runner.store().mark_cancelled(&seeded.id).await.unwrap();

    let mut query = execution_query();
    query.status = Some("failed".to_string());
    let failed = list_executions_handler(
        State(state.clone()),
        Path("wf_1".to_string()),
        Query(query),
        Query(PaginationQuery::default()),
    )
    .await
    .unwrap();
    assert_eq!(failed.0.data.unwrap().len(), 1);

    let mut query = execution_query();
    query.status = Some("done".to_string());
    let err = list_executions_handler(
        State(state),
        Path("wf_1".to_string()),
        Query(query),
        Query(PaginationQuery::default()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_execution_is_404() {
    let state = crate::common::create_test_server_state();
    let err = get_execution_handler(State(state), Path("missing".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stop_running_execution() {
    let state = crate::common::create_test_server_state();

    let seeded = WorkflowExecution::new("wf_1", json!({}));
    state.runner.store().insert(&seeded).await.unwrap();
    state.runner.store().mark_running(&seeded.id).await.unwrap();

    let response = stop_execution_handler(State(state), Path(seeded.id))
        .await
        .unwrap();
    assert_eq!(response.0.data.unwrap().status, ExecutionStatus::Cancelled);
}

#[tokio::test]
async fn test_stop_completed_execution_is_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/wf_ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let state = crate::common::create_test_server_state_with_engine(&server.uri());
    let response = execute_workflow_handler(
        State(state.clone()),
        Path("wf_ok".to_string()),
        Some(Json(json!({}))),
    )
    .await
    .unwrap();
    let id = response.0.data.unwrap().id;

    let err = stop_execution_handler(State(state), Path(id)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_list_workflows_proxies_engine() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "wf_1", "name": "Sync", "active": true}]
        })))
        .mount(&server)
        .await;

    let state = crate::common::create_test_server_state_with_engine(&server.uri());
    let response = list_workflows_handler(State(state)).await.unwrap();
    let data = response.0.data.unwrap();
    assert_eq!(data["count"], 1);
    assert_eq!(data["workflows"][0]["name"], "Sync");
}

#[tokio::test]
async fn test_list_workflows_unreachable_engine_is_upstream_error() {
    let state = crate::common::create_test_server_state();
    let err = list_workflows_handler(State(state)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_create_workflow_requires_name() {
    let state = crate::common::create_test_server_state();
    let err = create_workflow_handler(State(state), Json(json!({"nodes": []})))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.message, "name is required");
}

#[tokio::test]
async fn test_activate_missing_workflow_is_404() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/workflows/wf_missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let state = crate::common::create_test_server_state_with_engine(&server.uri());
    let err = activate_workflow_handler(State(state), Path("wf_missing".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_engine_webhook_echoes_payload() {
    let response = engine_webhook_handler(
        Path("hook-1".to_string()),
        Some(Json(json!({"event": "done"}))),
    )
    .await
    .unwrap();
    let data = response.0.data.unwrap();
    assert_eq!(data["webhook_id"], "hook-1");
    assert_eq!(data["received"]["event"], "done");
}
