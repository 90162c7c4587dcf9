//! Tests for dataset and knowledge base handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use alphamind_api::handlers::data::*;
use alphamind_storage::DatasetStatus;

#[tokio::test]
async fn test_create_dataset_returns_id() {
    let state = crate::common::create_test_server_state();

    let response = create_dataset_handler(
        State(state),
        Json(json!({"name": "Logs", "description": "Server logs"})),
    )
    .await
    .unwrap();

    assert!(response.0.success);
    let dataset = response.0.data.unwrap();
    assert!(!dataset.id.is_empty());
    assert_eq!(dataset.status, DatasetStatus::Uploading);
}

#[tokio::test]
async fn test_create_dataset_missing_description_is_400() {
    let state = crate::common::create_test_server_state();

    let err = create_dataset_handler(State(state), Json(json!({"name": "Logs"})))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.message, "description is required");
}

#[tokio::test]
async fn test_create_dataset_rejects_unknown_type() {
    let state = crate::common::create_test_server_state();

    let err = create_dataset_handler(
        State(state),
        Json(json!({"name": "Logs", "description": "x", "data_type": "audio"})),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_dataset_is_404() {
    let state = crate::common::create_test_server_state();
    let err = get_dataset_handler(State(state), Path("missing".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_process_dataset_flips_status() {
    let state = crate::common::create_test_server_state();

    let created = create_dataset_handler(
        State(state.clone()),
        Json(json!({"name": "Corpus", "description": "docs"})),
    )
    .await
    .unwrap();
    let id = created.0.data.unwrap().id;

    let response = process_dataset_handler(State(state.clone()), Path(id.clone()), None)
        .await
        .unwrap();
    assert_eq!(response.0.data.unwrap()["status"], "processing");

    let fetched = get_dataset_handler(State(state), Path(id)).await.unwrap();
    assert_eq!(fetched.0.data.unwrap().status, DatasetStatus::Processing);
}

#[tokio::test]
async fn test_knowledge_base_document_flow() {
    let state = crate::common::create_test_server_state();

    let created = create_knowledge_base_handler(
        State(state.clone()),
        Json(json!({"name": "Product docs"})),
    )
    .await
    .unwrap();
    let kb = created.0.data.unwrap();
    assert_eq!(kb.document_count, 0);

    add_document_handler(
        State(state.clone()),
        Path(kb.id.clone()),
        Json(json!({"title": "Billing", "content": "How invoices work"})),
    )
    .await
    .unwrap();

    let searched = search_knowledge_base_handler(
        State(state.clone()),
        Path(kb.id.clone()),
        Json(json!({"query": "invoices", "threshold": 0.5})),
    )
    .await
    .unwrap();
    let hits = searched.0.data.unwrap();
    assert_eq!(hits["results"].as_array().unwrap().len(), 1);

    // Missing required fields name themselves
    let err = add_document_handler(
        State(state),
        Path(kb.id),
        Json(json!({"title": "No content"})),
    )
    .await
    .unwrap_err();
    assert_eq!(err.message, "content is required");
}

#[tokio::test]
async fn test_search_missing_kb_is_404() {
    let state = crate::common::create_test_server_state();

    let err = search_knowledge_base_handler(
        State(state),
        Path("missing".to_string()),
        Json(json!({"query": "anything"})),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analytics_overview_counts() {
    let state = crate::common::create_test_server_state();

    create_dataset_handler(
        State(state.clone()),
        Json(json!({"name": "D", "description": "d"})),
    )
    .await
    .unwrap();
    create_knowledge_base_handler(State(state.clone()), Json(json!({"name": "K"})))
        .await
        .unwrap();

    let overview = analytics_overview_handler(
        Query(AnalyticsQuery {
            user_id: None,
            days: 30,
        }),
        State(state),
    )
    .await
    .unwrap();
    let data = overview.0.data.unwrap();
    assert_eq!(data["datasets"], 1);
    assert_eq!(data["knowledge_bases"], 1);
    assert_eq!(data["total_documents"], 0);
}
