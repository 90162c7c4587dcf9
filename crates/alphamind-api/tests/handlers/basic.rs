//! Tests for health endpoints.

use axum::extract::State;

use alphamind_api::handlers::basic::*;

#[tokio::test]
async fn test_health_handler() {
    let state = crate::common::create_test_server_state();
    let response = health_handler(State(state)).await.unwrap();
    assert!(response.0.success);

    let data = response.0.data.unwrap();
    assert_eq!(data["status"], "healthy");
    assert_eq!(data["service"], "alphamind-api");
}

#[tokio::test]
async fn test_index_handler() {
    let response = index_handler().await.unwrap();
    let data = response.0.data.unwrap();
    assert_eq!(data["status"], "running");
}
