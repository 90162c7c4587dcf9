//! Tests for agent handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use alphamind_api::handlers::agents::*;
use alphamind_storage::AgentStatus;

fn list_query() -> AgentListQuery {
    AgentListQuery {
        user_id: None,
        status: None,
        category: None,
        search: None,
        page: 1,
        limit: 20,
    }
}

#[tokio::test]
async fn test_create_agent_returns_id() {
    let state = crate::common::create_test_server_state();

    let response = create_agent_handler(
        State(state),
        Json(json!({"name": "Bot", "category": "assistant"})),
    )
    .await
    .unwrap();

    assert!(response.0.success);
    let agent = response.0.data.unwrap();
    assert!(!agent.id.is_empty());
    assert_eq!(agent.status, AgentStatus::Draft);
}

#[tokio::test]
async fn test_create_agent_missing_field_is_400() {
    let state = crate::common::create_test_server_state();

    let err = create_agent_handler(State(state), Json(json!({"name": "Bot"})))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.message, "category is required");
}

#[tokio::test]
async fn test_duplicate_agent_name_is_conflict() {
    let state = crate::common::create_test_server_state();

    let body = json!({"name": "Bot", "category": "assistant"});
    create_agent_handler(State(state.clone()), Json(body.clone()))
        .await
        .unwrap();

    let err = create_agent_handler(State(state), Json(body)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_get_missing_agent_is_404() {
    let state = crate::common::create_test_server_state();
    let err = get_agent_handler(State(state), Path("missing".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_agent_is_404() {
    let state = crate::common::create_test_server_state();
    let err = delete_agent_handler(State(state), Path("missing".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_activate_then_deactivate() {
    let state = crate::common::create_test_server_state();

    let created = create_agent_handler(
        State(state.clone()),
        Json(json!({"name": "Toggler", "category": "assistant"})),
    )
    .await
    .unwrap();
    let id = created.0.data.unwrap().id;

    activate_agent_handler(State(state.clone()), Path(id.clone()))
        .await
        .unwrap();
    let agent = get_agent_handler(State(state.clone()), Path(id.clone()))
        .await
        .unwrap();
    assert_eq!(agent.0.data.unwrap().status, AgentStatus::Active);

    deactivate_agent_handler(State(state.clone()), Path(id.clone()))
        .await
        .unwrap();
    let agent = get_agent_handler(State(state), Path(id)).await.unwrap();
    assert_eq!(agent.0.data.unwrap().status, AgentStatus::Inactive);
}

#[tokio::test]
async fn test_update_agent_fields() {
    let state = crate::common::create_test_server_state();

    let created = create_agent_handler(
        State(state.clone()),
        Json(json!({"name": "Old", "category": "assistant"})),
    )
    .await
    .unwrap();
    let id = created.0.data.unwrap().id;

    let updated = update_agent_handler(
        State(state),
        Path(id),
        Json(json!({"name": "New", "skills": ["search"]})),
    )
    .await
    .unwrap();
    let agent = updated.0.data.unwrap();
    assert_eq!(agent.name, "New");
    assert_eq!(agent.skills, vec!["search"]);
}

#[tokio::test]
async fn test_list_agents_with_status_filter() {
    let state = crate::common::create_test_server_state();

    let created = create_agent_handler(
        State(state.clone()),
        Json(json!({"name": "Live", "category": "assistant"})),
    )
    .await
    .unwrap();
    let id = created.0.data.unwrap().id;
    create_agent_handler(
        State(state.clone()),
        Json(json!({"name": "Dormant", "category": "assistant"})),
    )
    .await
    .unwrap();
    activate_agent_handler(State(state.clone()), Path(id)).await.unwrap();

    let mut query = list_query();
    query.status = Some("active".to_string());
    let listed = list_agents_handler(Query(query), State(state)).await.unwrap();
    let agents = listed.0.data.unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].name, "Live");
}

#[tokio::test]
async fn test_list_agents_rejects_bad_status() {
    let state = crate::common::create_test_server_state();

    let mut query = list_query();
    query.status = Some("sleeping".to_string());
    let err = list_agents_handler(Query(query), State(state)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_skills_roundtrip() {
    let state = crate::common::create_test_server_state();

    let created = create_agent_handler(
        State(state.clone()),
        Json(json!({"name": "Skilled", "category": "assistant"})),
    )
    .await
    .unwrap();
    let id = created.0.data.unwrap().id;

    add_agent_skill_handler(
        State(state.clone()),
        Path(id.clone()),
        Json(json!({"skill_id": "summarize"})),
    )
    .await
    .unwrap();

    let skills = get_agent_skills_handler(State(state.clone()), Path(id.clone()))
        .await
        .unwrap();
    assert_eq!(skills.0.data.unwrap(), vec!["summarize"]);

    // Missing skill_id names the field
    let err = add_agent_skill_handler(State(state), Path(id), Json(json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.message, "skill_id is required");
}

#[tokio::test]
async fn test_agent_stats() {
    let state = crate::common::create_test_server_state();

    create_agent_handler(
        State(state.clone()),
        Json(json!({"name": "Counted", "category": "assistant"})),
    )
    .await
    .unwrap();

    let stats = agent_stats_handler(State(state), Query(StatsQuery { user_id: None }))
        .await
        .unwrap();
    let data = stats.0.data.unwrap();
    assert_eq!(data["total_agents"], 1);
    assert_eq!(data["active_agents"], 0);
}
