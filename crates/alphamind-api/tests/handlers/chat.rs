//! Tests for conversation and message handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use alphamind_api::handlers::chat::*;
use alphamind_api::models::PaginationQuery;
use alphamind_storage::Conversation;

#[tokio::test]
async fn test_create_conversation_succeeds() {
    let state = crate::common::create_test_server_state();

    let response = create_conversation_handler(State(state), Json(json!({"title": "First chat"})))
        .await
        .unwrap();
    assert!(response.0.success);

    let conversation = response.0.data.unwrap();
    assert!(!conversation.id.is_empty());
    assert_eq!(conversation.title, "First chat");
    // Greeting message is seeded on creation
    assert_eq!(conversation.message_count, 1);
}

#[tokio::test]
async fn test_create_conversation_with_unknown_agent_is_404() {
    let state = crate::common::create_test_server_state();

    let err = create_conversation_handler(
        State(state),
        Json(json!({"title": "x", "agent_id": "missing"})),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_conversation_messages_is_empty_list() {
    let state = crate::common::create_test_server_state();

    // Seed a conversation without the handler's greeting message
    let conversation = Conversation::new("default_user", "Quiet", None);
    state
        .conversations
        .create_conversation(&conversation)
        .await
        .unwrap();

    let response = list_messages_handler(State(state), Path(conversation.id))
        .await
        .unwrap();
    assert!(response.0.success);
    assert!(response.0.data.unwrap().is_empty());
}

#[tokio::test]
async fn test_send_message_records_both_sides() {
    let state = crate::common::create_test_server_state();

    let created = create_conversation_handler(State(state.clone()), Json(json!({})))
        .await
        .unwrap();
    let id = created.0.data.unwrap().id;

    let response = send_message_handler(
        State(state.clone()),
        Path(id.clone()),
        Json(json!({"content": "hello there"})),
    )
    .await
    .unwrap();
    let data = response.0.data.unwrap();
    assert_eq!(data["user_message"]["content"], "hello there");
    assert!(data["ai_message"]["content"]
        .as_str()
        .unwrap()
        .starts_with("Hello!"));

    // Greeting + user + assistant
    let messages = list_messages_handler(State(state), Path(id)).await.unwrap();
    assert_eq!(messages.0.data.unwrap().len(), 3);
}

#[tokio::test]
async fn test_send_message_missing_content_is_400() {
    let state = crate::common::create_test_server_state();

    let created = create_conversation_handler(State(state.clone()), Json(json!({})))
        .await
        .unwrap();
    let id = created.0.data.unwrap().id;

    let err = send_message_handler(State(state), Path(id), Json(json!({"type": "text"})))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.message, "content is required");
}

#[tokio::test]
async fn test_messages_of_missing_conversation_is_404() {
    let state = crate::common::create_test_server_state();
    let err = list_messages_handler(State(state), Path("missing".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_conversation_then_gone() {
    let state = crate::common::create_test_server_state();

    let created = create_conversation_handler(State(state.clone()), Json(json!({})))
        .await
        .unwrap();
    let id = created.0.data.unwrap().id;

    delete_conversation_handler(State(state.clone()), Path(id.clone()))
        .await
        .unwrap();

    // Soft-deleted conversations read as gone
    let err = get_conversation_handler(State(state.clone()), Path(id.clone()))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);

    let err = delete_conversation_handler(State(state), Path(id)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_title_requires_title() {
    let state = crate::common::create_test_server_state();

    let created = create_conversation_handler(State(state.clone()), Json(json!({})))
        .await
        .unwrap();
    let id = created.0.data.unwrap().id;

    let err = update_conversation_title_handler(
        State(state.clone()),
        Path(id.clone()),
        Json(json!({})),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);

    update_conversation_title_handler(
        State(state.clone()),
        Path(id.clone()),
        Json(json!({"title": "Renamed"})),
    )
    .await
    .unwrap();

    let fetched = get_conversation_handler(State(state), Path(id)).await.unwrap();
    assert_eq!(fetched.0.data.unwrap()["conversation"]["title"], "Renamed");
}

#[tokio::test]
async fn test_list_conversations_scoped_to_user() {
    let state = crate::common::create_test_server_state();

    create_conversation_handler(State(state.clone()), Json(json!({"user_id": "alice"})))
        .await
        .unwrap();
    create_conversation_handler(State(state.clone()), Json(json!({"user_id": "bob"})))
        .await
        .unwrap();

    let query = ConversationListQuery {
        user_id: Some("alice".to_string()),
    };
    let listed = list_conversations_handler(
        Query(query),
        Query(PaginationQuery::default()),
        State(state),
    )
    .await
    .unwrap();
    assert_eq!(listed.0.data.unwrap().len(), 1);
}
