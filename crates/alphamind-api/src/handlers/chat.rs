//! Conversation and message handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use alphamind_storage::{
    Conversation, ConversationFilter, ConversationStatus, DeleteOutcome, Message, MessageRole,
};

use super::agents::format_timestamp;
use super::common::{
    ok, ok_message, ok_with_message, optional_str, require_str, user_id_or_default, HandlerResult,
};
use super::ServerState;
use crate::models::{ErrorResponse, PaginationQuery};

/// Conversation info for API responses.
#[derive(Debug, Serialize)]
pub struct ConversationDto {
    pub id: String,
    pub user_id: String,
    pub agent_id: Option<String>,
    pub title: String,
    pub status: ConversationStatus,
    pub message_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

impl ConversationDto {
    fn new(conversation: Conversation, message_count: usize) -> Self {
        Self {
            id: conversation.id,
            user_id: conversation.user_id,
            agent_id: conversation.agent_id,
            title: conversation.title,
            status: conversation.status,
            message_count,
            created_at: format_timestamp(conversation.created_at),
            updated_at: format_timestamp(conversation.updated_at),
        }
    }
}

/// Message info for API responses.
#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub id: String,
    pub conversation_id: String,
    pub role: MessageRole,
    pub content: String,
    pub metadata: Value,
    pub created_at: String,
}

impl From<Message> for MessageDto {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            role: message.role,
            content: message.content,
            metadata: message.metadata.unwrap_or_else(|| json!({})),
            created_at: format_timestamp(message.created_at),
        }
    }
}

/// Query parameters for listing conversations.
#[derive(Debug, Deserialize)]
pub struct ConversationListQuery {
    pub user_id: Option<String>,
}

/// List conversations for a user.
///
/// GET /api/alphamind/chat/conversations?user_id=...&page=1&limit=20
pub async fn list_conversations_handler(
    Query(query): Query<ConversationListQuery>,
    Query(pagination): Query<PaginationQuery>,
    State(state): State<ServerState>,
) -> HandlerResult<Vec<ConversationDto>> {
    let conversations = state
        .conversations
        .query_conversations(ConversationFilter {
            user_id: Some(query.user_id.unwrap_or_else(|| "default_user".to_string())),
            limit: Some(pagination.limit),
            offset: Some(pagination.offset()),
        })
        .await?;

    let mut dtos = Vec::with_capacity(conversations.len());
    for conversation in conversations {
        let count = state.conversations.message_count(&conversation.id).await?;
        dtos.push(ConversationDto::new(conversation, count));
    }

    ok_with_message(dtos, "Conversations retrieved successfully")
}

/// Create a new conversation.
///
/// POST /api/alphamind/chat/conversations
pub async fn create_conversation_handler(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> HandlerResult<ConversationDto> {
    let title = optional_str(&body, "title").unwrap_or("New Conversation");
    let agent_id = optional_str(&body, "agent_id").map(str::to_string);

    if let Some(agent_id) = &agent_id {
        if state.agents.get_agent(agent_id).await?.is_none() {
            return Err(ErrorResponse::not_found("Agent"));
        }
    }

    let conversation = Conversation::new(user_id_or_default(&body), title, agent_id);
    state.conversations.create_conversation(&conversation).await?;

    // Greeting message so a new conversation opens with context
    let greeting = Message::new(
        &conversation.id,
        MessageRole::Assistant,
        "Hello, I am your AI assistant. How can I help you today?",
    );
    state.conversations.append_message(&greeting).await?;

    ok_with_message(
        ConversationDto::new(conversation, 1),
        "Conversation created successfully",
    )
}

/// Get a conversation together with its messages.
///
/// GET /api/alphamind/chat/conversations/:id
pub async fn get_conversation_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<Value> {
    let conversation = state
        .conversations
        .get_conversation(&id)
        .await?
        .ok_or_else(|| ErrorResponse::not_found("Conversation"))?;

    let messages = state.conversations.list_messages(&id).await?;
    let dto = ConversationDto::new(conversation, messages.len());
    let messages: Vec<MessageDto> = messages.into_iter().map(MessageDto::from).collect();

    ok(json!({
        "conversation": dto,
        "messages": messages,
    }))
}

/// Delete a conversation. Soft-deletes when messages exist.
///
/// DELETE /api/alphamind/chat/conversations/:id
pub async fn delete_conversation_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<Value> {
    match state.conversations.delete_conversation(&id).await? {
        DeleteOutcome::NotFound => Err(ErrorResponse::not_found("Conversation")),
        _ => ok_message("Conversation deleted successfully"),
    }
}

/// Update a conversation's title.
///
/// PUT /api/alphamind/chat/conversations/:id/title
pub async fn update_conversation_title_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> HandlerResult<Value> {
    let title = require_str(&body, "title")?;

    if !state.conversations.update_title(&id, title).await? {
        return Err(ErrorResponse::not_found("Conversation"));
    }
    ok_message("Conversation title updated successfully")
}

/// List the messages of a conversation.
///
/// GET /api/alphamind/chat/conversations/:id/messages
///
/// A conversation with no messages yields `data: []`, not an error.
pub async fn list_messages_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<Vec<MessageDto>> {
    state
        .conversations
        .get_conversation(&id)
        .await?
        .ok_or_else(|| ErrorResponse::not_found("Conversation"))?;

    let messages = state.conversations.list_messages(&id).await?;
    ok(messages.into_iter().map(MessageDto::from).collect())
}

/// Send a message and receive the assistant's reply.
///
/// POST /api/alphamind/chat/conversations/:id/messages
pub async fn send_message_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> HandlerResult<Value> {
    let content = require_str(&body, "content")?;

    let conversation = state
        .conversations
        .get_conversation(&id)
        .await?
        .ok_or_else(|| ErrorResponse::not_found("Conversation"))?;

    let user_message = Message::new(&id, MessageRole::User, content);
    state.conversations.append_message(&user_message).await?;

    let reply = generate_reply(content);
    let assistant_message = Message::new(&id, MessageRole::Assistant, reply);
    state.conversations.append_message(&assistant_message).await?;

    // Track usage against the driving agent, if any
    if let Some(agent_id) = &conversation.agent_id {
        if let Err(e) = state.agents.record_usage(agent_id, true).await {
            tracing::warn!(agent_id = %agent_id, error = %e, "Failed to record agent usage");
        }
    }

    ok_with_message(
        json!({
            "user_message": MessageDto::from(user_message),
            "ai_message": MessageDto::from(assistant_message),
        }),
        "Message sent successfully",
    )
}

/// Canned assistant reply. Stands in for a model call; keyed off the user
/// text so conversations read coherently in demos.
fn generate_reply(user_message: &str) -> String {
    let lowered = user_message.to_lowercase();
    if lowered.contains("hello") {
        "Hello! How can I help you today?".to_string()
    } else if lowered.contains("help") {
        "I'm here to assist you. What would you like to know?".to_string()
    } else if lowered.contains("thank") {
        "You're welcome! Is there anything else I can help you with?".to_string()
    } else {
        format!(
            "I understand you said: '{}'. How can I assist you further?",
            user_message
        )
    }
}
