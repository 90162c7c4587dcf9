//! Application router configuration.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;

use super::types::{ServerState, MAX_REQUEST_BODY_SIZE};
use crate::models::ErrorResponse;

/// Create the application router with a specific state.
pub fn create_router_with_state(state: ServerState) -> Router {
    use crate::handlers::{agents, basic, chat, compat, data, workflows};

    let agent_routes = Router::new()
        .route("/", get(agents::list_agents_handler))
        .route("/", post(agents::create_agent_handler))
        .route("/stats", get(agents::agent_stats_handler))
        .route("/:id", get(agents::get_agent_handler))
        .route("/:id", put(agents::update_agent_handler))
        .route("/:id", delete(agents::delete_agent_handler))
        .route("/:id/activate", post(agents::activate_agent_handler))
        .route("/:id/deactivate", post(agents::deactivate_agent_handler))
        .route("/:id/train", post(agents::train_agent_handler))
        .route("/:id/analytics", get(agents::agent_analytics_handler))
        .route("/:id/skills", get(agents::get_agent_skills_handler))
        .route("/:id/skills", post(agents::add_agent_skill_handler));

    let chat_routes = Router::new()
        .route("/conversations", get(chat::list_conversations_handler))
        .route("/conversations", post(chat::create_conversation_handler))
        .route("/conversations/:id", get(chat::get_conversation_handler))
        .route(
            "/conversations/:id",
            delete(chat::delete_conversation_handler),
        )
        .route(
            "/conversations/:id/title",
            put(chat::update_conversation_title_handler),
        )
        .route(
            "/conversations/:id/messages",
            get(chat::list_messages_handler),
        )
        .route(
            "/conversations/:id/messages",
            post(chat::send_message_handler),
        );

    let data_routes = Router::new()
        .route("/datasets", get(data::list_datasets_handler))
        .route("/datasets", post(data::create_dataset_handler))
        .route("/datasets/:id", get(data::get_dataset_handler))
        .route("/datasets/:id/upload", post(data::upload_dataset_handler))
        .route("/datasets/:id/process", post(data::process_dataset_handler))
        .route("/knowledge-bases", get(data::list_knowledge_bases_handler))
        .route("/knowledge-bases", post(data::create_knowledge_base_handler))
        .route("/knowledge-bases/:id", get(data::get_knowledge_base_handler))
        .route(
            "/knowledge-bases/:id/documents",
            post(data::add_document_handler),
        )
        .route(
            "/knowledge-bases/:id/search",
            post(data::search_knowledge_base_handler),
        )
        .route("/analytics/overview", get(data::analytics_overview_handler))
        .route("/analytics/usage", get(data::analytics_usage_handler));

    let workflow_routes = Router::new()
        .route("/", get(workflows::list_workflows_handler))
        .route("/", post(workflows::create_workflow_handler))
        .route("/executions/:id", get(workflows::get_execution_handler))
        .route("/executions/:id/stop", post(workflows::stop_execution_handler))
        .route("/webhooks/:id", post(workflows::engine_webhook_handler))
        .route("/:id", get(workflows::get_workflow_handler))
        .route("/:id", put(workflows::update_workflow_handler))
        .route("/:id", delete(workflows::delete_workflow_handler))
        .route("/:id/execute", post(workflows::execute_workflow_handler))
        .route("/:id/executions", get(workflows::list_executions_handler))
        .route("/:id/activate", post(workflows::activate_workflow_handler))
        .route(
            "/:id/deactivate",
            post(workflows::deactivate_workflow_handler),
        );

    // Host-platform compatibility endpoints (static responses, no envelope)
    let compat_routes = Router::new()
        .route("/v1/features", get(compat::features_handler))
        .route("/v1/console/features", get(compat::console_features_handler))
        .route(
            "/v1/console/account/init",
            get(compat::account_init_handler),
        )
        .route("/v1/console/settings", get(compat::console_settings_handler))
        .route("/v1/auth/settings", get(compat::auth_settings_handler))
        .route("/api/v1/features", get(compat::features_handler))
        .route(
            "/api/v1/console/features",
            get(compat::console_features_handler),
        )
        .route(
            "/api/v1/console/account/init",
            get(compat::account_init_handler),
        );

    Router::new()
        .route("/", get(basic::index_handler))
        .route("/api/health", get(basic::health_handler))
        .nest("/api/alphamind/agents", agent_routes)
        .nest("/api/alphamind/chat", chat_routes)
        .nest("/api/alphamind/data", data_routes)
        .nest("/api/alphamind/workflows", workflow_routes)
        .merge(compat_routes)
        .fallback(unknown_route_handler)
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_SIZE))
        .with_state(state)
}

/// Unknown routes get the envelope too.
async fn unknown_route_handler() -> ErrorResponse {
    ErrorResponse::not_found("API endpoint")
}
