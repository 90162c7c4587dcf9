//! Workflow engine handlers.
//!
//! Workflow definitions live on the external engine; these handlers proxy
//! metadata calls through [`EngineClient`] and keep execution rows local via
//! [`WorkflowRunner`].

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use alphamind_storage::{ExecutionFilter, ExecutionStatus, WorkflowExecution};
use alphamind_workflow::ExecuteRequest;

use super::agents::format_timestamp;
use super::common::{ok, ok_message, ok_with_message, optional_str, require_str, HandlerResult};
use super::ServerState;
use crate::models::{ErrorResponse, PaginationQuery};

/// Workflow execution info for API responses.
#[derive(Debug, Serialize)]
pub struct ExecutionDto {
    pub id: String,
    pub workflow_id: String,
    pub workflow_name: Option<String>,
    pub agent_id: Option<String>,
    pub conversation_id: Option<String>,
    pub status: ExecutionStatus,
    pub input_data: Value,
    pub output_data: Option<Value>,
    pub error_message: Option<String>,
    pub execution_time_ms: Option<u64>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl From<WorkflowExecution> for ExecutionDto {
    fn from(execution: WorkflowExecution) -> Self {
        Self {
            id: execution.id,
            workflow_id: execution.workflow_id,
            workflow_name: execution.workflow_name,
            agent_id: execution.agent_id,
            conversation_id: execution.conversation_id,
            status: execution.status,
            input_data: execution.input_data,
            output_data: execution.output_data,
            error_message: execution.error_message,
            execution_time_ms: execution.execution_time_ms,
            created_at: format_timestamp(execution.created_at),
            completed_at: execution.completed_at.map(format_timestamp),
        }
    }
}

/// List workflows known to the engine.
///
/// GET /api/alphamind/workflows
pub async fn list_workflows_handler(
    State(state): State<ServerState>,
) -> HandlerResult<Value> {
    let workflows = state.engine.list_workflows().await?;
    ok_with_message(
        json!({
            "count": workflows.len(),
            "workflows": workflows,
        }),
        "Workflows retrieved successfully",
    )
}

/// Create a workflow on the engine.
///
/// POST /api/alphamind/workflows
pub async fn create_workflow_handler(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> HandlerResult<Value> {
    require_str(&body, "name")?;

    let created = state.engine.create_workflow(&body).await?;
    ok_with_message(created, "Workflow created successfully")
}

/// Get a workflow from the engine.
///
/// GET /api/alphamind/workflows/:id
pub async fn get_workflow_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<Value> {
    let workflow = state
        .engine
        .get_workflow(&id)
        .await?
        .ok_or_else(|| ErrorResponse::not_found("Workflow"))?;

    ok(workflow)
}

/// Update a workflow on the engine.
///
/// PUT /api/alphamind/workflows/:id
pub async fn update_workflow_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> HandlerResult<Value> {
    let updated = state.engine.update_workflow(&id, &body).await?;
    ok_with_message(updated, "Workflow updated successfully")
}

/// Delete a workflow from the engine.
///
/// DELETE /api/alphamind/workflows/:id
pub async fn delete_workflow_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<Value> {
    if !state.engine.delete_workflow(&id).await? {
        return Err(ErrorResponse::not_found("Workflow"));
    }
    ok_message("Workflow deleted successfully")
}

/// Execute a workflow, tracking the run locally.
///
/// POST /api/alphamind/workflows/:id/execute
///
/// The response always carries a terminal execution row; an unreachable
/// engine shows up as `status: "failed"` with a populated `error_message`.
pub async fn execute_workflow_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Option<Json<Value>>,
) -> HandlerResult<ExecutionDto> {
    let body = body.map(|Json(body)| body).unwrap_or_else(|| json!({}));
    let input_data = body.get("input_data").cloned().unwrap_or_else(|| json!({}));

    let execution = state
        .runner
        .execute(ExecuteRequest {
            workflow_id: id,
            workflow_name: optional_str(&body, "workflow_name").map(str::to_string),
            input_data,
            agent_id: optional_str(&body, "agent_id").map(str::to_string),
            conversation_id: optional_str(&body, "conversation_id").map(str::to_string),
        })
        .await?;

    ok_with_message(ExecutionDto::from(execution), "Workflow execution finished")
}

/// Query parameters for listing executions.
#[derive(Debug, Deserialize)]
pub struct ExecutionListQuery {
    pub status: Option<String>,
}

/// List tracked executions of a workflow.
///
/// GET /api/alphamind/workflows/:id/executions?status=failed&page=1&limit=20
pub async fn list_executions_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<ExecutionListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> HandlerResult<Vec<ExecutionDto>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<ExecutionStatus>)
        .transpose()
        .map_err(|e| ErrorResponse::bad_request(e.to_string()))?;

    let executions = state
        .runner
        .list(ExecutionFilter {
            workflow_id: Some(id),
            status,
            limit: Some(pagination.limit),
            offset: Some(pagination.offset()),
        })
        .await?;

    ok_with_message(
        executions.into_iter().map(ExecutionDto::from).collect(),
        "Workflow executions retrieved successfully",
    )
}

/// Get a tracked execution.
///
/// GET /api/alphamind/workflows/executions/:id
pub async fn get_execution_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<ExecutionDto> {
    let execution = state
        .runner
        .get(&id)
        .await?
        .ok_or_else(|| ErrorResponse::not_found("Execution"))?;

    ok(ExecutionDto::from(execution))
}

/// Cancel a running execution.
///
/// POST /api/alphamind/workflows/executions/:id/stop
pub async fn stop_execution_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<ExecutionDto> {
    let execution = state.runner.cancel(&id).await?;
    ok_with_message(ExecutionDto::from(execution), "Execution stopped successfully")
}

/// Activate a workflow on the engine.
///
/// POST /api/alphamind/workflows/:id/activate
pub async fn activate_workflow_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<Value> {
    if !state.engine.set_active(&id, true).await? {
        return Err(ErrorResponse::not_found("Workflow"));
    }
    ok_message("Workflow activated successfully")
}

/// Deactivate a workflow on the engine.
///
/// POST /api/alphamind/workflows/:id/deactivate
pub async fn deactivate_workflow_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<Value> {
    if !state.engine.set_active(&id, false).await? {
        return Err(ErrorResponse::not_found("Workflow"));
    }
    ok_message("Workflow deactivated successfully")
}

/// Handle an inbound webhook from the engine.
///
/// POST /api/alphamind/workflows/webhooks/:webhook_id
pub async fn engine_webhook_handler(
    Path(webhook_id): Path<String>,
    body: Option<Json<Value>>,
) -> HandlerResult<Value> {
    let payload = body.map(|Json(body)| body).unwrap_or_else(|| json!({}));
    tracing::info!(webhook_id = %webhook_id, "Engine webhook received");

    ok_with_message(
        json!({
            "webhook_id": webhook_id,
            "received": payload,
        }),
        "Webhook handled successfully",
    )
}
