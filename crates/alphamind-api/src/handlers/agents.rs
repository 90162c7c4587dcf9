//! Agent management handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use alphamind_storage::{Agent, AgentFilter, AgentStatus};

use super::common::{
    ok, ok_message, ok_with_message, optional_str, optional_str_list, require_str,
    user_id_or_default, HandlerResult,
};
use super::ServerState;
use crate::models::ErrorResponse;

/// Agent info for API responses.
#[derive(Debug, Serialize)]
pub struct AgentDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub avatar: String,
    pub category: String,
    pub status: AgentStatus,
    pub user_id: String,
    pub config: Value,
    pub skills: Vec<String>,
    pub knowledge_bases: Vec<String>,
    pub system_prompt: String,
    pub usage_count: u64,
    pub success_rate: f64,
    pub created_at: String,
    pub updated_at: String,
    pub last_used: Option<String>,
}

impl From<Agent> for AgentDto {
    fn from(agent: Agent) -> Self {
        Self {
            id: agent.id,
            name: agent.name,
            description: agent.description,
            avatar: agent.avatar,
            category: agent.category,
            status: agent.status,
            user_id: agent.user_id,
            config: agent.config,
            skills: agent.skills,
            knowledge_bases: agent.knowledge_bases,
            system_prompt: agent.system_prompt,
            usage_count: agent.usage_count,
            success_rate: agent.success_rate,
            created_at: format_timestamp(agent.created_at),
            updated_at: format_timestamp(agent.updated_at),
            last_used: agent.last_used.map(format_timestamp),
        }
    }
}

pub(crate) fn format_timestamp(ts: i64) -> String {
    use chrono::DateTime;
    DateTime::from_timestamp(ts, 0)
        .unwrap_or_default()
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

/// Query parameters for listing agents.
#[derive(Debug, Deserialize)]
pub struct AgentListQuery {
    pub user_id: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    20
}

fn parse_status(s: &str) -> Result<AgentStatus, ErrorResponse> {
    match s {
        "draft" => Ok(AgentStatus::Draft),
        "active" => Ok(AgentStatus::Active),
        "inactive" => Ok(AgentStatus::Inactive),
        "training" => Ok(AgentStatus::Training),
        other => Err(ErrorResponse::bad_request(format!(
            "unknown agent status '{}'",
            other
        ))),
    }
}

/// List agents for a user.
///
/// GET /api/alphamind/agents?status=active&category=assistant&search=bot
pub async fn list_agents_handler(
    Query(query): Query<AgentListQuery>,
    State(state): State<ServerState>,
) -> HandlerResult<Vec<AgentDto>> {
    let status = query.status.as_deref().map(parse_status).transpose()?;

    let agents = state
        .agents
        .query_agents(AgentFilter {
            user_id: Some(query.user_id.unwrap_or_else(|| "default_user".to_string())),
            status,
            category: query.category,
            search: query.search,
            limit: Some(query.limit),
            offset: Some(query.page.saturating_sub(1) * query.limit),
        })
        .await?;

    ok_with_message(
        agents.into_iter().map(AgentDto::from).collect(),
        "Agents retrieved successfully",
    )
}

/// Create a new agent.
///
/// POST /api/alphamind/agents
pub async fn create_agent_handler(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> HandlerResult<AgentDto> {
    let name = require_str(&body, "name")?;
    let category = require_str(&body, "category")?;

    let mut agent = Agent::new(user_id_or_default(&body), name, category);
    if let Some(description) = optional_str(&body, "description") {
        agent.description = description.to_string();
    }
    if let Some(avatar) = optional_str(&body, "avatar") {
        agent.avatar = avatar.to_string();
    }
    if let Some(system_prompt) = optional_str(&body, "system_prompt") {
        agent.system_prompt = system_prompt.to_string();
    }
    if let Some(status) = optional_str(&body, "status") {
        agent.status = parse_status(status)?;
    }
    if let Some(config) = body.get("config") {
        agent.config = config.clone();
    }
    agent.skills = optional_str_list(&body, "skills");
    agent.knowledge_bases = optional_str_list(&body, "knowledge_bases");

    state.agents.create_agent(&agent).await?;

    ok_with_message(AgentDto::from(agent), "Agent created successfully")
}

/// Get a specific agent.
///
/// GET /api/alphamind/agents/:id
pub async fn get_agent_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<AgentDto> {
    let agent = state
        .agents
        .get_agent(&id)
        .await?
        .ok_or_else(|| ErrorResponse::not_found("Agent"))?;

    ok(AgentDto::from(agent))
}

/// Update an agent field-by-field.
///
/// PUT /api/alphamind/agents/:id
pub async fn update_agent_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> HandlerResult<AgentDto> {
    let mut agent = state
        .agents
        .get_agent(&id)
        .await?
        .ok_or_else(|| ErrorResponse::not_found("Agent"))?;

    if let Some(name) = optional_str(&body, "name") {
        agent.name = name.to_string();
    }
    if let Some(description) = optional_str(&body, "description") {
        agent.description = description.to_string();
    }
    if let Some(avatar) = optional_str(&body, "avatar") {
        agent.avatar = avatar.to_string();
    }
    if let Some(category) = optional_str(&body, "category") {
        agent.category = category.to_string();
    }
    if let Some(status) = optional_str(&body, "status") {
        agent.status = parse_status(status)?;
    }
    if let Some(system_prompt) = optional_str(&body, "system_prompt") {
        agent.system_prompt = system_prompt.to_string();
    }
    if let Some(config) = body.get("config") {
        agent.config = config.clone();
    }
    if body.get("skills").is_some() {
        agent.skills = optional_str_list(&body, "skills");
    }
    if body.get("knowledge_bases").is_some() {
        agent.knowledge_bases = optional_str_list(&body, "knowledge_bases");
    }
    agent.updated_at = chrono::Utc::now().timestamp();

    state.agents.update_agent(&agent).await?;

    ok_with_message(AgentDto::from(agent), "Agent updated successfully")
}

/// Delete an agent.
///
/// DELETE /api/alphamind/agents/:id
pub async fn delete_agent_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<Value> {
    if !state.agents.delete_agent(&id).await? {
        return Err(ErrorResponse::not_found("Agent"));
    }
    ok_message("Agent deleted successfully")
}

/// Activate an agent.
///
/// POST /api/alphamind/agents/:id/activate
pub async fn activate_agent_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<Value> {
    if !state.agents.set_status(&id, AgentStatus::Active).await? {
        return Err(ErrorResponse::not_found("Agent"));
    }
    ok_message("Agent activated successfully")
}

/// Deactivate an agent.
///
/// POST /api/alphamind/agents/:id/deactivate
pub async fn deactivate_agent_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<Value> {
    if !state.agents.set_status(&id, AgentStatus::Inactive).await? {
        return Err(ErrorResponse::not_found("Agent"));
    }
    ok_message("Agent deactivated successfully")
}

/// Put an agent into training.
///
/// POST /api/alphamind/agents/:id/train
pub async fn train_agent_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<Value> {
    if !state.agents.set_status(&id, AgentStatus::Training).await? {
        return Err(ErrorResponse::not_found("Agent"));
    }
    ok_message("Agent training started")
}

/// Query parameters for the analytics endpoint.
#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    30
}

/// Agent performance analytics.
///
/// GET /api/alphamind/agents/:id/analytics?days=30
pub async fn agent_analytics_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<AnalyticsQuery>,
) -> HandlerResult<Value> {
    let agent = state
        .agents
        .get_agent(&id)
        .await?
        .ok_or_else(|| ErrorResponse::not_found("Agent"))?;

    // Static analytics shape; only the counters are live.
    ok(json!({
        "agent_id": agent.id,
        "period_days": query.days,
        "executions": agent.usage_count,
        "success_rate": agent.success_rate,
        "response_time_avg": 1.2,
        "satisfaction_score": 4.5,
        "usage_trend": [10, 15, 12, 18, 20, 25, 22],
    }))
}

/// List an agent's skills.
///
/// GET /api/alphamind/agents/:id/skills
pub async fn get_agent_skills_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> HandlerResult<Vec<String>> {
    let agent = state
        .agents
        .get_agent(&id)
        .await?
        .ok_or_else(|| ErrorResponse::not_found("Agent"))?;

    ok(agent.skills)
}

/// Add a skill to an agent.
///
/// POST /api/alphamind/agents/:id/skills
pub async fn add_agent_skill_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> HandlerResult<Value> {
    let skill = require_str(&body, "skill_id")?;

    if !state.agents.add_skill(&id, skill).await? {
        return Err(ErrorResponse::not_found("Agent"));
    }
    ok_message("Skill added successfully")
}

/// Query parameters for agent stats.
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub user_id: Option<String>,
}

/// Aggregate counters for a user's agents.
///
/// GET /api/alphamind/agents/stats
pub async fn agent_stats_handler(
    State(state): State<ServerState>,
    Query(query): Query<StatsQuery>,
) -> HandlerResult<Value> {
    let user_id = query.user_id.unwrap_or_else(|| "default_user".to_string());
    let stats = state.agents.stats(&user_id).await?;

    ok(json!({
        "total_agents": stats.total_agents,
        "active_agents": stats.active_agents,
        "total_executions": stats.total_executions,
        "avg_success_rate": stats.avg_success_rate,
    }))
}
