//! Agent storage.
//!
//! Agents are user-created assistants with a category, a skill list and a
//! free-form model configuration. Names are unique across the store.

use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::Error;

const AGENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("agents");

/// Agent store backed by redb.
pub struct AgentStore {
    db: Arc<Database>,
}

/// An agent definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Unique agent ID
    pub id: String,
    /// Agent name (unique across the store)
    pub name: String,
    /// User-provided description
    #[serde(default)]
    pub description: String,
    /// Short emoji avatar
    #[serde(default = "default_avatar")]
    pub avatar: String,
    /// Category (e.g. "assistant", "automation")
    pub category: String,
    /// Agent status
    pub status: AgentStatus,
    /// Owning user reference
    pub user_id: String,
    /// Free-form model configuration
    #[serde(default)]
    pub config: serde_json::Value,
    /// Skill identifiers
    #[serde(default)]
    pub skills: Vec<String>,
    /// Knowledge base references
    #[serde(default)]
    pub knowledge_bases: Vec<String>,
    /// System prompt used when the agent drives a conversation
    #[serde(default)]
    pub system_prompt: String,
    /// Total invocations
    #[serde(default)]
    pub usage_count: u64,
    /// Rolling success rate (0-100)
    #[serde(default)]
    pub success_rate: f64,
    /// Creation timestamp
    pub created_at: i64,
    /// Last update timestamp
    pub updated_at: i64,
    /// Last invocation timestamp
    pub last_used: Option<i64>,
}

fn default_avatar() -> String {
    "\u{1F916}".to_string()
}

/// Agent status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Newly created, not yet activated
    Draft,
    /// Active and usable
    Active,
    /// Deactivated by the user
    Inactive,
    /// Training in progress
    Training,
}

impl Agent {
    /// Create a new draft agent with generated id and timestamps.
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            avatar: default_avatar(),
            category: category.into(),
            status: AgentStatus::Draft,
            user_id: user_id.into(),
            config: serde_json::Value::Object(Default::default()),
            skills: Vec::new(),
            knowledge_bases: Vec::new(),
            system_prompt: String::new(),
            usage_count: 0,
            success_rate: 0.0,
            created_at: now,
            updated_at: now,
            last_used: None,
        }
    }
}

/// Query filter for agents.
#[derive(Debug, Clone, Default)]
pub struct AgentFilter {
    /// Filter by owning user
    pub user_id: Option<String>,
    /// Filter by status
    pub status: Option<AgentStatus>,
    /// Filter by category
    pub category: Option<String>,
    /// Substring match against name/description
    pub search: Option<String>,
    /// Maximum number of results
    pub limit: Option<usize>,
    /// Offset for pagination
    pub offset: Option<usize>,
}

/// Aggregate counters over a user's agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStats {
    pub total_agents: usize,
    pub active_agents: usize,
    pub total_executions: u64,
    pub avg_success_rate: f64,
}

impl AgentStore {
    /// Open or create an agent store at the given path.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Arc<Self>, Error> {
        let db = Database::create(path)?;
        let write_txn = db.begin_write()?;
        write_txn.open_table(AGENTS_TABLE)?;
        write_txn.commit()?;
        Ok(Arc::new(Self { db: Arc::new(db) }))
    }

    /// Create an in-memory agent store for testing.
    pub fn memory() -> Result<Arc<Self>, Error> {
        let temp_path =
            std::env::temp_dir().join(format!("agents_test_{}.redb", uuid::Uuid::new_v4()));
        Self::open(temp_path)
    }

    /// Insert a new agent. Fails with [`Error::Conflict`] if the name is taken.
    pub async fn create_agent(&self, agent: &Agent) -> Result<(), Error> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(AGENTS_TABLE)?;

            for item in table.iter()? {
                let (_id, bytes) = item?;
                let existing: Agent = serde_json::from_slice(bytes.value())?;
                if existing.name == agent.name {
                    return Err(Error::Conflict(format!(
                        "agent name '{}' already exists",
                        agent.name
                    )));
                }
            }

            let value = serde_json::to_vec(agent)?;
            table.insert(agent.id.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get an agent by ID.
    pub async fn get_agent(&self, id: &str) -> Result<Option<Agent>, Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(AGENTS_TABLE)?;

        match table.get(id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes.value())?)),
            None => Ok(None),
        }
    }

    /// Query agents with filters, newest-updated first.
    pub async fn query_agents(&self, filter: AgentFilter) -> Result<Vec<Agent>, Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(AGENTS_TABLE)?;

        let mut agents = Vec::new();
        for item in table.iter()? {
            let (_id, bytes) = item?;
            let agent: Agent = serde_json::from_slice(bytes.value())?;
            if self.matches_filter(&agent, &filter) {
                agents.push(agent);
            }
        }

        agents.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        if let Some(offset) = filter.offset {
            if offset < agents.len() {
                agents = agents.into_iter().skip(offset).collect();
            } else {
                agents.clear();
            }
        }
        if let Some(limit) = filter.limit {
            agents.truncate(limit);
        }

        Ok(agents)
    }

    /// Overwrite an existing agent row. The caller is expected to have
    /// refreshed `updated_at`.
    pub async fn update_agent(&self, agent: &Agent) -> Result<(), Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(AGENTS_TABLE)?;
        if table.get(agent.id.as_str())?.is_none() {
            return Err(Error::NotFound(format!("Agent {} not found", agent.id)));
        }
        drop(table);
        drop(read_txn);

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(AGENTS_TABLE)?;
            let value = serde_json::to_vec(agent)?;
            table.insert(agent.id.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Update agent status. Returns false if the agent does not exist.
    pub async fn set_status(&self, id: &str, status: AgentStatus) -> Result<bool, Error> {
        let mut agent = match self.get_agent(id).await? {
            Some(agent) => agent,
            None => return Ok(false),
        };
        agent.status = status;
        agent.updated_at = chrono::Utc::now().timestamp();
        self.update_agent(&agent).await?;
        Ok(true)
    }

    /// Record an invocation: bump the usage counter and success rate.
    pub async fn record_usage(&self, id: &str, success: bool) -> Result<(), Error> {
        let mut agent = self
            .get_agent(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Agent {} not found", id)))?;

        agent.usage_count += 1;
        let successes = agent.success_rate / 100.0 * (agent.usage_count - 1) as f64
            + if success { 1.0 } else { 0.0 };
        agent.success_rate = successes / agent.usage_count as f64 * 100.0;
        agent.last_used = Some(chrono::Utc::now().timestamp());
        agent.updated_at = chrono::Utc::now().timestamp();
        self.update_agent(&agent).await
    }

    /// Add a skill to an agent, ignoring duplicates.
    pub async fn add_skill(&self, id: &str, skill: &str) -> Result<bool, Error> {
        let mut agent = match self.get_agent(id).await? {
            Some(agent) => agent,
            None => return Ok(false),
        };
        if !agent.skills.iter().any(|s| s == skill) {
            agent.skills.push(skill.to_string());
            agent.updated_at = chrono::Utc::now().timestamp();
            self.update_agent(&agent).await?;
        }
        Ok(true)
    }

    /// Delete an agent by ID. Returns false if it did not exist.
    pub async fn delete_agent(&self, id: &str) -> Result<bool, Error> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(AGENTS_TABLE)?;
            let existed = table.remove(id)?.is_some();
            existed
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Aggregate counters for a user's agents.
    pub async fn stats(&self, user_id: &str) -> Result<AgentStats, Error> {
        let agents = self
            .query_agents(AgentFilter {
                user_id: Some(user_id.to_string()),
                ..Default::default()
            })
            .await?;

        let total_agents = agents.len();
        let active_agents = agents
            .iter()
            .filter(|a| a.status == AgentStatus::Active)
            .count();
        let total_executions: u64 = agents.iter().map(|a| a.usage_count).sum();
        let avg_success_rate = if total_agents > 0 {
            agents.iter().map(|a| a.success_rate).sum::<f64>() / total_agents as f64
        } else {
            0.0
        };

        Ok(AgentStats {
            total_agents,
            active_agents,
            total_executions,
            avg_success_rate: (avg_success_rate * 10.0).round() / 10.0,
        })
    }

    fn matches_filter(&self, agent: &Agent, filter: &AgentFilter) -> bool {
        if let Some(user_id) = &filter.user_id {
            if &agent.user_id != user_id {
                return false;
            }
        }

        if let Some(status) = filter.status {
            if agent.status != status {
                return false;
            }
        }

        if let Some(category) = &filter.category {
            if category != "all" && &agent.category != category {
                return false;
            }
        }

        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            if !agent.name.to_lowercase().contains(&needle)
                && !agent.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        true
    }
}
