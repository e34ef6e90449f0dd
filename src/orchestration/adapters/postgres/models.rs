//! Diesel row models for orchestration persistence.

use super::schema::{epics, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for epic records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = epics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EpicRow {
    /// Epic identifier.
    pub id: uuid::Uuid,
    /// Owning user identifier.
    pub user_id: uuid::Uuid,
    /// Repository JSON payload.
    pub repository: Value,
    /// Human-readable title.
    pub title: String,
    /// Free-text prompt.
    pub prompt: String,
    /// Base branch name.
    pub base_branch: String,
    /// Lifecycle status.
    pub status: String,
    /// Optional LLM credential payload.
    pub llm_credential: Option<Value>,
    /// Optional agent-launch credential payload.
    pub agent_credential: Option<Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert/update model for epic records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = epics)]
pub struct NewEpicRow {
    /// Epic identifier.
    pub id: uuid::Uuid,
    /// Owning user identifier.
    pub user_id: uuid::Uuid,
    /// Repository JSON payload.
    pub repository: Value,
    /// Human-readable title.
    pub title: String,
    /// Free-text prompt.
    pub prompt: String,
    /// Base branch name.
    pub base_branch: String,
    /// Lifecycle status.
    pub status: String,
    /// Optional LLM credential payload.
    pub llm_credential: Option<Value>,
    /// Optional agent-launch credential payload.
    pub agent_credential: Option<Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning epic identifier.
    pub epic_id: uuid::Uuid,
    /// Task description.
    pub description: String,
    /// Zero-based ordering key.
    pub position: i32,
    /// Lifecycle status.
    pub status: String,
    /// External agent identifier once launched.
    pub agent_id: Option<String>,
    /// Work-branch name once launched.
    pub branch_name: Option<String>,
    /// Pull-request URL once reported.
    pub pr_url: Option<String>,
    /// Append-only debug log text.
    pub debug_log: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert/update model for task records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning epic identifier.
    pub epic_id: uuid::Uuid,
    /// Task description.
    pub description: String,
    /// Zero-based ordering key.
    pub position: i32,
    /// Lifecycle status.
    pub status: String,
    /// External agent identifier once launched.
    pub agent_id: Option<String>,
    /// Work-branch name once launched.
    pub branch_name: Option<String>,
    /// Pull-request URL once reported.
    pub pr_url: Option<String>,
    /// Append-only debug log text.
    pub debug_log: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
