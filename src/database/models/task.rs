use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored task. The owner is fixed at creation and never changes through
/// the exposed operations.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a task. `title` stays optional here so a missing value
/// reaches the store's NOT NULL constraint instead of being rejected up front.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: Option<String>,
    pub description: String,
    pub completed: bool,
    pub owner: Uuid,
}
