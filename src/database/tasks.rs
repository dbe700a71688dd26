use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{NewTask, Task};
use crate::database::DatabaseError;

const TASK_COLUMNS: &str = "id, title, description, completed, owner, created_at";

/// Owns the SQL for the tasks table. Constructed per request from the shared
/// pool handle.
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of tasks, newest first. Negative offsets or limits are passed
    /// through and rejected by the store, matching the unvalidated inputs of
    /// the list operation.
    pub async fn list_page(&self, limit: i64, offset: i64) -> Result<Vec<Task>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM tasks ORDER BY created_at DESC OFFSET $1 LIMIT $2",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn insert(&self, new: NewTask) -> Result<Task, DatabaseError> {
        let sql = format!(
            "INSERT INTO tasks (title, description, completed, owner)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(new.title)
            .bind(new.description)
            .bind(new.completed)
            .bind(new.owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    pub async fn fetch(&self, id: Uuid) -> Result<Option<Task>, DatabaseError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    /// Persist the mutable fields of an already-fetched task. `owner` and
    /// `created_at` are not part of the SET list.
    pub async fn update(&self, task: &Task) -> Result<Task, DatabaseError> {
        let sql = format!(
            "UPDATE tasks SET title = $2, description = $3, completed = $4
             WHERE id = $1
             RETURNING {}",
            TASK_COLUMNS
        );
        let updated = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.completed)
            .fetch_one(&self.pool)
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
