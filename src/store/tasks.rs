// src/store/tasks.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::models::{PersonBrief, StatusCount, TaskSummary};
use crate::store::StoreError;

/// Tasks in this status are never reported as overdue.
pub const TASK_STATUS_COMPLETED: &str = "COMPLETADA";

#[async_trait]
pub trait TaskRepo: Send + Sync {
    async fn count_all(&self) -> Result<i64, StoreError>;
    /// Tasks whose due date has passed and that are not completed.
    async fn find_overdue(&self, now: DateTime<Utc>) -> Result<Vec<TaskSummary>, StoreError>;
    async fn count_by_status(&self) -> Result<Vec<StatusCount>, StoreError>;
    async fn count_by_lawyer(&self) -> Result<Vec<(Uuid, i64)>, StoreError>;
}

pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepo for PostgresTaskRepository {
    async fn count_all(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM task"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> Result<Vec<TaskSummary>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
              t.task_id,
              t.title,
              t.status,
              t.due_at,
              t.created_at,

              l.user_id   AS l_id,
              l.full_name AS l_name,
              l.email     AS l_email

            FROM task t
            LEFT JOIN app_user l ON l.user_id = t.assigned_lawyer_id
            WHERE t.due_at < $1
              AND t.status <> $2
            ORDER BY t.due_at ASC
            "#,
        )
        .bind(now)
        .bind(TASK_STATUS_COMPLETED)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_task).collect()
    }

    async fn count_by_status(&self) -> Result<Vec<StatusCount>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT status, COUNT(*) AS count
            FROM task
            GROUP BY status
            ORDER BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| {
                Ok(StatusCount {
                    status: r.try_get("status")?,
                    count: r.try_get("count")?,
                })
            })
            .collect()
    }

    async fn count_by_lawyer(&self) -> Result<Vec<(Uuid, i64)>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT assigned_lawyer_id, COUNT(*) AS count
            FROM task
            WHERE assigned_lawyer_id IS NOT NULL
            GROUP BY assigned_lawyer_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| Ok((r.try_get("assigned_lawyer_id")?, r.try_get("count")?)))
            .collect()
    }
}

fn row_to_task(r: &PgRow) -> Result<TaskSummary, StoreError> {
    let assigned_lawyer = match r.try_get::<Option<Uuid>, _>("l_id")? {
        Some(id) => Some(PersonBrief {
            id,
            display: r.try_get("l_name")?,
            email: r.try_get("l_email").ok(),
        }),
        None => None,
    };

    Ok(TaskSummary {
        task_id: r.try_get("task_id")?,
        title: r.try_get("title")?,
        status: r.try_get("status")?,
        due_at: r.try_get("due_at").ok(),
        assigned_lawyer,
        created_at: r.try_get("created_at")?,
    })
}
