// src/store/cases.rs

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::models::{CaseSummary, PersonBrief, StatusCount};
use crate::store::StoreError;

#[async_trait]
pub trait CaseRepo: Send + Sync {
    async fn count_all(&self) -> Result<i64, StoreError>;
    /// Newest cases first, with client and lawyer denormalized.
    async fn find_recent(&self, limit: i64) -> Result<Vec<CaseSummary>, StoreError>;
    async fn count_by_status(&self) -> Result<Vec<StatusCount>, StoreError>;
    async fn count_by_lawyer(&self) -> Result<Vec<(Uuid, i64)>, StoreError>;
}

pub struct PostgresCaseRepository {
    pool: PgPool,
}

impl PostgresCaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaseRepo for PostgresCaseRepository {
    async fn count_all(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM legal_case"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_recent(&self, limit: i64) -> Result<Vec<CaseSummary>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
              k.case_id,
              k.title,
              k.status,
              k.created_at,

              c.user_id   AS c_id,
              c.full_name AS c_name,
              c.email     AS c_email,

              l.user_id   AS l_id,
              l.full_name AS l_name,
              l.email     AS l_email

            FROM legal_case k
            JOIN app_user c ON c.user_id = k.client_id
            JOIN app_user l ON l.user_id = k.lawyer_id
            ORDER BY k.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_case).collect()
    }

    async fn count_by_status(&self) -> Result<Vec<StatusCount>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT status, COUNT(*) AS count
            FROM legal_case
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
            SELECT lawyer_id, COUNT(*) AS count
            FROM legal_case
            GROUP BY lawyer_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| Ok((r.try_get("lawyer_id")?, r.try_get("count")?)))
            .collect()
    }
}

fn row_to_case(r: &PgRow) -> Result<CaseSummary, StoreError> {
    Ok(CaseSummary {
        case_id: r.try_get("case_id")?,
        title: r.try_get("title")?,
        status: r.try_get("status")?,
        client: PersonBrief {
            id: r.try_get("c_id")?,
            display: r.try_get("c_name")?,
            email: r.try_get("c_email").ok(),
        },
        lawyer: PersonBrief {
            id: r.try_get("l_id")?,
            display: r.try_get("l_name")?,
            email: r.try_get("l_email").ok(),
        },
        created_at: r.try_get("created_at")?,
    })
}
