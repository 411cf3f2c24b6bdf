// src/store/users.rs

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::models::{PersonBrief, ROLE_LAWYER};
use crate::store::StoreError;

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn count_all(&self) -> Result<i64, StoreError>;
    async fn count_by_role(&self, role: i16) -> Result<i64, StoreError>;
    /// Active lawyers as briefs, for the per-lawyer activity report.
    async fn find_lawyers(&self) -> Result<Vec<PersonBrief>, StoreError>;
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PostgresUserRepository {
    async fn count_all(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM app_user"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_by_role(&self, role: i16) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM app_user WHERE role = $1"#)
            .bind(role)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_lawyers(&self) -> Result<Vec<PersonBrief>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, full_name, email
            FROM app_user
            WHERE role = $1 AND is_active = true
            ORDER BY full_name
            "#,
        )
        .bind(ROLE_LAWYER)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| {
                Ok(PersonBrief {
                    id: r.try_get("user_id")?,
                    display: r.try_get("full_name")?,
                    email: r.try_get("email").ok(),
                })
            })
            .collect()
    }
}
