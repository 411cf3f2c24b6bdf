// src/store/documents.rs

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::models::DocumentTypeStat;
use crate::store::StoreError;

#[async_trait]
pub trait DocumentRepo: Send + Sync {
    async fn count_all(&self) -> Result<i64, StoreError>;
    /// Per MIME type: how many documents and their summed size.
    async fn stats_by_mime_type(&self) -> Result<Vec<DocumentTypeStat>, StoreError>;
}

pub struct PostgresDocumentRepository {
    pool: PgPool,
}

impl PostgresDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepo for PostgresDocumentRepository {
    async fn count_all(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM document"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn stats_by_mime_type(&self) -> Result<Vec<DocumentTypeStat>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT mime_type, COUNT(*) AS count, COALESCE(SUM(size_bytes), 0)::bigint AS total_size
            FROM document
            GROUP BY mime_type
            ORDER BY mime_type
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| {
                Ok(DocumentTypeStat {
                    mime_type: r.try_get("mime_type")?,
                    count: r.try_get("count")?,
                    total_size_bytes: r.try_get("total_size")?,
                })
            })
            .collect()
    }
}
