// src/store/visitor_appointments.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::models::{PersonBrief, VisitorAppointment};
use crate::store::StoreError;

/// Partial update for a visitor booking. Nested Options allow clearing the
/// nullable columns (confirmed/alternative date, assigned lawyer, age).
#[derive(Debug, Default, Clone)]
pub struct VisitorAppointmentPatch {
    pub status: Option<String>,
    pub preferred_date: Option<DateTime<Utc>>,
    pub confirmed_date: Option<Option<DateTime<Utc>>>,
    pub alternative_date: Option<Option<DateTime<Utc>>>,
    pub assigned_lawyer_id: Option<Option<Uuid>>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub age: Option<Option<i32>>,
    pub consultation_reason: Option<String>,
    pub consultation_type: Option<String>,
}

#[async_trait]
pub trait VisitorAppointmentRepo: Send + Sync {
    /// All visitor bookings, newest intake first, with the assigned lawyer
    /// denormalized when present.
    async fn find_all(&self) -> Result<Vec<VisitorAppointment>, StoreError>;
    async fn find_recent(&self, limit: i64) -> Result<Vec<VisitorAppointment>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<VisitorAppointment>, StoreError>;
    /// `Ok(None)` when the id is not in this store.
    async fn update(
        &self,
        id: Uuid,
        patch: VisitorAppointmentPatch,
    ) -> Result<Option<VisitorAppointment>, StoreError>;
    /// `Ok(false)` when the id is not in this store.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn count_all(&self) -> Result<i64, StoreError>;
}

pub struct PostgresVisitorAppointmentRepository {
    pool: PgPool,
}

impl PostgresVisitorAppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_WITH_LAWYER: &str = r#"
    SELECT
      v.appointment_id,
      v.full_name,
      v.email,
      v.phone,
      v.age,
      v.consultation_reason,
      v.consultation_type,
      v.preferred_date,
      v.confirmed_date,
      v.alternative_date,
      v.status,
      v.created_at,

      l.user_id   AS l_id,
      l.full_name AS l_name,
      l.email     AS l_email

    FROM visitor_appointment v
    LEFT JOIN app_user l ON l.user_id = v.assigned_lawyer_id
"#;

#[async_trait]
impl VisitorAppointmentRepo for PostgresVisitorAppointmentRepository {
    async fn find_all(&self) -> Result<Vec<VisitorAppointment>, StoreError> {
        let rows = sqlx::query(&format!("{SELECT_WITH_LAWYER} ORDER BY v.created_at DESC"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_appointment).collect()
    }

    async fn find_recent(&self, limit: i64) -> Result<Vec<VisitorAppointment>, StoreError> {
        let rows = sqlx::query(&format!(
            "{SELECT_WITH_LAWYER} ORDER BY v.created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_appointment).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VisitorAppointment>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_WITH_LAWYER} WHERE v.appointment_id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_appointment).transpose()
    }

    async fn update(
        &self,
        id: Uuid,
        patch: VisitorAppointmentPatch,
    ) -> Result<Option<VisitorAppointment>, StoreError> {
        let res = sqlx::query(
            r#"
            UPDATE visitor_appointment
            SET
              status              = COALESCE($2, status),
              preferred_date      = COALESCE($3, preferred_date),
              confirmed_date      = COALESCE($4, confirmed_date),
              alternative_date    = COALESCE($5, alternative_date),
              assigned_lawyer_id  = COALESCE($6, assigned_lawyer_id),
              full_name           = COALESCE($7, full_name),
              email               = COALESCE($8, email),
              phone               = COALESCE($9, phone),
              age                 = COALESCE($10, age),
              consultation_reason = COALESCE($11, consultation_reason),
              consultation_type   = COALESCE($12, consultation_type)
            WHERE appointment_id = $1
            "#,
        )
        .bind(id)
        .bind(patch.status)
        .bind(patch.preferred_date)
        .bind(patch.confirmed_date.unwrap_or(None))
        .bind(patch.alternative_date.unwrap_or(None))
        .bind(patch.assigned_lawyer_id.unwrap_or(None))
        .bind(patch.full_name)
        .bind(patch.email)
        .bind(patch.phone)
        .bind(patch.age.unwrap_or(None))
        .bind(patch.consultation_reason)
        .bind(patch.consultation_type)
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query(r#"DELETE FROM visitor_appointment WHERE appointment_id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn count_all(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM visitor_appointment"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn row_to_appointment(r: &PgRow) -> Result<VisitorAppointment, StoreError> {
    let assigned_lawyer = match r.try_get::<Option<Uuid>, _>("l_id")? {
        Some(id) => Some(PersonBrief {
            id,
            display: r.try_get("l_name")?,
            email: r.try_get("l_email").ok(),
        }),
        None => None,
    };

    Ok(VisitorAppointment {
        appointment_id: r.try_get("appointment_id")?,
        full_name: r.try_get("full_name")?,
        email: r.try_get("email")?,
        phone: r.try_get("phone")?,
        age: r.try_get("age").ok(),
        consultation_reason: r.try_get("consultation_reason")?,
        consultation_type: r.try_get("consultation_type")?,
        preferred_date: r.try_get("preferred_date")?,
        confirmed_date: r.try_get("confirmed_date").ok(),
        alternative_date: r.try_get("alternative_date").ok(),
        assigned_lawyer,
        status: r.try_get("status")?,
        created_at: r.try_get("created_at")?,
    })
}
