// src/store/regular_appointments.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::models::{DateCount, PersonBrief, RegularAppointment};
use crate::store::StoreError;

/// Partial update for a client booking. `notes` uses the nested Option so a
/// caller can distinguish "leave alone" from "set to null".
#[derive(Debug, Default, Clone)]
pub struct RegularAppointmentPatch {
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub notes: Option<Option<String>>,
    pub lawyer_id: Option<Uuid>,
}

#[async_trait]
pub trait RegularAppointmentRepo: Send + Sync {
    /// All client bookings, newest meeting date first, with client and
    /// lawyer denormalized.
    async fn find_all(&self) -> Result<Vec<RegularAppointment>, StoreError>;
    async fn find_recent(&self, limit: i64) -> Result<Vec<RegularAppointment>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RegularAppointment>, StoreError>;
    /// `Ok(None)` when the id is not in this store.
    async fn update(
        &self,
        id: Uuid,
        patch: RegularAppointmentPatch,
    ) -> Result<Option<RegularAppointment>, StoreError>;
    /// `Ok(false)` when the id is not in this store.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn count_all(&self) -> Result<i64, StoreError>;
    async fn count_by_date_for_year(&self, year: i32) -> Result<Vec<DateCount>, StoreError>;
    async fn count_by_lawyer(&self) -> Result<Vec<(Uuid, i64)>, StoreError>;
}

pub struct PostgresRegularAppointmentRepository {
    pool: PgPool,
}

impl PostgresRegularAppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_WITH_BRIEFS: &str = r#"
    SELECT
      a.appointment_id,
      a.date,
      a.location,
      a.notes,

      c.user_id   AS c_id,
      c.full_name AS c_name,
      c.email     AS c_email,

      l.user_id   AS l_id,
      l.full_name AS l_name,
      l.email     AS l_email

    FROM regular_appointment a
    JOIN app_user c ON c.user_id = a.client_id
    JOIN app_user l ON l.user_id = a.lawyer_id
"#;

#[async_trait]
impl RegularAppointmentRepo for PostgresRegularAppointmentRepository {
    async fn find_all(&self) -> Result<Vec<RegularAppointment>, StoreError> {
        let rows = sqlx::query(&format!("{SELECT_WITH_BRIEFS} ORDER BY a.date DESC"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_appointment).collect()
    }

    async fn find_recent(&self, limit: i64) -> Result<Vec<RegularAppointment>, StoreError> {
        let rows = sqlx::query(&format!("{SELECT_WITH_BRIEFS} ORDER BY a.date DESC LIMIT $1"))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_appointment).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RegularAppointment>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_WITH_BRIEFS} WHERE a.appointment_id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_appointment).transpose()
    }

    async fn update(
        &self,
        id: Uuid,
        patch: RegularAppointmentPatch,
    ) -> Result<Option<RegularAppointment>, StoreError> {
        let res = sqlx::query(
            r#"
            UPDATE regular_appointment
            SET
              date      = COALESCE($2, date),
              location  = COALESCE($3, location),
              notes     = COALESCE($4, notes),
              lawyer_id = COALESCE($5, lawyer_id)
            WHERE appointment_id = $1
            "#,
        )
        .bind(id)
        .bind(patch.date)
        .bind(patch.location)
        .bind(patch.notes.unwrap_or(None))
        .bind(patch.lawyer_id)
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query(r#"DELETE FROM regular_appointment WHERE appointment_id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn count_all(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM regular_appointment"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_by_date_for_year(&self, year: i32) -> Result<Vec<DateCount>, StoreError> {
        // Year bounds computed here so the query stays a plain range scan.
        let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let end = NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let start_ts = DateTime::<Utc>::from_naive_utc_and_offset(start, Utc);
        let end_ts = DateTime::<Utc>::from_naive_utc_and_offset(end, Utc);

        let rows = sqlx::query(
            r#"
            SELECT (a.date AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS count
            FROM regular_appointment a
            WHERE a.date >= $1 AND a.date < $2
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(start_ts)
        .bind(end_ts)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| {
                Ok(DateCount {
                    date: r.try_get("day")?,
                    count: r.try_get("count")?,
                })
            })
            .collect()
    }

    async fn count_by_lawyer(&self) -> Result<Vec<(Uuid, i64)>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT lawyer_id, COUNT(*) AS count
            FROM regular_appointment
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

fn row_to_appointment(r: &PgRow) -> Result<RegularAppointment, StoreError> {
    Ok(RegularAppointment {
        appointment_id: r.try_get("appointment_id")?,
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
        date: r.try_get("date")?,
        location: r.try_get("location")?,
        notes: r.try_get("notes").ok(),
    })
}
