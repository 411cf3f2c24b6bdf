use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::{
    dashboard::AggregationEngine, reconciler::AppointmentReconciler, reports::ReportingEngine,
};

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub session_ttl_hours: i64,
    pub appointments: AppointmentReconciler,
    pub dashboard: AggregationEngine,
    pub reports: ReportingEngine,
}

/* -------------------------
   API DTOs
--------------------------*/

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub device_name: Option<String>,
    pub remember_me: Option<bool>, // reserved for future
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub data: LoginResponseData,
}

#[derive(Debug, Serialize)]
pub struct LoginResponseData {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
    pub firm: FirmProfile,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub data: MeResponseData,
}

#[derive(Debug, Serialize)]
pub struct MeResponseData {
    pub user: UserProfile,
    pub firm: FirmProfile,
    pub session: SessionInfo,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub data: OkData,
}

#[derive(Debug, Serialize)]
pub struct OkData {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    /// We currently store a single role as smallint in DB.
    /// Returned as an array for forward compatibility.
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FirmProfile {
    pub firm_name: String,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub session_token_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/* -------------------------
   DB Row Models
--------------------------*/

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: i16,
    pub is_active: bool,
}

#[derive(Debug, sqlx::FromRow)]
pub struct SessionTokenRow {
    pub session_token_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/* -------------------------
   Domain records
--------------------------*/

/// Short person reference denormalized onto records that point at a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonBrief {
    pub id: Uuid,
    pub display: String,
    pub email: Option<String>,
}

/// Booking made by an authenticated client against a specific lawyer.
/// Always considered confirmed; the meeting date doubles as the sort key
/// since no separate creation timestamp is stored.
#[derive(Debug, Clone)]
pub struct RegularAppointment {
    pub appointment_id: Uuid,
    pub client: PersonBrief,
    pub lawyer: PersonBrief,
    pub date: DateTime<Utc>,
    pub location: String,
    pub notes: Option<String>,
}

/// Booking made by an anonymous website visitor through the chat assistant.
#[derive(Debug, Clone)]
pub struct VisitorAppointment {
    pub appointment_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub age: Option<i32>,
    pub consultation_reason: String,
    pub consultation_type: String,
    pub preferred_date: DateTime<Utc>,
    pub confirmed_date: Option<DateTime<Utc>>,
    pub alternative_date: Option<DateTime<Utc>>,
    pub assigned_lawyer: Option<PersonBrief>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppointmentOrigin {
    Regular,
    Visitor,
}

/// The one shape both appointment kinds are projected into for every
/// read/write operation exposed to callers. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct UnifiedAppointment {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub origin: AppointmentOrigin,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub client: Option<PersonBrief>,
    pub lawyer: Option<PersonBrief>,
    /// Sort key: the meeting date for regular bookings, the intake
    /// timestamp for visitor bookings.
    pub created_at: DateTime<Utc>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub consultation_reason: Option<String>,
    pub consultation_type: Option<String>,
    pub age: Option<i32>,
    pub assigned_lawyer_id: Option<Uuid>,
    pub confirmed_date: Option<DateTime<Utc>>,
    pub alternative_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseSummary {
    pub case_id: Uuid,
    pub title: String,
    pub status: String,
    pub client: PersonBrief,
    pub lawyer: PersonBrief,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub task_id: Uuid,
    pub title: String,
    pub status: String,
    pub due_at: Option<DateTime<Utc>>,
    pub assigned_lawyer: Option<PersonBrief>,
    pub created_at: DateTime<Utc>,
}

/* -------------------------
   Aggregates
--------------------------*/

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_lawyers: i64,
    pub total_clients: i64,
    pub total_cases: i64,
    pub total_appointments: i64,
    pub total_tasks: i64,
    pub total_documents: i64,
    pub recent_cases: Vec<CaseSummary>,
    pub recent_appointments: Vec<UnifiedAppointment>,
    pub overdue_tasks: Vec<TaskSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LawyerActivity {
    pub lawyer: PersonBrief,
    pub cases: i64,
    pub appointments: i64,
    pub tasks: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentTypeStat {
    pub mime_type: String,
    pub count: i64,
    pub total_size_bytes: i64,
}

#[derive(Debug, Serialize)]
pub struct ReportBundle {
    pub cases_by_status: Vec<StatusCount>,
    pub tasks_by_status: Vec<StatusCount>,
    pub appointments_by_date: Vec<DateCount>,
    pub lawyer_activity: Vec<LawyerActivity>,
    pub document_stats: Vec<DocumentTypeStat>,
}

/* -------------------------
   Helpers
--------------------------*/

/// Role mapping for app_user.role (smallint):
/// 0 Client, 1 Admin, 2 Lawyer, 3 Assistant
pub fn role_to_string(role: i16) -> String {
    match role {
        0 => "client",
        1 => "admin",
        2 => "lawyer",
        3 => "assistant",
        _ => "unknown",
    }
    .to_string()
}

pub const ROLE_CLIENT: i16 = 0;
pub const ROLE_ADMIN: i16 = 1;
pub const ROLE_LAWYER: i16 = 2;
pub const ROLE_ASSISTANT: i16 = 3;
