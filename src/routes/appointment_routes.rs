// src/routes/appointment_routes.rs

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{AppState, AppointmentOrigin, UnifiedAppointment, ROLE_ADMIN, ROLE_ASSISTANT, ROLE_LAWYER},
    services::reconciler::UnifiedAppointmentPatch,
};

/*
Roles (app_user.role):
0 client
1 admin
2 lawyer
3 assistant
*/

fn is_admin(auth: &AuthContext) -> bool {
    auth.role == ROLE_ADMIN
}
fn is_lawyer(auth: &AuthContext) -> bool {
    auth.role == ROLE_LAWYER
}
fn is_assistant(auth: &AuthContext) -> bool {
    auth.role == ROLE_ASSISTANT
}

fn can_manage_appointments(auth: &AuthContext) -> bool {
    is_admin(auth) || is_lawyer(auth) || is_assistant(auth)
}

fn ensure_manage(auth: &AuthContext) -> Result<(), ApiError> {
    if can_manage_appointments(auth) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "FORBIDDEN",
            "Only admin/lawyer/assistant can manage appointments".into(),
        ))
    }
}

const VISITOR_STATUSES: &[&str] = &["PENDIENTE", "CONFIRMADA", "CANCELADA", "COMPLETADA"];

fn validate_status(status: &str) -> Result<(), ApiError> {
    if VISITOR_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            format!("invalid status: {status}"),
        ))
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(list_appointments))
        .route("/appointments/{appointment_id}", get(get_appointment))
        .route("/appointments/{appointment_id}", patch(patch_appointment))
        .route("/appointments/{appointment_id}", delete(delete_appointment))
}

/* ============================================================
   DTOs
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct ApiOk<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PatchAppointmentRequest {
    /// Callers that already hold the record (and therefore its origin tag)
    /// pass it back so the update is a pure dispatch. Without it the two
    /// stores are probed in order.
    #[serde(rename = "type")]
    pub origin: Option<AppointmentOrigin>,
    #[serde(flatten)]
    pub patch: UnifiedAppointmentPatch,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(rename = "type")]
    pub origin: Option<AppointmentOrigin>,
}

#[derive(Debug, Serialize)]
pub struct DeletedData {
    pub ok: bool,
    #[serde(rename = "type")]
    pub origin: AppointmentOrigin,
}

/* ============================================================
   GET /appointments
   ============================================================ */

pub async fn list_appointments(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(q): Query<ListQuery>,
) -> Result<Json<ApiOk<Vec<UnifiedAppointment>>>, ApiError> {
    ensure_manage(&auth)?;

    let list = match (q.limit, q.offset) {
        (None, None) => state.appointments.list_unified().await?,
        (limit, offset) => {
            let limit = limit.unwrap_or(50);
            if !(1..=200).contains(&limit) {
                return Err(ApiError::BadRequest(
                    "VALIDATION_ERROR",
                    "limit must be between 1 and 200".into(),
                ));
            }
            let offset = offset.unwrap_or(0);
            if offset < 0 {
                return Err(ApiError::BadRequest(
                    "VALIDATION_ERROR",
                    "offset must not be negative".into(),
                ));
            }
            state
                .appointments
                .list_unified_window(offset as usize, limit as usize)
                .await?
        }
    };

    Ok(Json(ApiOk { data: list }))
}

/* ============================================================
   GET /appointments/{id}
   ============================================================ */

pub async fn get_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<ApiOk<UnifiedAppointment>>, ApiError> {
    ensure_manage(&auth)?;
    let appointment = state.appointments.get_unified(appointment_id).await?;
    Ok(Json(ApiOk { data: appointment }))
}

/* ============================================================
   PATCH /appointments/{id}
   ============================================================ */

pub async fn patch_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
    Json(req): Json<PatchAppointmentRequest>,
) -> Result<Json<ApiOk<UnifiedAppointment>>, ApiError> {
    ensure_manage(&auth)?;

    if let Some(status) = req.patch.status.as_deref() {
        validate_status(status)?;
    }

    let updated = state
        .appointments
        .update_unified(appointment_id, req.origin, req.patch)
        .await?;
    Ok(Json(ApiOk { data: updated }))
}

/* ============================================================
   DELETE /appointments/{id}
   ============================================================ */

pub async fn delete_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(appointment_id): Path<Uuid>,
    Query(q): Query<DeleteQuery>,
) -> Result<Json<ApiOk<DeletedData>>, ApiError> {
    ensure_manage(&auth)?;

    let origin = state
        .appointments
        .delete_unified(appointment_id, q.origin)
        .await?;
    Ok(Json(ApiOk {
        data: DeletedData { ok: true, origin },
    }))
}
