// src/routes/report_routes.rs

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{AppState, ReportBundle, ROLE_ADMIN},
};

#[derive(Debug, Serialize)]
pub struct ReportsResponse {
    pub data: ReportBundle,
}

fn ensure_admin(auth: &AuthContext) -> Result<(), ApiError> {
    if auth.role == ROLE_ADMIN {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "FORBIDDEN",
            "Only admin can view system reports".into(),
        ))
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/reports", get(get_system_reports))
}

pub async fn get_system_reports(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ReportsResponse>, ApiError> {
    ensure_admin(&auth)?;

    let bundle = state.reports.system_reports().await?;
    Ok(Json(ReportsResponse { data: bundle }))
}
