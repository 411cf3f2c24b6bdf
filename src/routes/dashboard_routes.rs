// src/routes/dashboard_routes.rs

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{AppState, DashboardStats, ROLE_ADMIN, ROLE_ASSISTANT, ROLE_LAWYER},
};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub data: DashboardStats,
}

fn can_view_dashboard(auth: &AuthContext) -> bool {
    auth.role == ROLE_ADMIN || auth.role == ROLE_LAWYER || auth.role == ROLE_ASSISTANT
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard/stats", get(get_dashboard_stats))
}

pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<StatsResponse>, ApiError> {
    if !can_view_dashboard(&auth) {
        return Err(ApiError::Forbidden(
            "FORBIDDEN",
            "Only staff can view the dashboard".into(),
        ));
    }

    let stats = state.dashboard.dashboard_stats().await?;
    Ok(Json(StatsResponse { data: stats }))
}
