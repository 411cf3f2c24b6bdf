use crate::models::AppState;
use axum::Router;

pub mod appointment_routes;
pub mod auth_routes;
pub mod dashboard_routes;
pub mod report_routes;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1/auth", auth_routes::router())
        .nest("/api/v1", appointment_routes::router())
        .nest("/api/v1", dashboard_routes::router())
        .nest("/api/v1", report_routes::router())
        .with_state(state)
}
