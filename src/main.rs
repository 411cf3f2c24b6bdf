mod auth;
mod config;
mod middleware;

mod db;
mod error;
mod models;
mod routes;
mod services;
mod store;

use std::sync::Arc;

use crate::{
    config::Config,
    models::AppState,
    services::{
        dashboard::AggregationEngine, reconciler::AppointmentReconciler, reports::ReportingEngine,
    },
    store::{
        PostgresCaseRepository, PostgresDocumentRepository, PostgresRegularAppointmentRepository,
        PostgresTaskRepository, PostgresUserRepository, PostgresVisitorAppointmentRepository,
    },
};

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use axum::http::header;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cfg = Config::from_env()?;
    let pool = db::connect_pg(&cfg.database_url).await?;

    let users = Arc::new(PostgresUserRepository::new(pool.clone()));
    let cases = Arc::new(PostgresCaseRepository::new(pool.clone()));
    let tasks = Arc::new(PostgresTaskRepository::new(pool.clone()));
    let documents = Arc::new(PostgresDocumentRepository::new(pool.clone()));
    let regular = Arc::new(PostgresRegularAppointmentRepository::new(pool.clone()));
    let visitor = Arc::new(PostgresVisitorAppointmentRepository::new(pool.clone()));

    let appointments = AppointmentReconciler::new(regular.clone(), visitor.clone());
    let dashboard = AggregationEngine::new(
        users.clone(),
        cases.clone(),
        tasks.clone(),
        documents.clone(),
        regular.clone(),
        visitor,
        appointments.clone(),
    );
    let reports = ReportingEngine::new(users, cases, tasks, documents, regular);

    let state = AppState {
        db: pool,
        session_ttl_hours: cfg.session_ttl_hours,
        appointments,
        dashboard,
        reports,
    };

    // DEV ONLY: allow browser/WebView clients (admin frontend) to call the API.
    // Fixes the OPTIONS preflight that otherwise 405s and blocks POST /auth/login.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
