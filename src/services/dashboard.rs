// src/services/dashboard.rs
//
// Fans independent count/sample reads out across every domain store and
// assembles the admin dashboard report. Read-only.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::models::{DashboardStats, ROLE_CLIENT, ROLE_LAWYER};
use crate::services::reconciler::AppointmentReconciler;
use crate::store::{
    CaseRepo, DocumentRepo, RegularAppointmentRepo, StoreError, TaskRepo, UserRepo,
    VisitorAppointmentRepo,
};

/// Entries per dashboard sample feed (recent cases, recent appointments).
pub const RECENT_FEED_LIMIT: usize = 5;

#[derive(Clone)]
pub struct AggregationEngine {
    users: Arc<dyn UserRepo>,
    cases: Arc<dyn CaseRepo>,
    tasks: Arc<dyn TaskRepo>,
    documents: Arc<dyn DocumentRepo>,
    regular: Arc<dyn RegularAppointmentRepo>,
    visitor: Arc<dyn VisitorAppointmentRepo>,
    reconciler: AppointmentReconciler,
}

impl AggregationEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserRepo>,
        cases: Arc<dyn CaseRepo>,
        tasks: Arc<dyn TaskRepo>,
        documents: Arc<dyn DocumentRepo>,
        regular: Arc<dyn RegularAppointmentRepo>,
        visitor: Arc<dyn VisitorAppointmentRepo>,
        reconciler: AppointmentReconciler,
    ) -> Self {
        Self {
            users,
            cases,
            tasks,
            documents,
            regular,
            visitor,
            reconciler,
        }
    }

    /// Gather every dashboard figure concurrently and join on all of them.
    /// One failed read fails the whole call — a partially filled report is
    /// never returned.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, StoreError> {
        let now = Utc::now();

        let (
            total_users,
            total_lawyers,
            total_clients,
            total_cases,
            regular_appointments,
            visitor_appointments,
            total_tasks,
            total_documents,
            recent_cases,
            recent_appointments,
            overdue_tasks,
        ) = tokio::try_join!(
            self.users.count_all(),
            self.users.count_by_role(ROLE_LAWYER),
            self.users.count_by_role(ROLE_CLIENT),
            self.cases.count_all(),
            self.regular.count_all(),
            self.visitor.count_all(),
            self.tasks.count_all(),
            self.documents.count_all(),
            self.cases.find_recent(RECENT_FEED_LIMIT as i64),
            self.reconciler.recent_unified(RECENT_FEED_LIMIT),
            self.tasks.find_overdue(now),
        )?;

        debug!(
            total_cases,
            total_appointments = regular_appointments + visitor_appointments,
            overdue = overdue_tasks.len(),
            "dashboard stats assembled"
        );

        Ok(DashboardStats {
            total_users,
            total_lawyers,
            total_clients,
            total_cases,
            total_appointments: regular_appointments + visitor_appointments,
            total_tasks,
            total_documents,
            recent_cases,
            recent_appointments,
            overdue_tasks,
        })
    }
}
