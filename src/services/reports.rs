// src/services/reports.rs
//
// Grouped statistics for the admin reports view. Every group is an
// independent read; none of them merge into one timeline, so the only
// assembly step is joining the per-lawyer count maps onto the roster.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::models::{LawyerActivity, ReportBundle};
use crate::store::{
    CaseRepo, DocumentRepo, RegularAppointmentRepo, StoreError, TaskRepo, UserRepo,
};

#[derive(Clone)]
pub struct ReportingEngine {
    users: Arc<dyn UserRepo>,
    cases: Arc<dyn CaseRepo>,
    tasks: Arc<dyn TaskRepo>,
    documents: Arc<dyn DocumentRepo>,
    regular: Arc<dyn RegularAppointmentRepo>,
}

impl ReportingEngine {
    pub fn new(
        users: Arc<dyn UserRepo>,
        cases: Arc<dyn CaseRepo>,
        tasks: Arc<dyn TaskRepo>,
        documents: Arc<dyn DocumentRepo>,
        regular: Arc<dyn RegularAppointmentRepo>,
    ) -> Self {
        Self {
            users,
            cases,
            tasks,
            documents,
            regular,
        }
    }

    /// The appointments-by-date group is bounded to the current calendar year.
    pub async fn system_reports(&self) -> Result<ReportBundle, StoreError> {
        self.system_reports_for_year(Utc::now().year()).await
    }

    pub async fn system_reports_for_year(&self, year: i32) -> Result<ReportBundle, StoreError> {
        let (
            cases_by_status,
            tasks_by_status,
            appointments_by_date,
            lawyers,
            cases_by_lawyer,
            appointments_by_lawyer,
            tasks_by_lawyer,
            document_stats,
        ) = tokio::try_join!(
            self.cases.count_by_status(),
            self.tasks.count_by_status(),
            self.regular.count_by_date_for_year(year),
            self.users.find_lawyers(),
            self.cases.count_by_lawyer(),
            self.regular.count_by_lawyer(),
            self.tasks.count_by_lawyer(),
            self.documents.stats_by_mime_type(),
        )?;

        let cases_map: HashMap<Uuid, i64> = cases_by_lawyer.into_iter().collect();
        let appointments_map: HashMap<Uuid, i64> = appointments_by_lawyer.into_iter().collect();
        let tasks_map: HashMap<Uuid, i64> = tasks_by_lawyer.into_iter().collect();

        let lawyer_activity: Vec<LawyerActivity> = lawyers
            .into_iter()
            .map(|lawyer| LawyerActivity {
                cases: cases_map.get(&lawyer.id).copied().unwrap_or(0),
                appointments: appointments_map.get(&lawyer.id).copied().unwrap_or(0),
                tasks: tasks_map.get(&lawyer.id).copied().unwrap_or(0),
                lawyer,
            })
            .collect();

        debug!(year, lawyers = lawyer_activity.len(), "system reports assembled");

        Ok(ReportBundle {
            cases_by_status,
            tasks_by_status,
            appointments_by_date,
            lawyer_activity,
            document_stats,
        })
    }
}
