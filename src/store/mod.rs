use thiserror::Error;

pub mod cases;
pub mod documents;
pub mod regular_appointments;
pub mod tasks;
pub mod users;
pub mod visitor_appointments;

#[cfg(test)]
pub mod memory;

/// Failure of a store call for any reason other than absence of a record.
/// Absence is always `Ok(None)` / `Ok(false)` so callers can tell "this id
/// lives elsewhere" apart from a real error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub use cases::{CaseRepo, PostgresCaseRepository};
pub use documents::{DocumentRepo, PostgresDocumentRepository};
pub use regular_appointments::{
    PostgresRegularAppointmentRepository, RegularAppointmentPatch, RegularAppointmentRepo,
};
pub use tasks::{PostgresTaskRepository, TaskRepo};
pub use users::{PostgresUserRepository, UserRepo};
pub use visitor_appointments::{
    PostgresVisitorAppointmentRepository, VisitorAppointmentPatch, VisitorAppointmentRepo,
};
