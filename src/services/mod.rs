use thiserror::Error;

pub mod dashboard;
pub mod normalizer;
pub mod reconciler;
pub mod reports;

use crate::store::StoreError;

/// Failures surfaced by the appointment operations that resolve a single id.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The id belongs to neither store, or does not exist at all.
    #[error("appointment not found in any store")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}
