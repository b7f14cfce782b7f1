use thiserror::Error;

use crate::database::StoreError;

/// Infrastructure failures surfaced by the registries.
///
/// Domain results (not found, conflict, ...) are outcomes, never errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
