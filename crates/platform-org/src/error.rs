//! Error types for organization operations

use platform_rbac::AuthorizationError;
use thiserror::Error;

use crate::hooks::EventVetoError;
use crate::store::StoreError;
use crate::validation::ValidationError;

/// Why an organization could not be created.
///
/// Every variant is terminal; nothing is retried internally.
#[derive(Debug, Error)]
pub enum CreateOrganizationError {
    /// The principal may not create organizations
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// The input failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A pre-create hook rejected the creation
    #[error(transparent)]
    Vetoed(#[from] EventVetoError),

    /// Persistence failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for organization creation.
pub type CreateOrganizationResult<T> = Result<T, CreateOrganizationError>;

impl CreateOrganizationError {
    /// Check if this error should be logged at error level.
    ///
    /// Denials, bad input and vetoes are expected outcomes.
    pub fn is_server_error(&self) -> bool {
        matches!(self, CreateOrganizationError::Store(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            CreateOrganizationError::Authorization(e) => e.status_code(),
            CreateOrganizationError::Validation(_) => 422,
            CreateOrganizationError::Vetoed(_) => 409,
            CreateOrganizationError::Store(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            CreateOrganizationError::Authorization(e) => e.error_code(),
            CreateOrganizationError::Validation(_) => "VALIDATION_FAILED",
            CreateOrganizationError::Vetoed(_) => "CREATION_VETOED",
            CreateOrganizationError::Store(_) => "STORE_ERROR",
        }
    }
}
