//! Error types for the iSenior domain.
//!
//! Uses `thiserror` for ergonomic error definitions. The top-level [`Error`]
//! carries the five kinds the API layer distinguishes; the storage and
//! provider bounded contexts have their own enums that fold into it.

use thiserror::Error;

/// The top-level error type for all iSenior operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Lookup ---
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    // --- Input ---
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // --- Access ---
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // --- Downstream ---
    #[error("Service error: {0}")]
    Service(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Shorthand for a missing entity.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(what) => Self::Conflict(format!("{what} already exists")),
            StoreError::ForeignKeyViolation(what) => {
                Self::Validation(format!("{what} references a missing row"))
            }
            other => Self::Service(other.to_string()),
        }
    }
}

impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::AuthenticationFailed(reason) => Self::Unauthorized(reason),
            other => Self::Service(other.to_string()),
        }
    }
}
