//! Error types for the email priority service.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Failures of the ingest / update-priority / list operations.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// Missing or malformed caller input.
    #[error("{0}")]
    Validation(String),

    #[error("Email not found: {id}")]
    NotFound { id: String },

    /// The store rejected or failed the operation.
    #[error("{0}")]
    Store(#[from] DatabaseError),
}
