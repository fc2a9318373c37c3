//! Error types shared by the store, the pipelines and the HTTP layer.

/// Failures raised by the workspace store (the collaborator side).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Corrupt stored value: {0}")]
    Corrupt(String),

    #[error("Invalid cell reference: {0}")]
    InvalidCell(String),

    #[error("Operation rejected: {0}")]
    Rejected(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Failures that end a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    /// A container or template the run depends on is absent. Nothing was mutated.
    #[error("Missing precondition: {0}")]
    MissingPrecondition(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Collaborator failures are not translated; they halt the run as-is.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Configuration errors raised at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}
