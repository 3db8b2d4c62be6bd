use thiserror::Error;

/// Errors raised during startup configuration.
///
/// These are fatal: construction fails and the process does not serve
/// requests.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required credential: {0}")]
    MissingCredential(String),

    #[error("invalid configuration value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("data directory error: {0}")]
    DataDir(String),
}

/// Errors from repository operations (trait definitions live in hubbub-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("corrupt record: {0}")]
    CorruptRecord(String),
}

/// Errors from the session memory store.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("persistence error: {0}")]
    Persistence(#[from] RepositoryError),
}

/// Errors from the remote event-search client.
///
/// Returned as values, never panicked: the orchestrator turns them into
/// per-source unavailability, so they never reach the chat caller.
#[derive(Debug, Error)]
pub enum EventServiceError {
    #[error("event service unreachable: {0}")]
    Unreachable(String),

    #[error("event service protocol error: {0}")]
    Protocol(String),

    #[error("event service reported an error: {0}")]
    Service(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingCredential("HUBBUB_GEMINI_API_KEY".to_string());
        assert_eq!(
            err.to_string(),
            "missing required credential: HUBBUB_GEMINI_API_KEY"
        );
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_memory_error_wraps_repository_error() {
        let err: MemoryError = RepositoryError::Connection.into();
        assert!(err.to_string().contains("database connection error"));
    }

    #[test]
    fn test_event_service_error_display() {
        let err = EventServiceError::Unreachable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }
}
