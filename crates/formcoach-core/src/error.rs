use thiserror::Error;

/// Errors raised when a session is started
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Exercise '{name}' is not supported (available: {})", .available.join(", "))]
    UnsupportedExercise {
        name: String,
        available: Vec<String>,
    },
}
