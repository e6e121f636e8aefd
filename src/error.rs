use thiserror::Error as ThisError;

/// Operation-boundary error taxonomy. Every public operation returns one of
/// these; none of them is fatal to the process.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Rejected before any query ran (missing/invalid date, bad id, malformed
    /// range).
    #[error("{0}")]
    Validation(String),

    /// A business precondition was not met (clock-in outside the window,
    /// double clock-in, roll-up before shift end, ...). No state change.
    #[error("{0}")]
    Precondition(String),

    /// The write would duplicate an existing row (payroll period/employee
    /// pair, holiday date, ...). Rejected before the write.
    #[error("{0}")]
    Conflict(String),

    /// Statement execution failed; any open transaction was rolled back.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Error::Precondition(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Error::Conflict(msg.into())
    }
}
