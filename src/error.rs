use std::path::PathBuf;

/// Errors produced by the board engines and the task store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A stored week key is not a `YYYY-MM-DD` date.
    #[error("malformed week key '{0}': expected YYYY-MM-DD")]
    MalformedWeekKey(String),

    /// A completion date is not a `YYYY-MM-DD` date.
    #[error("malformed date '{0}': expected YYYY-MM-DD")]
    MalformedDate(String),

    /// A status string that maps to none of the nine board buckets.
    #[error("unknown task status '{0}'")]
    UnknownTaskStatus(String),

    #[error("unknown day '{0}': expected sunday through saturday")]
    UnknownDay(String),

    #[error("unknown priority '{0}': expected low, medium or high")]
    UnknownPriority(String),

    #[error("unknown frequency '{0}': expected weekly or monthly")]
    UnknownFrequency(String),

    #[error("task {0} not found")]
    TaskNotFound(u64),

    #[error("recurring task {0} not found")]
    RecurringTaskNotFound(u64),

    #[error("task title must not be empty")]
    InvalidTitle,

    /// A status change the board does not allow, e.g. scheduling into the
    /// completed bucket instead of completing.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("invalid configuration in {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt database {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
