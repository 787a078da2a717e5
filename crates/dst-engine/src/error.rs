//! Error types for dst-engine operations.

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DstError {
    #[error("Invalid transition rule: {0}")]
    InvalidRule(String),

    #[error("Invalid year range: {start} > {end}")]
    InvalidYearRange { start: i32, end: i32 },

    #[error("Adjustment rules overlap or are out of order at year {0}")]
    OverlappingRules(i32),

    /// A computed transition landed before the search cursor.
    #[error("Transition at {found} precedes search cursor {cursor}")]
    NonMonotonicTransition {
        cursor: NaiveDateTime,
        found: NaiveDateTime,
    },

    #[error("Validity range has neither a start nor an end transition")]
    EmptyRange,

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DstError>;
