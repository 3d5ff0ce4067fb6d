//! Typed errors for the persistence and choice layers. The binary and the TUI
//! wrap these in `anyhow` chains; library callers match on the variants when
//! they need to treat a duplicate or a missing row differently from a real
//! failure.

use std::io;
use std::path::PathBuf;

use rusqlite::{Error as SqlError, ErrorCode};
use thiserror::Error;

/// Everything that can go wrong inside the `db` store functions.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A UNIQUE or PRIMARY KEY constraint rejected the write.
    #[error("{entity} \"{key}\" already exists.")]
    Duplicate { entity: &'static str, key: String },

    /// Names and list names must contain something besides whitespace.
    #[error("{entity} name must not be empty.")]
    EmptyName { entity: &'static str },

    /// Lookup, update or delete matched no row.
    #[error("{entity} \"{key}\" not found.")]
    NotFound { entity: &'static str, key: String },

    /// A membership pointed at an item or list that does not exist.
    #[error("cannot link item {item_id} to list {item_list_id}: one of them does not exist.")]
    MissingReference { item_list_id: i64, item_id: i64 },

    #[error("failed to create data directory {}", path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to {action}")]
    Sqlite {
        action: &'static str,
        #[source]
        source: SqlError,
    },
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// True for the "already exists" case, which several callers treat as a
    /// no-op.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate { .. })
    }
}

/// Reject a blank name before it reaches the table.
pub(crate) fn require_name(entity: &'static str, name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        Err(StoreError::EmptyName { entity })
    } else {
        Ok(())
    }
}

/// Build a `map_err` adapter that tags raw SQLite failures with the action
/// that was running.
pub(crate) fn sql(action: &'static str) -> impl FnOnce(SqlError) -> StoreError {
    move |source| StoreError::Sqlite { action, source }
}

/// Coerce uniqueness violations into `StoreError::Duplicate`. Any other
/// failure keeps its SQLite source.
pub(crate) fn map_unique_constraint(
    err: SqlError,
    entity: &'static str,
    key: &str,
    action: &'static str,
) -> StoreError {
    if is_constraint(&err) {
        StoreError::Duplicate {
            entity,
            key: key.to_string(),
        }
    } else {
        StoreError::Sqlite {
            action,
            source: err,
        }
    }
}

pub(crate) fn is_constraint(err: &SqlError) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    )
}

pub(crate) fn is_foreign_key_violation(err: &SqlError) -> bool {
    matches!(
        err,
        SqlError::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

/// Errors raised by the random selector and the choice orchestrator.
#[derive(Debug, Error)]
pub enum ChooserError {
    #[error("the maximum range value must be greater than zero but it was {0}")]
    InvalidRange(i64),

    #[error("no item list selected")]
    NoListSelected,

    #[error(transparent)]
    Store(#[from] StoreError),
}
