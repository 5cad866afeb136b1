//! Error types shared by the persistence layer and the front end.
//!
//! Storage faults collapse into a single [`DataStoreError`] so callers never
//! have to match on rusqlite or io specifics. Input problems are caught before
//! the store is touched and reported as [`ValidationError`].

use std::error::Error as StdError;

use thiserror::Error;

type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

/// Uniform failure raised by every [`RecordStore`](crate::db::RecordStore)
/// operation. `context` says what the store was doing, `source` keeps the
/// underlying error for logs and for the status line.
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct DataStoreError {
    context: &'static str,
    #[source]
    source: BoxedSource,
}

impl DataStoreError {
    pub fn new<E>(context: &'static str, source: E) -> Self
    where
        E: Into<BoxedSource>,
    {
        Self {
            context,
            source: source.into(),
        }
    }

    /// Short description of the operation that failed.
    pub fn context(&self) -> &'static str {
        self.context
    }
}

/// Attach a store context to any fallible call whose error can be boxed.
/// Mirrors `anyhow::Context` so queries read the same way they would with
/// `anyhow`, while still producing the typed store error.
pub trait StoreResultExt<T> {
    fn store_context(self, context: &'static str) -> Result<T, DataStoreError>;
}

impl<T, E> StoreResultExt<T> for Result<T, E>
where
    E: Into<BoxedSource>,
{
    fn store_context(self, context: &'static str) -> Result<T, DataStoreError> {
        self.map_err(|err| DataStoreError::new(context, err))
    }
}

/// Input rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required.")]
    EmptyName,
    #[error("Mobile is required.")]
    EmptyMobile,
    #[error("Unknown course \"{0}\". Expected Biology, Math, Astronomy or Physics.")]
    UnknownCourse(String),
    #[error("Student #{0} no longer exists.")]
    MissingRecord(i64),
}

/// Everything the front end may need to surface after a user action.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    DataStore(#[from] DataStoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_keeps_context_and_source() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only volume",
        ));
        let err = result.store_context("failed to create data directory").unwrap_err();

        assert_eq!(err.context(), "failed to create data directory");
        assert_eq!(
            err.to_string(),
            "failed to create data directory: read-only volume"
        );
        assert_eq!(err.source().unwrap().to_string(), "read-only volume");
    }

    #[test]
    fn app_error_is_transparent() {
        let err = AppError::from(ValidationError::EmptyMobile);
        assert_eq!(err.to_string(), "Mobile is required.");
    }
}
