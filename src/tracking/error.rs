use crate::catalog_store::{ContentKind, UnknownContentKind};
use crate::user::ConsistencyError;
use thiserror::Error;

pub type TrackingResult<T> = Result<T, TrackingError>;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("No {kind} with id {id}")]
    NotFound { kind: ContentKind, id: i64 },

    #[error("Unknown user {0}")]
    UnknownUser(i64),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Consistency error: {0}")]
    Consistency(#[from] ConsistencyError),

    #[error("Store error: {0}")]
    Store(anyhow::Error),
}

impl TrackingError {
    pub fn not_found(kind: ContentKind, id: i64) -> Self {
        TrackingError::NotFound { kind, id }
    }
}

impl From<anyhow::Error> for TrackingError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ConsistencyError>() {
            Ok(consistency) => TrackingError::Consistency(consistency),
            Err(err) => TrackingError::Store(err),
        }
    }
}

impl From<UnknownContentKind> for TrackingError {
    fn from(err: UnknownContentKind) -> Self {
        TrackingError::Validation(err.to_string())
    }
}
