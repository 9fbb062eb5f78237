use super::error::{TrackingError, TrackingResult};
use super::fetch_node;
use crate::catalog_store::{CatalogStore, ContentRef};
use crate::user::{FullUserStore, MAX_RATING, MIN_RATING};
use std::sync::Arc;
use tracing::info;

/// Rejects values outside `[0, 10]` and non-finite values. Accepted values
/// are returned untouched.
pub fn validate_rating(value: f64) -> TrackingResult<f64> {
    if !value.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&value) {
        return Err(TrackingError::Validation(format!(
            "Rating must be between {} and {}, got {}",
            MIN_RATING, MAX_RATING, value
        )));
    }
    Ok(value)
}

/// Keeps at most one note and one rating per user and node.
pub struct AnnotationResolver {
    catalog: Arc<dyn CatalogStore>,
    users: Arc<dyn FullUserStore>,
}

impl AnnotationResolver {
    pub fn new(catalog: Arc<dyn CatalogStore>, users: Arc<dyn FullUserStore>) -> Self {
        Self { catalog, users }
    }

    pub fn upsert_note(&self, user_id: i64, target: ContentRef, text: &str) -> TrackingResult<()> {
        self.submit(user_id, target, Some(text), None)
    }

    pub fn upsert_rating(&self, user_id: i64, target: ContentRef, value: f64) -> TrackingResult<()> {
        self.submit(user_id, target, None, Some(value))
    }

    /// Writes note and rating together. Nothing is written unless every check
    /// passes and both writes succeed.
    pub fn submit(
        &self,
        user_id: i64,
        target: ContentRef,
        note: Option<&str>,
        rating: Option<f64>,
    ) -> TrackingResult<()> {
        if note.is_none() && rating.is_none() {
            return Err(TrackingError::Validation(
                "A note or a rating is required".to_string(),
            ));
        }
        let rating = rating.map(validate_rating).transpose()?;

        if self.users.get_user_handle(user_id)?.is_none() {
            return Err(TrackingError::UnknownUser(user_id));
        }
        fetch_node(self.catalog.as_ref(), target)?;

        self.users
            .upsert_annotations(user_id, target, note, rating)?;
        info!(
            "User {} annotated {} (note: {}, rating: {:?})",
            user_id,
            target,
            note.is_some(),
            rating
        );
        Ok(())
    }
}
