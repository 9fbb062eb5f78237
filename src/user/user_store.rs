use super::user_models::{Note, Rating};
use crate::catalog_store::ContentRef;
use anyhow::Result;

pub trait UserStore: Send + Sync {
    /// Creates a new user and returns the user id.
    /// Returns Err if the handle is already taken.
    fn create_user(&self, user_handle: &str) -> Result<i64>;

    /// Returns Ok(None) if no user has the given handle.
    fn get_user_id(&self, user_handle: &str) -> Result<Option<i64>>;

    /// Returns Ok(None) if the user does not exist.
    fn get_user_handle(&self, user_id: i64) -> Result<Option<String>>;

    /// Returns all users' handles.
    fn get_all_user_handles(&self) -> Result<Vec<String>>;
}

/// Per-user ratings and notes, each attached to exactly one content node.
///
/// Reads that meet a row with zero or several target columns populated fail
/// with a [`super::ConsistencyError`] wrapped in the returned error.
pub trait AnnotationStore: Send + Sync {
    /// The user's rating on exactly this node.
    fn get_rating(&self, user_id: i64, target: ContentRef) -> Result<Option<Rating>>;

    /// The user's note on exactly this node.
    fn get_note(&self, user_id: i64, target: ContentRef) -> Result<Option<Note>>;

    /// Every user's rating on exactly this node, oldest row first.
    fn get_ratings_for(&self, target: ContentRef) -> Result<Vec<Rating>>;

    /// Every user's note on exactly this node, oldest row first.
    fn get_notes_for(&self, target: ContentRef) -> Result<Vec<Note>>;

    /// All notes written by a user.
    fn get_user_notes(&self, user_id: i64) -> Result<Vec<Note>>;

    /// All notes, optionally restricted to one user.
    fn get_all_notes(&self, user_id: Option<i64>) -> Result<Vec<Note>>;

    /// All ratings, optionally restricted to one user.
    fn get_all_ratings(&self, user_id: Option<i64>) -> Result<Vec<Rating>>;

    /// Inserts or replaces the user's note and/or rating on a node.
    /// Both writes share one transaction: either both persist or neither does.
    fn upsert_annotations(
        &self,
        user_id: i64,
        target: ContentRef,
        note: Option<&str>,
        rating: Option<f64>,
    ) -> Result<()>;
}

/// Combined trait for user storage with annotations
pub trait FullUserStore: UserStore + AnnotationStore {}

impl<T: UserStore + AnnotationStore> FullUserStore for T {}
