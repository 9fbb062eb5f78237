mod sqlite_user_store;
pub mod user_models;
mod user_store;

pub use sqlite_user_store::SqliteUserStore;
pub use user_models::{ConsistencyError, Note, Rating, MAX_RATING, MIN_RATING};
pub use user_store::{AnnotationStore, FullUserStore, UserStore};
