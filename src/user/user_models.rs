use crate::catalog_store::ContentRef;
use serde::Serialize;
use thiserror::Error;

/// Highest rating value accepted.
pub const MAX_RATING: f64 = 10.0;

/// Lowest rating value accepted.
pub const MIN_RATING: f64 = 0.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub target: ContentRef,
    pub value: f64,
    pub timestamp: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Note {
    pub id: i64,
    pub user_id: i64,
    pub target: ContentRef,
    pub content: String,
    pub timestamp: i64,
}

impl Note {
    /// Whitespace-only notes count as absent.
    pub fn has_text(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// An annotation row whose target columns do not name exactly one node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{table} row {row_id} references {populated} content nodes, expected exactly one")]
pub struct ConsistencyError {
    pub table: &'static str,
    pub row_id: i64,
    pub populated: usize,
}

/// The four nullable target columns shared by the rating and note tables.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TargetColumns {
    pub episode_id: Option<i64>,
    pub movie_id: Option<i64>,
    pub season_id: Option<i64>,
    pub show_id: Option<i64>,
}

impl TargetColumns {
    pub fn column_for(target: &ContentRef) -> &'static str {
        match target {
            ContentRef::Episode(_) => "episode_id",
            ContentRef::Movie(_) => "movie_id",
            ContentRef::Season(_) => "season_id",
            ContentRef::Show(_) => "show_id",
        }
    }

    pub fn into_target(self, table: &'static str, row_id: i64) -> Result<ContentRef, ConsistencyError> {
        let candidates = [
            self.episode_id.map(ContentRef::Episode),
            self.movie_id.map(ContentRef::Movie),
            self.season_id.map(ContentRef::Season),
            self.show_id.map(ContentRef::Show),
        ];
        let mut populated = candidates.into_iter().flatten();
        match (populated.next(), populated.count()) {
            (Some(target), 0) => Ok(target),
            (first, rest) => Err(ConsistencyError {
                table,
                row_id,
                populated: first.map_or(0, |_| 1 + rest),
            }),
        }
    }
}
