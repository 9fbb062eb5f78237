//! Content hierarchy store traits.

use super::models::{Episode, Movie, NewEpisode, NewMovie, NewSeason, NewShow, Season, Show};
use anyhow::Result;

/// Read access to the content hierarchy plus the leaf `watched` writes.
///
/// Composite nodes have no watched column. The bulk setters flip every leaf
/// below a composite inside one transaction and report how many rows changed.
pub trait CatalogStore: Send + Sync {
    // =========================================================================
    // Node lookup
    // =========================================================================

    fn get_show(&self, id: i64) -> Result<Option<Show>>;

    fn get_season(&self, id: i64) -> Result<Option<Season>>;

    fn get_episode(&self, id: i64) -> Result<Option<Episode>>;

    fn get_movie(&self, id: i64) -> Result<Option<Movie>>;

    /// All shows, by id.
    fn list_shows(&self) -> Result<Vec<Show>>;

    /// All movies, by id.
    fn list_movies(&self) -> Result<Vec<Movie>>;

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Seasons of a show sorted by `number`.
    fn get_show_seasons(&self, show_id: i64) -> Result<Vec<Season>>;

    /// Episodes of a season sorted by `episode_number`, unnumbered ones last.
    fn get_season_episodes(&self, season_id: i64) -> Result<Vec<Episode>>;

    // =========================================================================
    // Leaf watched flags
    // =========================================================================

    /// Returns false when the episode does not exist.
    fn set_episode_watched(&self, id: i64, watched: bool) -> Result<bool>;

    /// Returns false when the movie does not exist.
    fn set_movie_watched(&self, id: i64, watched: bool) -> Result<bool>;

    fn set_season_episodes_watched(&self, season_id: i64, watched: bool) -> Result<usize>;

    fn set_show_episodes_watched(&self, show_id: i64, watched: bool) -> Result<usize>;

    // =========================================================================
    // Counts
    // =========================================================================

    fn get_shows_count(&self) -> usize;

    fn get_seasons_count(&self) -> usize;

    fn get_episodes_count(&self) -> usize;

    fn get_movies_count(&self) -> usize;
}

/// Inserts used by the import collaborator and by tests.
pub trait WritableCatalogStore: CatalogStore {
    fn insert_show(&self, show: &NewShow) -> Result<i64>;

    fn insert_season(&self, season: &NewSeason) -> Result<i64>;

    fn insert_episode(&self, episode: &NewEpisode) -> Result<i64>;

    fn insert_movie(&self, movie: &NewMovie) -> Result<i64>;
}
