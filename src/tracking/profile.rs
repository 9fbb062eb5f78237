//! Per-user overview: global watch progress plus the user's own rating and
//! note activity.

use super::error::TrackingResult;
use super::ratings::mean;
use super::stats::{StatsCalculator, StatsScope};
use crate::catalog_store::{CatalogStore, ContentRef};
use crate::user::FullUserStore;
use serde::Serialize;
use std::cmp::Reverse;
use std::sync::Arc;

pub const FAVORITES_LIMIT: usize = 5;
pub const RECENT_NOTES_LIMIT: usize = 5;
pub const EXCERPT_CHARS: usize = 120;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RatedTitle {
    pub target: ContentRef,
    pub title: String,
    pub rating: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NoteExcerpt {
    pub target: ContentRef,
    pub title: String,
    pub excerpt: String,
    pub timestamp: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub user: String,
    /// Watched episodes and movies, across the whole catalog.
    pub watched: usize,
    /// Every episode and movie in the catalog.
    pub total_watchable: usize,
    /// Every node a note or rating can attach to.
    pub total_annotatable: usize,
    pub rated: usize,
    pub noted: usize,
    pub average_rating: Option<f64>,
    pub favorites: Vec<RatedTitle>,
    pub recent_notes: Vec<NoteExcerpt>,
}

pub struct ProfileBuilder {
    catalog: Arc<dyn CatalogStore>,
    users: Arc<dyn FullUserStore>,
    stats: StatsCalculator,
}

impl ProfileBuilder {
    pub fn new(catalog: Arc<dyn CatalogStore>, users: Arc<dyn FullUserStore>) -> Self {
        Self {
            stats: StatsCalculator::new(catalog.clone(), users.clone()),
            catalog,
            users,
        }
    }

    pub fn summary(&self, user_id: i64, user_handle: &str) -> TrackingResult<ProfileSummary> {
        let progress = self.stats.stats(Some(user_id), StatsScope::All)?;

        let mut ratings = self.users.get_all_ratings(Some(user_id))?;
        let average_rating = mean(ratings.iter().map(|r| r.value));
        let rated = ratings.len();
        // highest first, newest first among equals
        ratings.sort_by(|a, b| {
            b.value
                .total_cmp(&a.value)
                .then(b.timestamp.cmp(&a.timestamp))
                .then(b.id.cmp(&a.id))
        });
        let mut favorites = Vec::new();
        for rating in ratings.into_iter().take(FAVORITES_LIMIT) {
            favorites.push(RatedTitle {
                title: self.title_of(rating.target)?,
                target: rating.target,
                rating: rating.value,
            });
        }

        let mut notes: Vec<_> = self
            .users
            .get_user_notes(user_id)?
            .into_iter()
            .filter(|n| n.has_text())
            .collect();
        let noted = notes.len();
        notes.sort_by_key(|n| Reverse((n.timestamp, n.id)));
        let mut recent_notes = Vec::new();
        for note in notes.into_iter().take(RECENT_NOTES_LIMIT) {
            recent_notes.push(NoteExcerpt {
                title: self.title_of(note.target)?,
                target: note.target,
                excerpt: note.content.trim().chars().take(EXCERPT_CHARS).collect(),
                timestamp: note.timestamp,
            });
        }

        Ok(ProfileSummary {
            user: user_handle.to_string(),
            watched: progress.watched_episodes + progress.watched_movies,
            total_watchable: progress.total_episodes + progress.total_movies,
            total_annotatable: self.catalog.get_shows_count()
                + self.catalog.get_seasons_count()
                + self.catalog.get_episodes_count()
                + self.catalog.get_movies_count(),
            rated,
            noted,
            average_rating,
            favorites,
            recent_notes,
        })
    }

    /// "Show", "Show S2" or "Show S2: Episode title". Nodes that no longer
    /// exist fall back to their kind and id.
    fn title_of(&self, target: ContentRef) -> TrackingResult<String> {
        let title = match target {
            ContentRef::Show(id) => self.catalog.get_show(id)?.map(|s| s.title),
            ContentRef::Movie(id) => self.catalog.get_movie(id)?.map(|m| m.title),
            ContentRef::Season(id) => match self.catalog.get_season(id)? {
                Some(season) => self
                    .catalog
                    .get_show(season.show_id)?
                    .map(|show| format!("{} S{}", show.title, season.number)),
                None => None,
            },
            ContentRef::Episode(id) => match self.catalog.get_episode(id)? {
                Some(episode) => match self.catalog.get_season(episode.season_id)? {
                    Some(season) => self.catalog.get_show(season.show_id)?.map(|show| {
                        format!("{} S{}: {}", show.title, season.number, episode.title)
                    }),
                    None => None,
                },
                None => None,
            },
        };
        Ok(title.unwrap_or_else(|| target.to_string()))
    }
}
