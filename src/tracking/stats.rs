use super::error::{TrackingError, TrackingResult};
use super::ratings::mean;
use crate::catalog_store::{CatalogStore, ContentKind, ContentRef};
use crate::user::FullUserStore;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatsScope {
    #[default]
    All,
    Series,
    Movies,
    Show(i64),
}

impl FromStr for StatsScope {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatsScope::All),
            "series" => Ok(StatsScope::Series),
            "movies" => Ok(StatsScope::Movies),
            other => other
                .strip_prefix("show:")
                .and_then(|id| id.parse().ok())
                .map(StatsScope::Show)
                .ok_or_else(|| {
                    TrackingError::Validation(format!("Unknown stats scope '{}'", other))
                }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RatingBucket {
    pub rating: f64,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WatchStats {
    pub total_episodes: usize,
    pub watched_episodes: usize,
    pub total_movies: usize,
    pub watched_movies: usize,
    pub progress_percent: u32,
    pub average_rating: Option<f64>,
    pub rating_distribution: Vec<RatingBucket>,
}

pub struct StatsCalculator {
    catalog: Arc<dyn CatalogStore>,
    users: Arc<dyn FullUserStore>,
}

impl StatsCalculator {
    pub fn new(catalog: Arc<dyn CatalogStore>, users: Arc<dyn FullUserStore>) -> Self {
        Self { catalog, users }
    }

    /// Watch progress and ratings within `scope`, for one user or everyone.
    pub fn stats(&self, user_id: Option<i64>, scope: StatsScope) -> TrackingResult<WatchStats> {
        let shows = match scope {
            StatsScope::All | StatsScope::Series => self.catalog.list_shows()?,
            StatsScope::Movies => Vec::new(),
            StatsScope::Show(id) => vec![self
                .catalog
                .get_show(id)?
                .ok_or(TrackingError::not_found(ContentKind::Show, id))?],
        };
        let movies = match scope {
            StatsScope::All | StatsScope::Movies => self.catalog.list_movies()?,
            StatsScope::Series | StatsScope::Show(_) => Vec::new(),
        };

        let mut in_scope: HashSet<ContentRef> = HashSet::new();
        let mut total_episodes = 0;
        let mut watched_episodes = 0;
        for show in &shows {
            in_scope.insert(ContentRef::Show(show.id));
            for season in self.catalog.get_show_seasons(show.id)? {
                in_scope.insert(ContentRef::Season(season.id));
                for episode in self.catalog.get_season_episodes(season.id)? {
                    in_scope.insert(ContentRef::Episode(episode.id));
                    total_episodes += 1;
                    if episode.watched {
                        watched_episodes += 1;
                    }
                }
            }
        }
        for movie in &movies {
            in_scope.insert(ContentRef::Movie(movie.id));
        }
        let watched_movies = movies.iter().filter(|m| m.watched).count();

        let values: Vec<f64> = self
            .users
            .get_all_ratings(user_id)?
            .into_iter()
            .filter(|r| in_scope.contains(&r.target))
            .map(|r| r.value)
            .collect();

        let total = total_episodes + movies.len();
        let progress_percent = if total == 0 {
            0
        } else {
            ((watched_episodes + watched_movies) as f64 * 100.0 / total as f64).round() as u32
        };

        Ok(WatchStats {
            total_episodes,
            watched_episodes,
            total_movies: movies.len(),
            watched_movies,
            progress_percent,
            average_rating: mean(values.iter().copied()),
            rating_distribution: distribution(&values),
        })
    }
}

/// Counts per rating rounded to one decimal, ascending.
fn distribution(values: &[f64]) -> Vec<RatingBucket> {
    let mut buckets: BTreeMap<i64, usize> = BTreeMap::new();
    for value in values {
        *buckets.entry((value * 10.0).round() as i64).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(tenths, count)| RatingBucket {
            rating: tenths as f64 / 10.0,
            count,
        })
        .collect()
}
