//! Rating rollups.
//!
//! Two rollups exist and they are deliberately not the same computation:
//!
//! * [`RatingAggregator::user_rating`] is a per-user mean of child means at
//!   every level: a season averages its episodes, a show averages its seasons.
//! * [`RatingAggregator::avg_rating`] pools every user's raw episode ratings
//!   into one flat mean per season, then averages the seasons for a show.
//!
//! Both return `None` when nothing in the subtree is rated.

use super::error::TrackingResult;
use crate::catalog_store::{CatalogStore, ContentRef};
use crate::user::FullUserStore;
use std::sync::Arc;

pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

pub struct RatingAggregator {
    catalog: Arc<dyn CatalogStore>,
    annotations: Arc<dyn FullUserStore>,
}

impl RatingAggregator {
    pub fn new(catalog: Arc<dyn CatalogStore>, annotations: Arc<dyn FullUserStore>) -> Self {
        Self {
            catalog,
            annotations,
        }
    }

    pub fn user_rating(&self, target: ContentRef, user_id: i64) -> TrackingResult<Option<f64>> {
        match target {
            ContentRef::Episode(_) | ContentRef::Movie(_) => Ok(self
                .annotations
                .get_rating(user_id, target)?
                .map(|r| r.value)),
            ContentRef::Season(season_id) => self.user_season_rating(season_id, user_id),
            ContentRef::Show(show_id) => {
                let mut season_means = Vec::new();
                for season in self.catalog.get_show_seasons(show_id)? {
                    if let Some(season_mean) = self.user_season_rating(season.id, user_id)? {
                        season_means.push(season_mean);
                    }
                }
                Ok(mean(season_means))
            }
        }
    }

    fn user_season_rating(&self, season_id: i64, user_id: i64) -> TrackingResult<Option<f64>> {
        let mut values = Vec::new();
        for episode in self.catalog.get_season_episodes(season_id)? {
            if let Some(rating) = self
                .annotations
                .get_rating(user_id, ContentRef::Episode(episode.id))?
            {
                values.push(rating.value);
            }
        }
        Ok(mean(values))
    }

    pub fn avg_rating(&self, target: ContentRef) -> TrackingResult<Option<f64>> {
        match target {
            ContentRef::Episode(_) | ContentRef::Movie(_) => Ok(mean(
                self.annotations
                    .get_ratings_for(target)?
                    .into_iter()
                    .map(|r| r.value),
            )),
            ContentRef::Season(season_id) => self.pooled_season_rating(season_id),
            ContentRef::Show(show_id) => {
                let mut season_avgs = Vec::new();
                for season in self.catalog.get_show_seasons(show_id)? {
                    if let Some(avg) = self.pooled_season_rating(season.id)? {
                        season_avgs.push(avg);
                    }
                }
                Ok(mean(season_avgs))
            }
        }
    }

    /// Flat mean of every rating on every episode of the season.
    fn pooled_season_rating(&self, season_id: i64) -> TrackingResult<Option<f64>> {
        let mut values = Vec::new();
        for episode in self.catalog.get_season_episodes(season_id)? {
            values.extend(
                self.annotations
                    .get_ratings_for(ContentRef::Episode(episode.id))?
                    .into_iter()
                    .map(|r| r.value),
            );
        }
        Ok(mean(values))
    }
}
