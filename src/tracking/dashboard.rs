use super::error::{TrackingError, TrackingResult};
use super::status::{season_watched, show_watched};
use crate::catalog_store::{
    sort_top_level, CatalogStore, Episode, Movie, Season, Show, TopLevel,
};
use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DashboardFilter {
    #[default]
    All,
    Unwatched,
}

impl FromStr for DashboardFilter {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(DashboardFilter::All),
            "unwatched" => Ok(DashboardFilter::Unwatched),
            other => Err(TrackingError::Validation(format!(
                "Unknown dashboard filter '{}'",
                other
            ))),
        }
    }
}

/// Which top-level kinds the dashboard lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KindFilter {
    #[default]
    All,
    Shows,
    Movies,
}

impl FromStr for KindFilter {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(KindFilter::All),
            "show" => Ok(KindFilter::Shows),
            "movie" => Ok(KindFilter::Movies),
            other => Err(TrackingError::Validation(format!(
                "Unknown content kind filter '{}'",
                other
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DashboardSort {
    /// Display order, nulls last, shows before movies on ties.
    #[default]
    Order,
    /// Case-insensitive title, display order on ties.
    Title,
    /// Highest IMDb rating first, unrated last.
    ImdbRating,
}

impl FromStr for DashboardSort {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(DashboardSort::Order),
            "title" => Ok(DashboardSort::Title),
            "imdb_rating" => Ok(DashboardSort::ImdbRating),
            other => Err(TrackingError::Validation(format!(
                "Unknown dashboard sort '{}'",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardQuery {
    pub filter: DashboardFilter,
    pub kind: KindFilter,
    /// Case-insensitive substring of the show or movie title.
    pub search: Option<String>,
    pub sort: DashboardSort,
}

impl DashboardQuery {
    fn matches_title(&self, title: &str) -> bool {
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                title.to_lowercase().contains(&needle.to_lowercase())
            }
            _ => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardSeason {
    #[serde(flatten)]
    pub season: Season,
    pub display_artwork_url: Option<String>,
    pub watched: bool,
    pub episodes: Vec<Episode>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardShow {
    #[serde(flatten)]
    pub show: Show,
    pub watched: bool,
    pub seasons: Vec<DashboardSeason>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DashboardItem {
    Show(DashboardShow),
    Movie(Movie),
}

impl DashboardItem {
    pub fn title(&self) -> &str {
        match self {
            DashboardItem::Show(item) => &item.show.title,
            DashboardItem::Movie(movie) => &movie.title,
        }
    }

    pub fn imdb_rating(&self) -> Option<f64> {
        match self {
            DashboardItem::Show(item) => item.show.imdb_rating,
            DashboardItem::Movie(movie) => movie.imdb_rating,
        }
    }
}

fn imdb_descending(a: &DashboardItem, b: &DashboardItem) -> Ordering {
    match (a.imdb_rating(), b.imdb_rating()) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub struct Dashboard {
    catalog: Arc<dyn CatalogStore>,
}

impl Dashboard {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    /// Shows and movies matching `query`, merged in display order unless
    /// another sort is asked for.
    ///
    /// With [`DashboardFilter::Unwatched`] movies must be unwatched, seasons
    /// keep only their unwatched episodes, and a show stays only if some
    /// episode survives. `watched` flags always describe the full node.
    pub fn view(&self, query: &DashboardQuery) -> TrackingResult<Vec<DashboardItem>> {
        let filter = query.filter;
        let mut shows = Vec::new();
        if query.kind != KindFilter::Movies {
            for show in self.catalog.list_shows()? {
                if !query.matches_title(&show.title) {
                    continue;
                }
                if let Some(item) = self.show_item(show, filter)? {
                    shows.push((item.show.order_key(), item.show.id, item));
                }
            }
        }
        let movies = if query.kind == KindFilter::Shows {
            Vec::new()
        } else {
            self.catalog
                .list_movies()?
                .into_iter()
                .filter(|m| filter == DashboardFilter::All || !m.watched)
                .filter(|m| query.matches_title(&m.title))
                .map(|m| (m.order_key(), m.id, m))
                .collect()
        };

        let mut items: Vec<DashboardItem> = sort_top_level(shows, movies)
            .into_iter()
            .map(|item| match item {
                TopLevel::Show(show) => DashboardItem::Show(show),
                TopLevel::Movie(movie) => DashboardItem::Movie(movie),
            })
            .collect();
        // stable sorts: display order breaks ties
        match query.sort {
            DashboardSort::Order => {}
            DashboardSort::Title => items.sort_by_cached_key(|item| item.title().to_lowercase()),
            DashboardSort::ImdbRating => items.sort_by(imdb_descending),
        }
        Ok(items)
    }

    fn show_item(&self, show: Show, filter: DashboardFilter) -> TrackingResult<Option<DashboardShow>> {
        let mut all_episodes = Vec::new();
        let mut seasons = Vec::new();
        for season in self.catalog.get_show_seasons(show.id)? {
            let episodes = self.catalog.get_season_episodes(season.id)?;
            let watched = season_watched(&episodes);
            let kept: Vec<Episode> = match filter {
                DashboardFilter::All => episodes.clone(),
                DashboardFilter::Unwatched => {
                    episodes.iter().filter(|e| !e.watched).cloned().collect()
                }
            };
            all_episodes.push(episodes);
            if filter == DashboardFilter::Unwatched && kept.is_empty() {
                continue;
            }
            seasons.push(DashboardSeason {
                display_artwork_url: season.display_artwork_url(&show).map(str::to_string),
                season,
                watched,
                episodes: kept,
            });
        }

        if filter == DashboardFilter::Unwatched && seasons.is_empty() {
            return Ok(None);
        }
        Ok(Some(DashboardShow {
            watched: show_watched(&all_episodes),
            show,
            seasons,
        }))
    }
}
