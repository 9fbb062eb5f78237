//! Content hierarchy models.
//!
//! Shows own seasons, seasons own episodes, movies stand alone. Only the leaf
//! kinds (episode, movie) carry a stored `watched` flag.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort key used for nodes without a display order, after every real order.
pub const NULL_ORDER_SENTINEL: i64 = i64::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Episode,
    Movie,
    Season,
    Show,
}

impl ContentKind {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ContentKind::Episode => "episode",
            ContentKind::Movie => "movie",
            ContentKind::Season => "season",
            ContentKind::Show => "show",
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, ContentKind::Episode | ContentKind::Movie)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownContentKind(pub String);

impl fmt::Display for UnknownContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown content type '{}'", self.0)
    }
}

impl std::error::Error for UnknownContentKind {}

impl FromStr for ContentKind {
    type Err = UnknownContentKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "episode" => Ok(ContentKind::Episode),
            "movie" => Ok(ContentKind::Movie),
            "season" => Ok(ContentKind::Season),
            "show" => Ok(ContentKind::Show),
            other => Err(UnknownContentKind(other.to_string())),
        }
    }
}

/// Reference to exactly one node of exactly one kind.
///
/// This is the target of every annotation; the kind is carried with the id
/// and never re-derived from the node itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ContentRef {
    Episode(i64),
    Movie(i64),
    Season(i64),
    Show(i64),
}

impl ContentRef {
    pub fn new(kind: ContentKind, id: i64) -> Self {
        match kind {
            ContentKind::Episode => ContentRef::Episode(id),
            ContentKind::Movie => ContentRef::Movie(id),
            ContentKind::Season => ContentRef::Season(id),
            ContentKind::Show => ContentRef::Show(id),
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ContentRef::Episode(_) => ContentKind::Episode,
            ContentRef::Movie(_) => ContentKind::Movie,
            ContentRef::Season(_) => ContentKind::Season,
            ContentRef::Show(_) => ContentKind::Show,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            ContentRef::Episode(id)
            | ContentRef::Movie(id)
            | ContentRef::Season(id)
            | ContentRef::Show(id) => *id,
        }
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub order: Option<i64>,
    pub artwork_url: Option<String>,
    pub imdb_rating: Option<f64>,
}

impl Show {
    pub fn order_key(&self) -> i64 {
        self.order.unwrap_or(NULL_ORDER_SENTINEL)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: i64,
    pub show_id: i64,
    pub number: i32,
    pub artwork_url: Option<String>,
    pub imdb_rating: Option<f64>,
}

impl Season {
    pub fn display_artwork_url<'a>(&'a self, show: &'a Show) -> Option<&'a str> {
        self.artwork_url
            .as_deref()
            .or(show.artwork_url.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: i64,
    pub season_id: i64,
    pub title: String,
    pub episode_number: Option<i32>,
    pub air_date: Option<NaiveDate>,
    pub artwork_url: Option<String>,
    pub imdb_rating: Option<f64>,
    pub watched: bool,
}

impl Episode {
    pub fn display_artwork_url<'a>(&'a self, show: &'a Show) -> Option<&'a str> {
        self.artwork_url
            .as_deref()
            .or(show.artwork_url.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub order: Option<i64>,
    pub artwork_url: Option<String>,
    pub imdb_rating: Option<f64>,
    pub watched: bool,
}

impl Movie {
    pub fn order_key(&self) -> i64 {
        self.order.unwrap_or(NULL_ORDER_SENTINEL)
    }
}

/// A node of any kind, resolved from the store.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentNode {
    Episode(Episode),
    Movie(Movie),
    Season(Season),
    Show(Show),
}

/// Top-level catalog entry, as listed on the dashboard and in exports.
#[derive(Clone, Debug, PartialEq)]
pub enum TopLevel<S, M> {
    Show(S),
    Movie(M),
}

/// Merges shows and movies into one list ordered by display order.
///
/// Nulls go last. Equal keys keep encounter order: every show (by id) before
/// every movie (by id).
pub fn sort_top_level<S, M>(
    mut shows: Vec<(i64, i64, S)>,
    mut movies: Vec<(i64, i64, M)>,
) -> Vec<TopLevel<S, M>> {
    shows.sort_by_key(|(_, id, _)| *id);
    movies.sort_by_key(|(_, id, _)| *id);
    let mut merged: Vec<(i64, TopLevel<S, M>)> = shows
        .into_iter()
        .map(|(order, _, s)| (order, TopLevel::Show(s)))
        .chain(
            movies
                .into_iter()
                .map(|(order, _, m)| (order, TopLevel::Movie(m))),
        )
        .collect();
    // stable sort keeps the encounter order on ties
    merged.sort_by_key(|(order, _)| *order);
    merged.into_iter().map(|(_, item)| item).collect()
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewShow {
    pub title: String,
    pub description: Option<String>,
    pub order: Option<i64>,
    pub artwork_url: Option<String>,
    pub imdb_rating: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewSeason {
    pub show_id: i64,
    pub number: i32,
    pub artwork_url: Option<String>,
    pub imdb_rating: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewEpisode {
    pub season_id: i64,
    pub title: String,
    pub episode_number: Option<i32>,
    pub air_date: Option<NaiveDate>,
    pub artwork_url: Option<String>,
    pub imdb_rating: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub order: Option<i64>,
    pub artwork_url: Option<String>,
    pub imdb_rating: Option<f64>,
}
