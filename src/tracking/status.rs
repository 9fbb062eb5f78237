//! Watched status: stored on leaves, derived on composites.

use super::error::{TrackingError, TrackingResult};
use crate::catalog_store::{CatalogStore, ContentKind, ContentRef, Episode};
use std::sync::Arc;
use tracing::info;

/// A node with a stored watched flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafRef {
    Episode(i64),
    Movie(i64),
}

/// A node whose watched state is computed from its leaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeRef {
    Season(i64),
    Show(i64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeClass {
    Leaf(LeafRef),
    Composite(CompositeRef),
}

impl From<ContentRef> for NodeClass {
    fn from(target: ContentRef) -> Self {
        match target {
            ContentRef::Episode(id) => NodeClass::Leaf(LeafRef::Episode(id)),
            ContentRef::Movie(id) => NodeClass::Leaf(LeafRef::Movie(id)),
            ContentRef::Season(id) => NodeClass::Composite(CompositeRef::Season(id)),
            ContentRef::Show(id) => NodeClass::Composite(CompositeRef::Show(id)),
        }
    }
}

/// True iff there is at least one child and every child is watched.
pub fn all_watched<I: IntoIterator<Item = bool>>(children: I) -> bool {
    let mut any = false;
    for watched in children {
        if !watched {
            return false;
        }
        any = true;
    }
    any
}

pub fn season_watched(episodes: &[Episode]) -> bool {
    all_watched(episodes.iter().map(|e| e.watched))
}

pub fn show_watched(seasons: &[Vec<Episode>]) -> bool {
    all_watched(seasons.iter().map(|episodes| season_watched(episodes)))
}

pub struct StatusAggregator {
    catalog: Arc<dyn CatalogStore>,
}

impl StatusAggregator {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    pub fn is_watched(&self, target: ContentRef) -> TrackingResult<bool> {
        match NodeClass::from(target) {
            NodeClass::Leaf(leaf) => self.is_leaf_watched(leaf),
            NodeClass::Composite(composite) => self.is_aggregate_watched(composite),
        }
    }

    pub fn is_leaf_watched(&self, leaf: LeafRef) -> TrackingResult<bool> {
        match leaf {
            LeafRef::Episode(id) => self
                .catalog
                .get_episode(id)?
                .map(|e| e.watched)
                .ok_or(TrackingError::not_found(ContentKind::Episode, id)),
            LeafRef::Movie(id) => self
                .catalog
                .get_movie(id)?
                .map(|m| m.watched)
                .ok_or(TrackingError::not_found(ContentKind::Movie, id)),
        }
    }

    /// Never reads a stored flag for the composite itself.
    pub fn is_aggregate_watched(&self, composite: CompositeRef) -> TrackingResult<bool> {
        match composite {
            CompositeRef::Season(id) => {
                if self.catalog.get_season(id)?.is_none() {
                    return Err(TrackingError::not_found(ContentKind::Season, id));
                }
                let episodes = self.catalog.get_season_episodes(id)?;
                Ok(season_watched(&episodes))
            }
            CompositeRef::Show(id) => {
                if self.catalog.get_show(id)?.is_none() {
                    return Err(TrackingError::not_found(ContentKind::Show, id));
                }
                let seasons = self.load_show_episodes(id)?;
                Ok(show_watched(&seasons))
            }
        }
    }

    pub fn set_watched(&self, target: ContentRef, watched: bool) -> TrackingResult<()> {
        match NodeClass::from(target) {
            NodeClass::Leaf(leaf) => self.set_leaf_watched(leaf, watched),
            NodeClass::Composite(composite) => self.set_aggregate_watched(composite, watched),
        }
    }

    pub fn set_leaf_watched(&self, leaf: LeafRef, watched: bool) -> TrackingResult<()> {
        let (found, kind, id) = match leaf {
            LeafRef::Episode(id) => (
                self.catalog.set_episode_watched(id, watched)?,
                ContentKind::Episode,
                id,
            ),
            LeafRef::Movie(id) => (
                self.catalog.set_movie_watched(id, watched)?,
                ContentKind::Movie,
                id,
            ),
        };
        if !found {
            return Err(TrackingError::not_found(kind, id));
        }
        info!("Marked {} {} watched={}", kind, id, watched);
        Ok(())
    }

    /// Applies `watched` to every episode below the composite as one unit.
    /// A composite without episodes is left untouched.
    pub fn set_aggregate_watched(&self, composite: CompositeRef, watched: bool) -> TrackingResult<()> {
        let changed = match composite {
            CompositeRef::Season(id) => {
                if self.catalog.get_season(id)?.is_none() {
                    return Err(TrackingError::not_found(ContentKind::Season, id));
                }
                self.catalog.set_season_episodes_watched(id, watched)?
            }
            CompositeRef::Show(id) => {
                if self.catalog.get_show(id)?.is_none() {
                    return Err(TrackingError::not_found(ContentKind::Show, id));
                }
                self.catalog.set_show_episodes_watched(id, watched)?
            }
        };
        info!(
            "Marked {} episodes under {:?} watched={}",
            changed, composite, watched
        );
        Ok(())
    }

    fn load_show_episodes(&self, show_id: i64) -> TrackingResult<Vec<Vec<Episode>>> {
        self.catalog
            .get_show_seasons(show_id)?
            .iter()
            .map(|season| {
                self.catalog
                    .get_season_episodes(season.id)
                    .map_err(TrackingError::from)
            })
            .collect()
    }
}
