//! Watch tracking engine: status and rating rollups, annotation upserts,
//! reviews, dashboard, statistics, profile summary and the notes export.

mod dashboard;
mod error;
mod export;
mod manager;
mod profile;
mod ratings;
mod resolver;
mod reviews;
mod stats;
mod status;

#[cfg(test)]
mod test_fixtures;

pub use dashboard::{
    Dashboard, DashboardFilter, DashboardItem, DashboardQuery, DashboardSeason, DashboardShow,
    DashboardSort, KindFilter,
};
pub use error::{TrackingError, TrackingResult};
pub use export::{
    render_markdown, EpisodeNotes, ExportEntry, ExportSelection, ExportSerializer,
    ExportSummaryItem, MovieNotes, NotedProgress, NotesExport, SeasonNotes, SelectedNote,
    ShowNotes,
};
pub use manager::{NodeDetail, ReviewsView, TrackingManager};
pub use profile::{NoteExcerpt, ProfileBuilder, ProfileSummary, RatedTitle};
pub use ratings::{mean, RatingAggregator};
pub use resolver::{validate_rating, AnnotationResolver};
pub use reviews::{Review, ReviewCollator};
pub use stats::{RatingBucket, StatsCalculator, StatsScope, WatchStats};
pub use status::{CompositeRef, LeafRef, NodeClass, StatusAggregator};

use crate::catalog_store::{CatalogStore, ContentNode, ContentRef};

/// Resolves a reference to its node or a `NotFound` for that kind and id.
pub(crate) fn fetch_node(catalog: &dyn CatalogStore, target: ContentRef) -> TrackingResult<ContentNode> {
    let node = match target {
        ContentRef::Episode(id) => catalog.get_episode(id)?.map(ContentNode::Episode),
        ContentRef::Movie(id) => catalog.get_movie(id)?.map(ContentNode::Movie),
        ContentRef::Season(id) => catalog.get_season(id)?.map(ContentNode::Season),
        ContentRef::Show(id) => catalog.get_show(id)?.map(ContentNode::Show),
    };
    node.ok_or(TrackingError::not_found(target.kind(), target.id()))
}
