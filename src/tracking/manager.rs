use super::dashboard::{Dashboard, DashboardItem, DashboardQuery};
use super::error::{TrackingError, TrackingResult};
use super::export::{
    ExportSelection, ExportSerializer, ExportSummaryItem, NotesExport, SelectedNote,
};
use super::fetch_node;
use super::profile::{ProfileBuilder, ProfileSummary};
use super::ratings::RatingAggregator;
use super::resolver::AnnotationResolver;
use super::reviews::{Review, ReviewCollator};
use super::stats::{StatsCalculator, StatsScope, WatchStats};
use super::status::StatusAggregator;
use crate::catalog_store::{CatalogStore, ContentKind, ContentNode, ContentRef};
use crate::user::FullUserStore;
use serde::Serialize;
use std::sync::Arc;

/// A node with every derived view the caller may want to show.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeDetail {
    pub node: ContentNode,
    pub display_artwork_url: Option<String>,
    pub watched: bool,
    pub user_rating: Option<f64>,
    pub avg_rating: Option<f64>,
    pub average_rating: Option<f64>,
    pub reviews: Vec<Review>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReviewsView {
    pub average_rating: Option<f64>,
    pub reviews: Vec<Review>,
}

/// Entry point of the tracking engine.
///
/// Node kinds arrive already parsed; everything below works on
/// [`ContentRef`] and never re-derives a kind from a node.
pub struct TrackingManager {
    catalog: Arc<dyn CatalogStore>,
    users: Arc<dyn FullUserStore>,
    status: StatusAggregator,
    ratings: RatingAggregator,
    resolver: AnnotationResolver,
    reviews: ReviewCollator,
    export: ExportSerializer,
    dashboard: Dashboard,
    stats: StatsCalculator,
    profile: ProfileBuilder,
}

impl TrackingManager {
    pub fn new(catalog: Arc<dyn CatalogStore>, users: Arc<dyn FullUserStore>) -> Self {
        Self {
            status: StatusAggregator::new(catalog.clone()),
            ratings: RatingAggregator::new(catalog.clone(), users.clone()),
            resolver: AnnotationResolver::new(catalog.clone(), users.clone()),
            reviews: ReviewCollator::new(users.clone()),
            export: ExportSerializer::new(catalog.clone(), users.clone()),
            dashboard: Dashboard::new(catalog.clone()),
            stats: StatsCalculator::new(catalog.clone(), users.clone()),
            profile: ProfileBuilder::new(catalog.clone(), users.clone()),
            catalog,
            users,
        }
    }

    pub fn get_content_node(&self, kind: ContentKind, id: i64) -> TrackingResult<ContentNode> {
        fetch_node(self.catalog.as_ref(), ContentRef::new(kind, id))
    }

    pub fn toggle_watched(&self, kind: ContentKind, id: i64, watched: bool) -> TrackingResult<()> {
        self.status.set_watched(ContentRef::new(kind, id), watched)
    }

    pub fn is_watched(&self, kind: ContentKind, id: i64) -> TrackingResult<bool> {
        self.status.is_watched(ContentRef::new(kind, id))
    }

    pub fn submit_annotation(
        &self,
        user_id: i64,
        kind: ContentKind,
        id: i64,
        note: Option<&str>,
        rating: Option<f64>,
    ) -> TrackingResult<()> {
        self.resolver
            .submit(user_id, ContentRef::new(kind, id), note, rating)
    }

    pub fn dashboard_view(&self, query: &DashboardQuery) -> TrackingResult<Vec<DashboardItem>> {
        self.dashboard.view(query)
    }

    pub fn export_notes(&self, user_id: i64) -> TrackingResult<NotesExport> {
        let handle = self.user_handle(user_id)?;
        self.export.export(user_id, &handle)
    }

    pub fn export_selected_notes(
        &self,
        user_id: i64,
        selection: &ExportSelection,
    ) -> TrackingResult<Vec<SelectedNote>> {
        self.user_handle(user_id)?;
        self.export.export_selected(user_id, selection)
    }

    pub fn export_summary(
        &self,
        user_id: i64,
        include_others: bool,
    ) -> TrackingResult<Vec<ExportSummaryItem>> {
        self.user_handle(user_id)?;
        self.export.summary(user_id, include_others)
    }

    pub fn profile(&self, user_id: i64) -> TrackingResult<ProfileSummary> {
        let handle = self.user_handle(user_id)?;
        self.profile.summary(user_id, &handle)
    }

    pub fn node_detail(&self, user_id: i64, kind: ContentKind, id: i64) -> TrackingResult<NodeDetail> {
        let target = ContentRef::new(kind, id);
        let node = fetch_node(self.catalog.as_ref(), target)?;
        Ok(NodeDetail {
            display_artwork_url: self.display_artwork_url(&node)?,
            watched: self.status.is_watched(target)?,
            user_rating: self.ratings.user_rating(target, user_id)?,
            avg_rating: self.ratings.avg_rating(target)?,
            average_rating: self.reviews.average_rating(target)?,
            reviews: self.reviews.reviews_for(target)?,
            node,
        })
    }

    pub fn reviews(&self, kind: ContentKind, id: i64) -> TrackingResult<ReviewsView> {
        let target = ContentRef::new(kind, id);
        fetch_node(self.catalog.as_ref(), target)?;
        Ok(ReviewsView {
            average_rating: self.reviews.average_rating(target)?,
            reviews: self.reviews.reviews_for(target)?,
        })
    }

    pub fn stats(&self, user_id: Option<i64>, scope: StatsScope) -> TrackingResult<WatchStats> {
        self.stats.stats(user_id, scope)
    }

    pub fn find_user(&self, handle: &str) -> TrackingResult<Option<i64>> {
        Ok(self.users.get_user_id(handle)?)
    }

    fn user_handle(&self, user_id: i64) -> TrackingResult<String> {
        self.users
            .get_user_handle(user_id)?
            .ok_or(TrackingError::UnknownUser(user_id))
    }

    /// Seasons and episodes without artwork borrow the show's.
    fn display_artwork_url(&self, node: &ContentNode) -> TrackingResult<Option<String>> {
        let url = match node {
            ContentNode::Show(show) => show.artwork_url.clone(),
            ContentNode::Movie(movie) => movie.artwork_url.clone(),
            ContentNode::Season(season) => match self.catalog.get_show(season.show_id)? {
                Some(show) => season.display_artwork_url(&show).map(str::to_string),
                None => season.artwork_url.clone(),
            },
            ContentNode::Episode(episode) => {
                let show = match self.catalog.get_season(episode.season_id)? {
                    Some(season) => self.catalog.get_show(season.show_id)?,
                    None => None,
                };
                match show {
                    Some(show) => episode.display_artwork_url(&show).map(str::to_string),
                    None => episode.artwork_url.clone(),
                }
            }
        };
        Ok(url)
    }
}
