use anyhow::{Context, Result};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::catalog_store::ContentKind;
use crate::tracking::{
    render_markdown, DashboardQuery, ExportSelection, StatsScope, TrackingError, TrackingManager,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::session::Session;
use super::state::{GuardedTrackingManager, ServerState};
use super::{log_requests, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
    pub user_handle: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

impl IntoResponse for TrackingError {
    fn into_response(self) -> Response {
        let status = match &self {
            TrackingError::NotFound { .. } | TrackingError::UnknownUser(_) => {
                StatusCode::NOT_FOUND
            }
            TrackingError::Validation(_) => StatusCode::BAD_REQUEST,
            TrackingError::Consistency(_) | TrackingError::Store(_) => {
                error!("Request failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

type HandlerResult<T> = std::result::Result<T, TrackingError>;

#[derive(Deserialize, Debug)]
struct WatchedBody {
    pub watched: bool,
}

#[derive(Deserialize, Debug)]
struct AnnotationBody {
    pub note: Option<String>,
    pub rating: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
struct DashboardParams {
    pub filter: Option<String>,
    pub kind: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

/// Parses an optional query tag, falling back to the default when absent.
fn parse_tag<T>(tag: Option<&str>) -> HandlerResult<T>
where
    T: FromStr<Err = TrackingError> + Default,
{
    match tag {
        Some(tag) => tag.parse(),
        None => Ok(T::default()),
    }
}

impl DashboardParams {
    fn parse(self) -> HandlerResult<DashboardQuery> {
        Ok(DashboardQuery {
            filter: parse_tag(self.filter.as_deref())?,
            kind: parse_tag(self.kind.as_deref())?,
            sort: parse_tag(self.sort.as_deref())?,
            search: self.search,
        })
    }
}

#[derive(Deserialize, Debug, Default)]
struct ExportQuery {
    pub format: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct SummaryQuery {
    #[serde(default)]
    pub include_others: bool,
}

#[derive(Deserialize, Debug, Default)]
struct StatsQuery {
    pub scope: Option<String>,
    #[serde(default)]
    pub all_users: bool,
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: state.version.clone(),
        user_handle: session.map(|s| s.user_handle),
    };
    Json(stats)
}

async fn get_content(
    session: Session,
    State(tracking): State<GuardedTrackingManager>,
    Path((kind, id)): Path<(String, i64)>,
) -> HandlerResult<Response> {
    let kind: ContentKind = kind.parse()?;
    let detail = tracking.node_detail(session.user_id, kind, id)?;
    Ok(Json(detail).into_response())
}

async fn put_watched(
    _session: Session,
    State(tracking): State<GuardedTrackingManager>,
    Path((kind, id)): Path<(String, i64)>,
    Json(body): Json<WatchedBody>,
) -> HandlerResult<Response> {
    let kind: ContentKind = kind.parse()?;
    tracking.toggle_watched(kind, id, body.watched)?;
    Ok(StatusCode::OK.into_response())
}

async fn post_annotation(
    session: Session,
    State(tracking): State<GuardedTrackingManager>,
    Path((kind, id)): Path<(String, i64)>,
    Json(body): Json<AnnotationBody>,
) -> HandlerResult<Response> {
    let kind: ContentKind = kind.parse()?;
    tracking.submit_annotation(session.user_id, kind, id, body.note.as_deref(), body.rating)?;
    Ok(StatusCode::OK.into_response())
}

async fn get_reviews(
    _session: Session,
    State(tracking): State<GuardedTrackingManager>,
    Path((kind, id)): Path<(String, i64)>,
) -> HandlerResult<Response> {
    let kind: ContentKind = kind.parse()?;
    Ok(Json(tracking.reviews(kind, id)?).into_response())
}

async fn get_dashboard(
    _session: Session,
    State(tracking): State<GuardedTrackingManager>,
    Query(params): Query<DashboardParams>,
) -> HandlerResult<Response> {
    let query = params.parse()?;
    Ok(Json(tracking.dashboard_view(&query)?).into_response())
}

async fn get_notes_export(
    session: Session,
    State(tracking): State<GuardedTrackingManager>,
    Query(query): Query<ExportQuery>,
) -> HandlerResult<Response> {
    let export = tracking.export_notes(session.user_id)?;
    match query.format.as_deref().unwrap_or("markdown") {
        "markdown" => Ok((
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            render_markdown(&export),
        )
            .into_response()),
        "json" => Ok(Json(export).into_response()),
        other => Err(TrackingError::Validation(format!(
            "Unknown export format '{}'",
            other
        ))),
    }
}

async fn post_selected_export(
    session: Session,
    State(tracking): State<GuardedTrackingManager>,
    Json(selection): Json<ExportSelection>,
) -> HandlerResult<Response> {
    let notes = tracking.export_selected_notes(session.user_id, &selection)?;
    Ok(Json(json!({ "notes": notes })).into_response())
}

async fn get_export_summary(
    session: Session,
    State(tracking): State<GuardedTrackingManager>,
    Query(query): Query<SummaryQuery>,
) -> HandlerResult<Response> {
    let items = tracking.export_summary(session.user_id, query.include_others)?;
    Ok(Json(json!({ "items": items })).into_response())
}

async fn get_profile(
    session: Session,
    State(tracking): State<GuardedTrackingManager>,
) -> HandlerResult<Response> {
    Ok(Json(tracking.profile(session.user_id)?).into_response())
}

async fn get_stats(
    session: Session,
    State(tracking): State<GuardedTrackingManager>,
    Query(query): Query<StatsQuery>,
) -> HandlerResult<Response> {
    let scope: StatsScope = parse_tag(query.scope.as_deref())?;
    let user_filter = if query.all_users {
        None
    } else {
        Some(session.user_id)
    };
    Ok(Json(tracking.stats(user_filter, scope)?).into_response())
}

pub fn make_app(config: ServerConfig, tracking: Arc<TrackingManager>) -> Router {
    let state = ServerState {
        config,
        start_time: Instant::now(),
        tracking,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let content_routes: Router = Router::new()
        .route("/{kind}/{id}", get(get_content))
        .route("/{kind}/{id}/watched", put(put_watched))
        .route("/{kind}/{id}/annotation", post(post_annotation))
        .route("/{kind}/{id}/reviews", get(get_reviews))
        .with_state(state.clone());

    let user_routes: Router = Router::new()
        .route("/notes/export", get(get_notes_export))
        .route("/notes/export/selected", post(post_selected_export))
        .route("/notes/summary", get(get_export_summary))
        .route("/profile", get(get_profile))
        .route("/stats", get(get_stats))
        .with_state(state.clone());

    let home_router: Router = Router::new()
        .route("/", get(home))
        .route("/v1/dashboard", get(get_dashboard))
        .with_state(state.clone());

    home_router
        .nest("/v1/content", content_routes)
        .nest("/v1/user", user_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(config: ServerConfig, tracking: Arc<TrackingManager>) -> Result<()> {
    let port = config.port;
    let app = make_app(config, tracking);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Could not bind port {}", port))?;
    info!("Listening on 127.0.0.1:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await?;
    Ok(())
}
