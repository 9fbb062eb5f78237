use axum::extract::FromRef;

use crate::tracking::TrackingManager;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedTrackingManager = Arc<TrackingManager>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub tracking: GuardedTrackingManager,
    pub version: String,
}

impl FromRef<ServerState> for GuardedTrackingManager {
    fn from_ref(input: &ServerState) -> Self {
        input.tracking.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
