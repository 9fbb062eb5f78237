use super::state::ServerState;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::IntoResponse,
};
use tracing::{debug, error};

/// The acting user, as vouched for by the upstream proxy.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub user_handle: String,
}

pub const HEADER_USER_HANDLE_KEY: &str = "X-Watchlog-User";

#[derive(Debug)]
pub enum SessionExtractionError {
    AccessDenied,
    InternalError,
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> axum::response::Response {
        match self {
            SessionExtractionError::AccessDenied => StatusCode::FORBIDDEN.into_response(),
            SessionExtractionError::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

fn extract_user_handle_from_headers(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(HEADER_USER_HANDLE_KEY)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_string())
        .filter(|handle| !handle.is_empty())
}

fn extract_session_from_request_parts(
    parts: &Parts,
    ctx: &ServerState,
) -> Result<Option<Session>, SessionExtractionError> {
    let user_handle = match extract_user_handle_from_headers(parts) {
        None => {
            debug!("No {} header in request.", HEADER_USER_HANDLE_KEY);
            return Ok(None);
        }
        Some(x) => x,
    };

    match ctx.tracking.find_user(&user_handle) {
        Ok(Some(user_id)) => {
            debug!("Resolved user {} to id {}", user_handle, user_id);
            Ok(Some(Session {
                user_id,
                user_handle,
            }))
        }
        Ok(None) => {
            debug!("Unknown user handle {}", user_handle);
            Ok(None)
        }
        Err(err) => {
            error!("Failed to look up user {}: {}", user_handle, err);
            Err(SessionExtractionError::InternalError)
        }
    }
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx)?.ok_or(SessionExtractionError::AccessDenied)
    }
}

impl FromRequestParts<ServerState> for Option<Session> {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx)
    }
}
