//! Handlers for server settings and the access log.

use crate::admin_api::types::json_response;
use crate::server::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

/// GET /api/server - effective server settings
pub fn handle_server_settings(state: &AppState) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &state.settings)
}

/// GET /api/logs - recent mock traffic, newest first
pub fn handle_logs(state: &AppState) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &state.access_log.entries())
}
