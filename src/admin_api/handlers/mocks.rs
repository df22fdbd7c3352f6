//! Handlers for the mock collection endpoints.

use crate::admin_api::types::{
    collect_body, empty_response, json_response, MockWithParsers, UpdateMockRequest,
};
use crate::server::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use tracing::{error, info};

/// GET /api/mocks - list every mock with its rule files
pub async fn handle_list(state: &AppState) -> Response<Full<Bytes>> {
    match state.dispatcher.list_with_parser_sets().await {
        Ok(listed) => {
            let mocks: Vec<MockWithParsers> = listed
                .into_iter()
                .map(|(mock, parsers)| MockWithParsers { mock, parsers })
                .collect();
            json_response(StatusCode::OK, &mocks)
        }
        Err(e) => {
            error!("Failed to list mocks: {}", e);
            empty_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// PATCH /api/mocks/:id - pin the rule file a mock uses
pub async fn handle_update(
    id: &str,
    req: Request<Incoming>,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let body = match collect_body(req).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("{}", e);
            return empty_response(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let update: UpdateMockRequest = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            info!("Rejecting mock update: {}", e);
            return empty_response(StatusCode::BAD_REQUEST);
        }
    };

    match state.dispatcher.set_active_parser(id, &update.parser).await {
        Ok(()) => {
            info!("Mock {} now uses {}", id, update.parser);
            empty_response(StatusCode::NO_CONTENT)
        }
        Err(e) => {
            error!("Failed to update mock {}: {}", id, e);
            empty_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
