//! Route dispatch logic for the admin API.

use crate::admin_api::handlers::{mocks, system};
use crate::admin_api::types::empty_response;
use crate::server::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use tracing::{debug, info};

/// Dispatch an admin request to its handler.
pub async fn route_request(
    req: Request<Incoming>,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("Admin API: {} {}", method, path);

    let response = match (&method, path.as_str()) {
        (&Method::GET, "/api/mocks") => mocks::handle_list(state).await,
        (&Method::GET, "/api/server") => system::handle_server_settings(state),
        (&Method::GET, "/api/logs") => system::handle_logs(state),
        (&Method::PATCH, _) => match mock_id_segment(&path) {
            Some(id) => mocks::handle_update(&id, req, state).await,
            None => not_found(&method, &path),
        },
        _ => not_found(&method, &path),
    };

    Ok(response)
}

fn not_found(method: &Method, path: &str) -> Response<Full<Bytes>> {
    info!("No route matched {} {}", method, path);
    empty_response(StatusCode::NOT_FOUND)
}

/// Extract and decode the id from `/api/mocks/:id`. Clients percent-encode
/// ids because the raw form can contain `/`, `+` and `=`.
fn mock_id_segment(path: &str) -> Option<String> {
    let rest = path.strip_prefix("/api/mocks/")?;
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    urlencoding::decode(rest).ok().map(|id| id.into_owned())
}
