//! Wire types and response helpers for the admin API.

use crate::registry::MockRoute;
use crate::resolver::ParserFileSet;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};

/// One mock endpoint together with its rule files.
#[derive(Debug, Serialize)]
pub struct MockWithParsers {
    pub mock: MockRoute,
    pub parsers: ParserFileSet,
}

/// Body of `PATCH /api/mocks/:id`.
#[derive(Debug, Deserialize)]
pub struct UpdateMockRequest {
    pub parser: String,
}

/// JSON response with the given status.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string_pretty(body).unwrap_or_default();
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|_| empty_response(StatusCode::INTERNAL_SERVER_ERROR))
}

/// Response with a status and no body. Admin failures surface this way;
/// the cause goes to the log, not to the client.
pub fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

/// Read the full request body.
pub async fn collect_body(req: Request<Incoming>) -> Result<Bytes, String> {
    req.collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| format!("Failed to read request body: {e}"))
}
