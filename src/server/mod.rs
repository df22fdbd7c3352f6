//! HTTP front end.
//!
//! A single listener serves both surfaces: `/api/*` goes to the admin API,
//! everything else is treated as mock traffic. Mock exchanges under the
//! mock prefix are captured in the access log.

mod router;

pub use router::{MockRouter, RouteMatch};

use crate::access_log::{AccessLogEntry, AccessLogStore, LoggedRequest, LoggedResponse};
use crate::admin_api;
use crate::constants::{ACCESS_LOG_CAPACITY, ADMIN_URL_PREFIX, MOCK_URL_PREFIX};
use crate::dispatcher::MockDispatcher;
use crate::registry::MockMethod;
use crate::request::{parse_body, parse_query_string, MockRequest, MockResponse};
use crate::settings::ServerSettings;
use bytes::Bytes;
use chrono::Utc;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{HeaderMap, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Shared state behind every connection.
pub struct AppState {
    pub dispatcher: MockDispatcher,
    pub router: MockRouter,
    pub settings: ServerSettings,
    pub access_log: AccessLogStore,
}

pub struct MockServer {
    state: Arc<AppState>,
}

impl MockServer {
    pub fn new(settings: ServerSettings, dispatcher: MockDispatcher) -> Self {
        let router = MockRouter::build(dispatcher.routes());
        let state = Arc::new(AppState {
            dispatcher,
            router,
            settings,
            access_log: AccessLogStore::new(ACCESS_LOG_CAPACITY),
        });
        Self { state }
    }

    pub async fn run(self) -> Result<(), anyhow::Error> {
        let addr = format!(
            "{}:{}",
            self.state.settings.http.host, self.state.settings.http.port
        );
        let listener = TcpListener::bind(&addr).await?;
        info!("Mock server listening on http://{}", addr);

        loop {
            let (stream, _) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let state = Arc::clone(&self.state);

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let state = Arc::clone(&state);
                    async move { handle_request(req, state).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    debug!("Connection error: {}", e);
                }
            });
        }
    }
}

async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let started = Instant::now();
    let method = req.method().clone();
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = if is_admin_path(req.uri().path()) {
        admin_api::route_request(req, &state).await?
    } else {
        handle_mock_request(req, &state).await?
    };

    info!(
        "{} {} {} {:.3} ms",
        method,
        target,
        response.status().as_u16(),
        started.elapsed().as_secs_f64() * 1000.0
    );

    Ok(response)
}

async fn handle_mock_request(
    req: Request<Incoming>,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let (parts, body) = req.into_parts();
    let path = parts.uri.path().to_string();
    let url = parts
        .uri
        .path_and_query()
        .map(|pq| pq.to_string())
        .unwrap_or_else(|| path.clone());
    let body_bytes = body.collect().await?.to_bytes();

    let headers = header_map_to_hash(&parts.headers);
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let parsed_body = parse_body(content_type, &body_bytes);

    let matched = mock_method_for(&parts.method)
        .and_then(|method| state.router.lookup(method, &path));

    let mock_response = match matched {
        Some(matched) => {
            let route = &state.dispatcher.routes()[matched.index];
            let request = MockRequest {
                method: parts.method.as_str().to_string(),
                path: path.clone(),
                params: matched.params,
                query: parse_query_string(parts.uri.query().unwrap_or("")),
                headers: headers.clone(),
                body: parsed_body.clone(),
            };
            state.dispatcher.handle(route, &request).await
        }
        None => {
            info!("No route matched {} {}", parts.method, path);
            MockResponse::empty(404)
        }
    };

    if is_mock_path(&path) {
        state.access_log.push(AccessLogEntry {
            req: LoggedRequest {
                url,
                method: parts.method.to_string(),
                headers,
                body: parsed_body,
                datetime: Utc::now(),
            },
            res: LoggedResponse {
                status_code: mock_response.status,
                headers: mock_response.headers.clone(),
                body: String::from_utf8_lossy(&mock_response.body).into_owned(),
                datetime: Utc::now(),
            },
        });
    }

    Ok(build_mock_response(mock_response))
}

/// Turn an engine response into a hyper response. A header that does not
/// survive the trip (invalid name or value) collapses the whole response
/// to an empty 500, matching how other mock failures surface.
fn build_mock_response(mock: MockResponse) -> Response<Full<Bytes>> {
    let status = StatusCode::from_u16(mock.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = Response::builder().status(status);
    for (name, value) in &mock.headers {
        builder = builder.header(name, value);
    }
    match builder.body(Full::new(mock.body)) {
        Ok(response) => response,
        Err(e) => {
            warn!("Failed to build mock response: {}", e);
            let mut response = Response::new(Full::new(Bytes::new()));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

fn header_map_to_hash(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

fn mock_method_for(method: &Method) -> Option<MockMethod> {
    match method {
        &Method::GET => Some(MockMethod::Get),
        &Method::PUT => Some(MockMethod::Put),
        &Method::POST => Some(MockMethod::Post),
        &Method::PATCH => Some(MockMethod::Patch),
        &Method::DELETE => Some(MockMethod::Delete),
        _ => None,
    }
}

fn is_admin_path(path: &str) -> bool {
    match path.strip_prefix(ADMIN_URL_PREFIX) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn is_mock_path(path: &str) -> bool {
    match path.strip_prefix(MOCK_URL_PREFIX) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
