//! Ties the registry, resolver and evaluator together for one request.
//!
//! Every step reads from disk again, so rule files and body files can be
//! edited while the server runs. Any failure along the way collapses to an
//! empty 500 for the caller; the cause is logged.

use crate::error::MockError;
use crate::evaluator::{self, ResponseDetail};
use crate::registry::MockRoute;
use crate::request::{MockRequest, MockResponse};
use crate::resolver::{self, ParserFileSet};
use crate::settings::UserSettingsStore;
use bytes::Bytes;
use hyper::StatusCode;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::error;

pub struct MockDispatcher {
    routes: Vec<MockRoute>,
    settings: Arc<UserSettingsStore>,
}

impl MockDispatcher {
    pub fn new(routes: Vec<MockRoute>, settings: Arc<UserSettingsStore>) -> Self {
        Self { routes, settings }
    }

    pub fn routes(&self) -> &[MockRoute] {
        &self.routes
    }

    pub fn find_route(&self, id: &str) -> Option<&MockRoute> {
        self.routes.iter().find(|route| route.id == id)
    }

    /// Rule files for one mock, with the user's override applied.
    pub async fn parser_set_for(&self, route: &MockRoute) -> Result<ParserFileSet, MockError> {
        let requested = self.settings.parser_for(&route.url_path, route.method);
        resolver::resolve(&route.directory_path, &requested).await
    }

    /// Every mock with its rule files. Fails as a whole if any single mock
    /// cannot be resolved.
    pub async fn list_with_parser_sets(
        &self,
    ) -> Result<Vec<(MockRoute, ParserFileSet)>, MockError> {
        let mut listed = Vec::with_capacity(self.routes.len());
        for route in &self.routes {
            let parser_set = self.parser_set_for(route).await?;
            listed.push((route.clone(), parser_set));
        }
        Ok(listed)
    }

    /// Pin a rule file for a mock. The file must exist in the mock's
    /// directory but does not have to follow the candidate naming scheme.
    pub async fn set_active_parser(&self, id: &str, parser: &str) -> Result<(), MockError> {
        let route = self
            .find_route(id)
            .ok_or_else(|| MockError::RouteNotFound(id.to_string()))?;
        let candidate = route.directory_path.join(parser);
        if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return Err(MockError::FileNotFound(candidate));
        }
        self.settings
            .set_parser(&route.url_path, route.method, parser)
            .await
    }

    /// Produce the response for a matched mock. Failures are logged and
    /// surface as an empty 500.
    pub async fn handle(&self, route: &MockRoute, request: &MockRequest) -> MockResponse {
        match self.try_handle(route, request).await {
            Ok(response) => response,
            Err(e) => {
                error!("Mock {} {} failed: {}", route.method, route.url_path, e);
                MockResponse::empty(500)
            }
        }
    }

    async fn try_handle(
        &self,
        route: &MockRoute,
        request: &MockRequest,
    ) -> Result<MockResponse, MockError> {
        let parser_set = self.parser_set_for(route).await?;
        let rule_path = route.directory_path.join(&parser_set.current);
        let content = read_file(&rule_path).await?;
        let detail = evaluator::evaluate(&rule_path, &content, request)?;
        render(route, detail).await
    }
}

async fn render(route: &MockRoute, detail: ResponseDetail) -> Result<MockResponse, MockError> {
    let status = detail.status.unwrap_or(200);
    if StatusCode::from_u16(status).is_err() {
        return Err(MockError::InvalidStatus(status));
    }

    let body = if let Some(file) = &detail.body {
        let path = route.directory_path.join(file);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(MockError::FileNotFound(path));
            }
            Err(e) => return Err(MockError::Io(e)),
        }
    } else if let Some(raw) = detail.raw_body {
        Bytes::from(raw)
    } else {
        Bytes::new()
    };

    Ok(MockResponse {
        status,
        headers: detail.headers.unwrap_or_default(),
        body,
    })
}

async fn read_file(path: &Path) -> Result<String, MockError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(MockError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => Err(MockError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup(files: &[(&str, &str)]) -> (TempDir, MockDispatcher) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("mock");
        for (rel, content) in files {
            let path = root.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, content).unwrap();
        }
        let routes = registry::discover(&root);
        let settings = Arc::new(UserSettingsStore::load(dir.path().join("user.yml")));
        (dir, MockDispatcher::new(routes, settings))
    }

    fn request(method: &str, path: &str) -> MockRequest {
        MockRequest {
            method: method.to_string(),
            path: path.to_string(),
            ..MockRequest::default()
        }
    }

    fn route<'a>(dispatcher: &'a MockDispatcher, url_path: &str) -> &'a MockRoute {
        dispatcher
            .routes()
            .iter()
            .find(|route| route.url_path == url_path)
            .unwrap()
    }

    #[tokio::test]
    async fn test_yaml_rule_renders_response() {
        let (_dir, dispatcher) = setup(&[(
            "users/@get/parser-default.yml",
            "status: 200\nrawBody: hello\n",
        )]);

        let route = route(&dispatcher, "/mock/users");
        let response = dispatcher.handle(route, &request("GET", "/mock/users")).await;
        assert_eq!(response.status, 200);
        assert_eq!(&response.body[..], b"hello");
    }

    #[tokio::test]
    async fn test_script_rule_renders_response() {
        let (_dir, dispatcher) = setup(&[(
            "users/@post/parser-default.rhai",
            r#"#{ status: 201, rawBody: request.body.name }"#,
        )]);

        let mut req = request("POST", "/mock/users");
        req.body = json!({"name": "thing"});
        let route = route(&dispatcher, "/mock/users");
        let response = dispatcher.handle(route, &req).await;
        assert_eq!(response.status, 201);
        assert_eq!(&response.body[..], b"thing");
    }

    #[tokio::test]
    async fn test_body_file_read_from_mock_directory() {
        let (_dir, dispatcher) = setup(&[
            ("users/@get/parser-default.yml", "body: data.json\n"),
            ("users/@get/data.json", r#"{"ok":true}"#),
        ]);

        let route = route(&dispatcher, "/mock/users");
        let response = dispatcher.handle(route, &request("GET", "/mock/users")).await;
        assert_eq!(response.status, 200);
        assert_eq!(&response.body[..], br#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn test_missing_body_file_is_500() {
        let (_dir, dispatcher) = setup(&[("users/@get/parser-default.yml", "body: missing.json\n")]);

        let route = route(&dispatcher, "/mock/users");
        let response = dispatcher.handle(route, &request("GET", "/mock/users")).await;
        assert_eq!(response.status, 500);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_unmatched_rules_are_500() {
        let rules = "- if:\n    query:\n      flag: \"1\"\n  then:\n    status: 200\n";
        let (_dir, dispatcher) = setup(&[("users/@get/parser-default.yml", rules)]);

        let route = route(&dispatcher, "/mock/users");
        let response = dispatcher.handle(route, &request("GET", "/mock/users")).await;
        assert_eq!(response.status, 500);
    }

    #[tokio::test]
    async fn test_invalid_status_is_500() {
        let (_dir, dispatcher) = setup(&[("users/@get/parser-default.yml", "status: 1000\n")]);

        let route = route(&dispatcher, "/mock/users");
        let response = dispatcher.handle(route, &request("GET", "/mock/users")).await;
        assert_eq!(response.status, 500);
    }

    #[tokio::test]
    async fn test_pinned_parser_takes_effect() {
        let (_dir, dispatcher) = setup(&[
            ("users/@get/parser-default.yml", "rawBody: default\n"),
            ("users/@get/parser-alt.yml", "rawBody: alternate\n"),
        ]);

        let id = route(&dispatcher, "/mock/users").id.clone();
        dispatcher
            .set_active_parser(&id, "parser-alt.yml")
            .await
            .unwrap();

        let route = route(&dispatcher, "/mock/users");
        let response = dispatcher.handle(route, &request("GET", "/mock/users")).await;
        assert_eq!(&response.body[..], b"alternate");
    }

    #[tokio::test]
    async fn test_pinned_unsupported_format_is_500() {
        let (_dir, dispatcher) = setup(&[
            ("users/@get/parser-default.yml", "rawBody: default\n"),
            ("users/@get/notes.txt", "not a rule file"),
        ]);

        let id = route(&dispatcher, "/mock/users").id.clone();
        dispatcher
            .set_active_parser(&id, "notes.txt")
            .await
            .unwrap();

        let route = route(&dispatcher, "/mock/users");
        let response = dispatcher.handle(route, &request("GET", "/mock/users")).await;
        assert_eq!(response.status, 500);
    }

    #[tokio::test]
    async fn test_set_active_parser_unknown_id() {
        let (_dir, dispatcher) = setup(&[("users/@get/parser-default.yml", "status: 200\n")]);

        let err = dispatcher
            .set_active_parser("bogus", "parser-default.yml")
            .await
            .unwrap_err();
        assert!(matches!(err, MockError::RouteNotFound(_)));
    }

    #[tokio::test]
    async fn test_set_active_parser_missing_file() {
        let (_dir, dispatcher) = setup(&[("users/@get/parser-default.yml", "status: 200\n")]);

        let id = route(&dispatcher, "/mock/users").id.clone();
        let err = dispatcher
            .set_active_parser(&id, "parser-nope.yml")
            .await
            .unwrap_err();
        assert!(matches!(err, MockError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_reports_every_mock() {
        let (_dir, dispatcher) = setup(&[
            ("users/@get/parser-default.yml", "status: 200\n"),
            ("users/@get/parser-alt.yml", "status: 201\n"),
            ("orders/@post/parser-default.yml", "status: 202\n"),
        ]);

        let listed = dispatcher.list_with_parser_sets().await.unwrap();
        assert_eq!(listed.len(), 2);

        let users = listed
            .iter()
            .find(|(route, _)| route.url_path == "/mock/users")
            .unwrap();
        assert_eq!(users.1.current, "parser-default.yml");
        assert_eq!(users.1.parsers.len(), 2);
    }

    #[tokio::test]
    async fn test_list_fails_when_any_mock_is_broken() {
        let (dir, dispatcher) = setup(&[
            ("users/@get/parser-default.yml", "status: 200\n"),
            ("orders/@post/parser-default.yml", "status: 202\n"),
        ]);

        std::fs::remove_file(
            dir.path()
                .join("mock")
                .join("orders")
                .join("@post")
                .join("parser-default.yml"),
        )
        .unwrap();

        assert!(dispatcher.list_with_parser_sets().await.is_err());
    }
}
