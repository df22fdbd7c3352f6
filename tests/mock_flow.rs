//! End-to-end tests over the engine: discovery, routing, rule evaluation
//! and overrides against a real mock tree on disk.

use mocktree::dispatcher::MockDispatcher;
use mocktree::registry::{self, MockMethod};
use mocktree::request::{MockRequest, MockResponse};
use mocktree::server::MockRouter;
use mocktree::settings::UserSettingsStore;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const ID_RULES: &str = r#"- if:
    params:
      id: 1
  then:
    status: 200
    rawBody: ada
- if:
    params:
      id: 2
  then:
    status: 404
"#;

struct TestServer {
    dir: TempDir,
    dispatcher: MockDispatcher,
    router: MockRouter,
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn test_server() -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("mock");

    write(
        &root,
        "users/@get/parser-default.yml",
        "status: 200\nbody: users.json\n",
    );
    write(
        &root,
        "users/@get/parser-empty.yml",
        "status: 200\nrawBody: \"[]\"\n",
    );
    write(&root, "users/@get/users.json", r#"[{"id":1,"name":"ada"}]"#);
    write(
        &root,
        "users/@post/parser-default.rhai",
        r#"#{ status: 201, rawBody: request.body.name }"#,
    );
    write(&root, "users/$id/@get/parser-default.yml", ID_RULES);
    write(&root, "health/@get/parser-default.yml", "rawBody: ok\n");

    let routes = registry::discover(&root);
    let router = MockRouter::build(&routes);
    let settings = Arc::new(UserSettingsStore::load(dir.path().join("user.yml")));
    let dispatcher = MockDispatcher::new(routes, settings);

    TestServer {
        dir,
        dispatcher,
        router,
    }
}

fn request(method: &str, path: &str) -> MockRequest {
    MockRequest {
        method: method.to_string(),
        path: path.to_string(),
        ..MockRequest::default()
    }
}

async fn dispatch(
    server: &TestServer,
    method: MockMethod,
    path: &str,
    mut request: MockRequest,
) -> MockResponse {
    let matched = server
        .router
        .lookup(method, path)
        .expect("route should match");
    let route = &server.dispatcher.routes()[matched.index];
    request.params = matched.params;
    server.dispatcher.handle(route, &request).await
}

#[tokio::test]
async fn test_discovers_expected_routes() {
    let server = test_server();
    let mut found: Vec<(String, String)> = server
        .dispatcher
        .routes()
        .iter()
        .map(|route| (route.url_path.clone(), route.method.to_string()))
        .collect();
    found.sort();

    assert_eq!(
        found,
        vec![
            ("/mock/health".to_string(), "GET".to_string()),
            ("/mock/users".to_string(), "GET".to_string()),
            ("/mock/users".to_string(), "POST".to_string()),
            ("/mock/users/:id".to_string(), "GET".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_body_file_served_from_mock_directory() {
    let server = test_server();
    let response = dispatch(
        &server,
        MockMethod::Get,
        "/mock/users",
        request("GET", "/mock/users"),
    )
    .await;

    assert_eq!(response.status, 200);
    assert_eq!(&response.body[..], br#"[{"id":1,"name":"ada"}]"#);
}

#[tokio::test]
async fn test_script_rule_reads_request_body() {
    let server = test_server();
    let mut req = request("POST", "/mock/users");
    req.body = json!({"name": "ada"});

    let response = dispatch(&server, MockMethod::Post, "/mock/users", req).await;
    assert_eq!(response.status, 201);
    assert_eq!(&response.body[..], b"ada");
}

#[tokio::test]
async fn test_path_parameters_match_numeric_rule_values() {
    let server = test_server();

    let response = dispatch(
        &server,
        MockMethod::Get,
        "/mock/users/1",
        request("GET", "/mock/users/1"),
    )
    .await;
    assert_eq!(response.status, 200);
    assert_eq!(&response.body[..], b"ada");

    let response = dispatch(
        &server,
        MockMethod::Get,
        "/mock/users/2",
        request("GET", "/mock/users/2"),
    )
    .await;
    assert_eq!(response.status, 404);
    assert!(response.body.is_empty());

    // No rule covers other ids, so the mock fails closed.
    let response = dispatch(
        &server,
        MockMethod::Get,
        "/mock/users/9",
        request("GET", "/mock/users/9"),
    )
    .await;
    assert_eq!(response.status, 500);
}

#[tokio::test]
async fn test_unknown_paths_do_not_match() {
    let server = test_server();
    assert!(server
        .router
        .lookup(MockMethod::Get, "/mock/nothing")
        .is_none());
    assert!(server
        .router
        .lookup(MockMethod::Delete, "/mock/users")
        .is_none());
}

#[tokio::test]
async fn test_override_switches_rule_file() {
    let server = test_server();
    let id = server
        .dispatcher
        .routes()
        .iter()
        .find(|route| route.url_path == "/mock/users" && route.method == MockMethod::Get)
        .unwrap()
        .id
        .clone();

    server
        .dispatcher
        .set_active_parser(&id, "parser-empty.yml")
        .await
        .unwrap();

    let response = dispatch(
        &server,
        MockMethod::Get,
        "/mock/users",
        request("GET", "/mock/users"),
    )
    .await;
    assert_eq!(&response.body[..], b"[]");

    let listed = server.dispatcher.list_with_parser_sets().await.unwrap();
    let (_, parsers) = listed
        .iter()
        .find(|(route, _)| route.id == id)
        .unwrap();
    assert_eq!(parsers.current, "parser-empty.yml");
    assert_eq!(parsers.user, "parser-empty.yml");
    assert_eq!(
        parsers.parsers,
        vec!["parser-default.yml".to_string(), "parser-empty.yml".to_string()]
    );
}

#[tokio::test]
async fn test_override_survives_reload() {
    let server = test_server();
    let id = server
        .dispatcher
        .routes()
        .iter()
        .find(|route| route.url_path == "/mock/users" && route.method == MockMethod::Get)
        .unwrap()
        .id
        .clone();

    server
        .dispatcher
        .set_active_parser(&id, "parser-empty.yml")
        .await
        .unwrap();

    // A fresh store and dispatcher over the same files sees the override.
    let routes = registry::discover(&server.dir.path().join("mock"));
    let settings = Arc::new(UserSettingsStore::load(server.dir.path().join("user.yml")));
    let reloaded = MockDispatcher::new(routes, settings);

    let route = reloaded.find_route(&id).unwrap();
    let parsers = reloaded.parser_set_for(route).await.unwrap();
    assert_eq!(parsers.current, "parser-empty.yml");
}
