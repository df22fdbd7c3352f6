//! Mock discovery: maps a directory tree onto HTTP routes.
//!
//! A route is declared by a **method directory**, a directory whose name
//! starts with `@` followed by an HTTP method (`@get`, `@post`, ...). The
//! directory path from the mock root down to the method directory's parent
//! becomes the URL path, mounted under `/mock`; segments starting with `$`
//! become named parameters (`users/$id` serves `/mock/users/:id`).

use crate::constants::{METHOD_DIR_MARKER, MOCK_URL_PREFIX};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use sha1::{Digest, Sha1};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// HTTP methods a mock directory can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MockMethod {
    Get,
    Put,
    Post,
    Patch,
    Delete,
}

impl MockMethod {
    /// Parse a method directory name (marker already stripped).
    /// Directory names are matched case-insensitively.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Some(MockMethod::Get),
            "PUT" => Some(MockMethod::Put),
            "POST" => Some(MockMethod::Post),
            "PATCH" => Some(MockMethod::Patch),
            "DELETE" => Some(MockMethod::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MockMethod::Get => "GET",
            MockMethod::Put => "PUT",
            MockMethod::Post => "POST",
            MockMethod::Patch => "PATCH",
            MockMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for MockMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single discovered mock endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockRoute {
    /// Stable identifier derived from the URL path and method.
    pub id: String,
    /// Method directory holding this route's rule files and body files.
    pub directory_path: PathBuf,
    pub url_path: String,
    pub method: MockMethod,
}

impl MockRoute {
    fn new(directory_path: PathBuf, segments: &[String], method: MockMethod) -> Self {
        let url_path = build_url_path(segments);
        let id = route_id(&url_path, method);
        Self {
            id,
            directory_path,
            url_path,
            method,
        }
    }
}

/// Stable route identifier: lowercase base64 of the SHA-1 digest of
/// `urlPath@METHOD`.
pub fn route_id(url_path: &str, method: MockMethod) -> String {
    let mut hasher = Sha1::new();
    hasher.update(url_path.as_bytes());
    hasher.update(b"@");
    hasher.update(method.as_str().as_bytes());
    STANDARD.encode(hasher.finalize()).to_lowercase()
}

/// URL path for a mock: the mount prefix plus each directory segment, with
/// `$name` segments exposed as `:name` parameters.
fn build_url_path(segments: &[String]) -> String {
    let mut path = String::from(MOCK_URL_PREFIX);
    for segment in segments {
        path.push('/');
        match segment.strip_prefix('$') {
            Some(param) => {
                path.push(':');
                path.push_str(param);
            }
            None => path.push_str(segment),
        }
    }
    path
}

/// Walk the mock root and register a route for every method directory.
///
/// Discovery failures are logged and yield an empty registry so the server
/// still starts; a missing or empty root simply yields zero routes.
pub fn discover(root: &Path) -> Vec<MockRoute> {
    info!("Loading mocks from {}", root.display());
    match walk(root) {
        Ok(routes) => {
            for route in &routes {
                info!("Add route: {} - {}", route.url_path, route.method);
            }
            routes
        }
        Err(e) => {
            error!("Mock discovery failed under {}: {}", root.display(), e);
            Vec::new()
        }
    }
}

fn walk(root: &Path) -> std::io::Result<Vec<MockRoute>> {
    let mut routes = Vec::new();
    if !root.is_dir() {
        return Ok(routes);
    }
    walk_dir(root, &mut Vec::new(), &mut routes)?;
    Ok(routes)
}

fn walk_dir(
    dir: &Path,
    segments: &mut Vec<String>,
    routes: &mut Vec<MockRoute>,
) -> std::io::Result<()> {
    // Sorted for deterministic registration order.
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        match name.strip_prefix(METHOD_DIR_MARKER) {
            Some(method_name) => match MockMethod::from_dir_name(method_name) {
                Some(method) => routes.push(MockRoute::new(entry.path(), segments, method)),
                None => warn!(
                    "Unsupported method directory, skipping [path={}]",
                    entry.path().display()
                ),
            },
            None => {
                segments.push(name);
                walk_dir(&entry.path(), segments, routes)?;
                segments.pop();
            }
        }
    }
    Ok(())
}
