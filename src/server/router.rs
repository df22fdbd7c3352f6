//! Path matching for mock requests.

use crate::registry::{MockMethod, MockRoute};
use matchit::Router;
use std::collections::HashMap;
use tracing::warn;

/// A matched route: index into the registry plus extracted path parameters.
pub struct RouteMatch {
    pub index: usize,
    pub params: HashMap<String, String>,
}

pub struct MockRouter {
    by_method: HashMap<MockMethod, Router<usize>>,
}

impl MockRouter {
    /// Index routes per method. A pattern that conflicts with an earlier one
    /// is skipped with a warning; the first registration wins.
    pub fn build(routes: &[MockRoute]) -> Self {
        let mut by_method: HashMap<MockMethod, Router<usize>> = HashMap::new();
        for (index, route) in routes.iter().enumerate() {
            let pattern = to_matchit_pattern(&route.url_path);
            let router = by_method.entry(route.method).or_insert_with(Router::new);
            if let Err(e) = router.insert(&pattern, index) {
                warn!("Skipping route {} {}: {}", route.method, route.url_path, e);
            }
        }
        Self { by_method }
    }

    pub fn lookup(&self, method: MockMethod, path: &str) -> Option<RouteMatch> {
        let router = self.by_method.get(&method)?;
        let matched = router.at(path).ok()?;
        let params = matched
            .params
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Some(RouteMatch {
            index: *matched.value,
            params,
        })
    }
}

/// `:name` segments become matchit `{name}` captures.
fn to_matchit_pattern(url_path: &str) -> String {
    url_path
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{}}}", name),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}
