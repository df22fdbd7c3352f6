//! Error types for the mock resolution engine.

use std::path::PathBuf;

/// Errors produced while resolving and evaluating mocks.
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("No mock registered with id {0}")]
    RouteNotFound(String),
    #[error("No parser files found in {}", .0.display())]
    ParserNotFound(PathBuf),
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Unsupported parser format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("No parser rule matched the request")]
    NoMatch,
    #[error("Script evaluation failed: {0}")]
    Script(String),
    #[error("Invalid response status: {0}")]
    InvalidStatus(u16),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
