//! Admin API for inspecting and steering the mock engine.

mod handlers;
mod router;
mod types;

pub use router::route_request;
pub use types::{MockWithParsers, UpdateMockRequest};
