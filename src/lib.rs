// Library exports for integration tests

pub mod access_log;
pub mod admin_api;
pub mod constants;
pub mod dispatcher;
pub mod error;
pub mod evaluator;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod server;
pub mod settings;
