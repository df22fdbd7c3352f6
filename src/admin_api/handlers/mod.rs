//! Request handlers for the admin API.

pub mod mocks;
pub mod system;
