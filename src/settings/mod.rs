//! Settings loaded from YAML files next to the mock tree.

mod server;
mod user;

pub use server::{HttpSettings, ServerSettings};
pub use user::{UserMockSetting, UserSettings, UserSettingsStore};
