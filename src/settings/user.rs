//! Per-mock overrides from `user.yml`.
//!
//! The file maps mock keys (`<urlPath>/@<method>`, lowercase) to the rule
//! file a mock should use instead of the resolver's pick. The admin API
//! updates it and the whole file is rewritten on every change.

use crate::constants::DEFAULT_PARSER_FILE;
use crate::error::MockError;
use crate::registry::MockMethod;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserMockSetting {
    pub parser: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserSettings {
    #[serde(default)]
    pub api: BTreeMap<String, UserMockSetting>,
}

pub struct UserSettingsStore {
    path: PathBuf,
    settings: RwLock<UserSettings>,
}

impl UserSettingsStore {
    /// Load overrides from a YAML file. Overrides are optional, so any read
    /// or parse failure starts the store empty.
    pub fn load<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let settings = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => UserSettings::default(),
            Ok(contents) => match serde_yaml::from_str::<UserSettings>(&contents) {
                Ok(parsed) => normalize(parsed),
                Err(e) => {
                    warn!("Failed to parse user settings {}: {}", path.display(), e);
                    UserSettings::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => UserSettings::default(),
            Err(e) => {
                warn!("Failed to read user settings {}: {}", path.display(), e);
                UserSettings::default()
            }
        };
        Self {
            path,
            settings: RwLock::new(settings),
        }
    }

    /// The rule file chosen for a mock, or the default when nothing is stored.
    pub fn parser_for(&self, url_path: &str, method: MockMethod) -> String {
        let key = setting_key(url_path, method);
        self.settings
            .read()
            .api
            .get(&key)
            .map(|setting| setting.parser.clone())
            .unwrap_or_else(|| DEFAULT_PARSER_FILE.to_string())
    }

    /// Store an override and rewrite the settings file.
    pub async fn set_parser(
        &self,
        url_path: &str,
        method: MockMethod,
        parser: &str,
    ) -> Result<(), MockError> {
        let serialized = {
            let mut settings = self.settings.write();
            settings.api.insert(
                setting_key(url_path, method),
                UserMockSetting {
                    parser: parser.to_string(),
                },
            );
            serde_yaml::to_string(&*settings)?
        };
        tokio::fs::write(&self.path, serialized).await?;
        Ok(())
    }
}

fn setting_key(url_path: &str, method: MockMethod) -> String {
    format!("{}/@{}", url_path, method).to_lowercase()
}

fn normalize(settings: UserSettings) -> UserSettings {
    let api = settings
        .api
        .into_iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect();
    UserSettings { api }
}
