use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Presentation preferences. The original client kept these in browser
/// local storage as module-level globals; here they are an explicit object
/// persisted behind an injected store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub theme: Theme,
    pub color_blind_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Follow the OS preference; resolved by the presentation layer.
    System,
}

/// Key-value persistence boundary for preferences. The presentation layer
/// receives an implementation at startup instead of reaching for global
/// state.
pub trait PreferenceStore {
    fn load(&self, user_id: &str) -> anyhow::Result<Option<UserPreferences>>;
    fn save(&self, user_id: &str, prefs: &UserPreferences) -> anyhow::Result<()>;
}

/// In-memory store for tests and single-process tools.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    entries: Mutex<HashMap<String, UserPreferences>>,
}

impl PreferenceStore for InMemoryPreferences {
    fn load(&self, user_id: &str) -> anyhow::Result<Option<UserPreferences>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("preference store poisoned"))?;
        Ok(entries.get(user_id).copied())
    }

    fn save(&self, user_id: &str, prefs: &UserPreferences) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("preference store poisoned"))?;
        entries.insert(user_id.to_string(), *prefs);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_light_and_not_color_blind() {
        let prefs = UserPreferences::default();
        assert_eq!(prefs.theme, Theme::Light);
        assert!(!prefs.color_blind_mode);
    }

    #[test]
    fn round_trips_through_the_store() {
        let store = InMemoryPreferences::default();
        assert_eq!(store.load("u-1").unwrap(), None);

        let prefs = UserPreferences {
            theme: Theme::Dark,
            color_blind_mode: true,
        };
        store.save("u-1", &prefs).unwrap();
        assert_eq!(store.load("u-1").unwrap(), Some(prefs));
        assert_eq!(store.load("u-2").unwrap(), None);
    }

    #[test]
    fn serializes_with_legacy_client_keys() {
        let prefs = UserPreferences {
            theme: Theme::System,
            color_blind_mode: true,
        };
        let json = serde_json::to_value(&prefs).unwrap();
        assert_eq!(json["theme"], "system");
        assert_eq!(json["colorBlindMode"], true);

        let parsed: UserPreferences = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(parsed.theme, Theme::Dark);
        assert!(!parsed.color_blind_mode);
    }
}
