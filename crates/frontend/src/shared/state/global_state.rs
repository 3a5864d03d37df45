//! Shape of the global UI state: persisted settings plus per-context
//! temporary state that lives only for the current tab.

use contracts::shared::preferences::{
    ActiveFeatures, NotificationSettings, PersistedSettings, TableConfig, UserPreferences,
};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Row identifier inside a selection or expansion context.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKey {
    Text(String),
    Number(i64),
}

impl From<&str> for ItemKey {
    fn from(value: &str) -> Self {
        ItemKey::Text(value.to_string())
    }
}

impl From<String> for ItemKey {
    fn from(value: String) -> Self {
        ItemKey::Text(value)
    }
}

impl From<i64> for ItemKey {
    fn from(value: i64) -> Self {
        ItemKey::Number(value)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Text(s) => f.write_str(s),
            ItemKey::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Ephemeral view state keyed by an arbitrary context name
/// (usually a table or tree id). Never written to storage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemporaryState {
    pub selected_items: HashMap<String, HashSet<ItemKey>>,
    pub expanded_items: HashMap<String, HashSet<ItemKey>>,
    pub search_queries: HashMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlobalState {
    pub user_preferences: UserPreferences,
    pub table_configs: HashMap<String, TableConfig>,
    pub notification_settings: NotificationSettings,
    pub active_features: ActiveFeatures,
    pub temporary_state: TemporaryState,
}

impl GlobalState {
    /// Builds the startup state; temporary state always starts empty.
    pub fn from_persisted(settings: PersistedSettings) -> Self {
        Self {
            user_preferences: settings.user_preferences,
            table_configs: settings.table_configs,
            notification_settings: settings.notification_settings,
            active_features: settings.active_features,
            temporary_state: TemporaryState::default(),
        }
    }

    /// Snapshot of the sections that go to durable storage.
    pub fn persisted(&self) -> PersistedSettings {
        PersistedSettings {
            user_preferences: self.user_preferences.clone(),
            table_configs: self.table_configs.clone(),
            notification_settings: self.notification_settings.clone(),
            active_features: self.active_features,
        }
    }

    /// Stored config for `table_id`, or the defaults derived from the
    /// current user preferences.
    pub fn table_config_or_default(&self, table_id: &str) -> TableConfig {
        self.table_configs
            .get(table_id)
            .cloned()
            .unwrap_or_else(|| TableConfig::from_preferences(&self.user_preferences))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_persisted_starts_with_empty_temporary_state() {
        let mut settings = PersistedSettings::default();
        settings.user_preferences.compact_mode = true;
        let state = GlobalState::from_persisted(settings.clone());

        assert!(state.user_preferences.compact_mode);
        assert_eq!(state.temporary_state, TemporaryState::default());
        assert_eq!(state.persisted(), settings);
    }

    #[test]
    fn test_table_config_or_default_uses_preferences() {
        let mut state = GlobalState::default();
        state.user_preferences.default_page_size = 100;

        assert_eq!(state.table_config_or_default("orders").page_size, 100);
    }

    #[test]
    fn test_item_key_conversions() {
        assert_eq!(ItemKey::from("a"), ItemKey::Text("a".to_string()));
        assert_eq!(ItemKey::from(7i64), ItemKey::Number(7));
        assert_eq!(ItemKey::from(7i64).to_string(), "7");
    }
}
