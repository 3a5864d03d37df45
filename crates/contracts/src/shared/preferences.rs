//! Preference sections persisted by the global state store.
//!
//! Every section deserializes leniently: a missing field takes its default,
//! so a stored document written by an older build still loads.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Colour scheme requested by the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    /// Resolves `System` against the OS colour-scheme preference.
    pub fn resolve(&self, prefers_dark: bool) -> Theme {
        match self {
            Theme::System if prefers_dark => Theme::Dark,
            Theme::System => Theme::Light,
            other => *other,
        }
    }

    pub fn all() -> [Theme; 3] {
        [Theme::Light, Theme::Dark, Theme::System]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub theme: Theme,
    pub language: String,
    pub default_page_size: usize,
    pub enable_virtualization: bool,
    pub enable_animations: bool,
    pub compact_mode: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            language: "zh-TW".to_string(),
            default_page_size: 20,
            enable_virtualization: true,
            enable_animations: true,
            compact_mode: false,
        }
    }
}

/// Partial update for [`UserPreferences`]; `None` keeps the current value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferencesPatch {
    pub theme: Option<Theme>,
    pub language: Option<String>,
    pub default_page_size: Option<usize>,
    pub enable_virtualization: Option<bool>,
    pub enable_animations: Option<bool>,
    pub compact_mode: Option<bool>,
}

impl UserPreferencesPatch {
    pub fn merge(&self, base: &UserPreferences) -> UserPreferences {
        UserPreferences {
            theme: self.theme.unwrap_or(base.theme),
            language: self
                .language
                .clone()
                .unwrap_or_else(|| base.language.clone()),
            default_page_size: self.default_page_size.unwrap_or(base.default_page_size),
            enable_virtualization: self
                .enable_virtualization
                .unwrap_or(base.enable_virtualization),
            enable_animations: self.enable_animations.unwrap_or(base.enable_animations),
            compact_mode: self.compact_mode.unwrap_or(base.compact_mode),
        }
    }
}

/// One entry of a table's sort order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub id: String,
    pub desc: bool,
}

/// Filter value applied to a single column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub id: String,
    pub value: serde_json::Value,
}

/// Per-table UI configuration, keyed by table id in [`PersistedSettings`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableConfig {
    pub column_visibility: HashMap<String, bool>,
    pub column_order: Vec<String>,
    pub sorting: Vec<SortSpec>,
    pub column_filters: Vec<ColumnFilter>,
    pub page_size: usize,
    pub enable_virtualization: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::from_preferences(&UserPreferences::default())
    }
}

impl TableConfig {
    /// Fresh config for a table that has no stored override yet.
    pub fn from_preferences(prefs: &UserPreferences) -> Self {
        Self {
            column_visibility: HashMap::new(),
            column_order: Vec::new(),
            sorting: Vec::new(),
            column_filters: Vec::new(),
            page_size: prefs.default_page_size,
            enable_virtualization: prefs.enable_virtualization,
        }
    }

    /// Columns are visible unless explicitly hidden.
    pub fn is_column_visible(&self, column_id: &str) -> bool {
        self.column_visibility
            .get(column_id)
            .copied()
            .unwrap_or(true)
    }

    /// Visible columns of `all_columns`: those named in `column_order` first,
    /// then the rest in their original order.
    pub fn visible_columns<'a>(&self, all_columns: &[&'a str]) -> Vec<&'a str> {
        let ordered = self
            .column_order
            .iter()
            .filter_map(|id| all_columns.iter().find(|c| **c == id.as_str()).copied());
        let rest = all_columns
            .iter()
            .copied()
            .filter(|c| !self.column_order.iter().any(|id| id.as_str() == *c));

        ordered
            .chain(rest)
            .filter(|c| self.is_column_visible(c))
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableConfigPatch {
    pub column_visibility: Option<HashMap<String, bool>>,
    pub column_order: Option<Vec<String>>,
    pub sorting: Option<Vec<SortSpec>>,
    pub column_filters: Option<Vec<ColumnFilter>>,
    pub page_size: Option<usize>,
    pub enable_virtualization: Option<bool>,
}

impl TableConfigPatch {
    pub fn merge(&self, base: &TableConfig) -> TableConfig {
        TableConfig {
            column_visibility: self
                .column_visibility
                .clone()
                .unwrap_or_else(|| base.column_visibility.clone()),
            column_order: self
                .column_order
                .clone()
                .unwrap_or_else(|| base.column_order.clone()),
            sorting: self.sorting.clone().unwrap_or_else(|| base.sorting.clone()),
            column_filters: self
                .column_filters
                .clone()
                .unwrap_or_else(|| base.column_filters.clone()),
            page_size: self.page_size.unwrap_or(base.page_size),
            enable_virtualization: self
                .enable_virtualization
                .unwrap_or(base.enable_virtualization),
        }
    }
}

/// Screen corner where toasts appear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToastPosition {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub enable_toasts: bool,
    pub enable_sound: bool,
    pub auto_close: bool,
    pub position: ToastPosition,
    /// Toast lifetime in milliseconds.
    #[serde(rename = "duration")]
    pub duration_ms: u32,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enable_toasts: true,
            enable_sound: false,
            auto_close: true,
            position: ToastPosition::TopRight,
            duration_ms: 5000,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettingsPatch {
    pub enable_toasts: Option<bool>,
    pub enable_sound: Option<bool>,
    pub auto_close: Option<bool>,
    pub position: Option<ToastPosition>,
    #[serde(rename = "duration")]
    pub duration_ms: Option<u32>,
}

impl NotificationSettingsPatch {
    pub fn merge(&self, base: &NotificationSettings) -> NotificationSettings {
        NotificationSettings {
            enable_toasts: self.enable_toasts.unwrap_or(base.enable_toasts),
            enable_sound: self.enable_sound.unwrap_or(base.enable_sound),
            auto_close: self.auto_close.unwrap_or(base.auto_close),
            position: self.position.unwrap_or(base.position),
            duration_ms: self.duration_ms.unwrap_or(base.duration_ms),
        }
    }
}

/// Application-wide feature switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActiveFeatures {
    pub virtualization: bool,
    pub optimistic_updates: bool,
    pub debug_mode: bool,
}

impl Default for ActiveFeatures {
    fn default() -> Self {
        Self {
            virtualization: true,
            optimistic_updates: true,
            debug_mode: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureFlag {
    Virtualization,
    OptimisticUpdates,
    DebugMode,
}

impl ActiveFeatures {
    pub fn is_enabled(&self, flag: FeatureFlag) -> bool {
        match flag {
            FeatureFlag::Virtualization => self.virtualization,
            FeatureFlag::OptimisticUpdates => self.optimistic_updates,
            FeatureFlag::DebugMode => self.debug_mode,
        }
    }

    /// Copy of `self` with `flag` flipped.
    pub fn toggled(&self, flag: FeatureFlag) -> Self {
        let mut next = *self;
        match flag {
            FeatureFlag::Virtualization => next.virtualization = !next.virtualization,
            FeatureFlag::OptimisticUpdates => {
                next.optimistic_updates = !next.optimistic_updates
            }
            FeatureFlag::DebugMode => next.debug_mode = !next.debug_mode,
        }
        next
    }
}

/// The subset of global state written to durable storage.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedSettings {
    pub user_preferences: UserPreferences,
    pub table_configs: HashMap<String, TableConfig>,
    pub notification_settings: NotificationSettings,
    pub active_features: ActiveFeatures,
}

/// Settings document accepted by import: each present section replaces the
/// current one wholesale.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedSettingsPatch {
    pub user_preferences: Option<UserPreferences>,
    pub table_configs: Option<HashMap<String, TableConfig>>,
    pub notification_settings: Option<NotificationSettings>,
    pub active_features: Option<ActiveFeatures>,
}

impl PersistedSettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.user_preferences.is_none()
            && self.table_configs.is_none()
            && self.notification_settings.is_none()
            && self.active_features.is_none()
    }

    pub fn apply(&self, base: &PersistedSettings) -> PersistedSettings {
        PersistedSettings {
            user_preferences: self
                .user_preferences
                .clone()
                .unwrap_or_else(|| base.user_preferences.clone()),
            table_configs: self
                .table_configs
                .clone()
                .unwrap_or_else(|| base.table_configs.clone()),
            notification_settings: self
                .notification_settings
                .clone()
                .unwrap_or_else(|| base.notification_settings.clone()),
            active_features: self.active_features.unwrap_or(base.active_features),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_fills_defaults() {
        let settings: PersistedSettings =
            serde_json::from_str(r#"{"userPreferences":{"theme":"dark"}}"#).unwrap();

        assert_eq!(settings.user_preferences.theme, Theme::Dark);
        assert_eq!(settings.user_preferences.language, "zh-TW");
        assert_eq!(settings.user_preferences.default_page_size, 20);
        assert!(settings.table_configs.is_empty());
        assert_eq!(settings.notification_settings, NotificationSettings::default());
        assert_eq!(settings.active_features, ActiveFeatures::default());
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(PersistedSettings::default()).unwrap();
        let obj = json.as_object().unwrap();

        assert!(obj.contains_key("userPreferences"));
        assert!(obj.contains_key("tableConfigs"));
        assert!(obj.contains_key("notificationSettings"));
        assert!(obj.contains_key("activeFeatures"));
        assert_eq!(json["notificationSettings"]["position"], "top-right");
        assert_eq!(json["notificationSettings"]["duration"], 5000);
        assert_eq!(json["userPreferences"]["defaultPageSize"], 20);
        assert_eq!(json["userPreferences"]["theme"], "system");
    }

    #[test]
    fn test_user_preferences_patch_keeps_unset_fields() {
        let base = UserPreferences::default();
        let patch = UserPreferencesPatch {
            compact_mode: Some(true),
            ..Default::default()
        };
        let merged = patch.merge(&base);

        assert!(merged.compact_mode);
        assert_eq!(merged.language, base.language);
        assert_eq!(merged.theme, base.theme);
    }

    #[test]
    fn test_table_config_from_preferences() {
        let prefs = UserPreferences {
            default_page_size: 50,
            enable_virtualization: false,
            ..Default::default()
        };
        let config = TableConfig::from_preferences(&prefs);

        assert_eq!(config.page_size, 50);
        assert!(!config.enable_virtualization);
        assert!(config.column_order.is_empty());
    }

    #[test]
    fn test_visible_columns_respects_order_and_visibility() {
        let mut config = TableConfig::default();
        config.column_order = vec!["qty".into(), "sku".into()];
        config.column_visibility.insert("name".into(), false);

        let columns = ["order", "sku", "name", "qty"];
        assert_eq!(config.visible_columns(&columns), vec!["qty", "sku", "order"]);
        assert!(config.is_column_visible("order"));
        assert!(!config.is_column_visible("name"));
    }

    #[test]
    fn test_feature_toggle() {
        let features = ActiveFeatures::default();
        let toggled = features.toggled(FeatureFlag::DebugMode);

        assert!(toggled.is_enabled(FeatureFlag::DebugMode));
        assert_eq!(toggled.virtualization, features.virtualization);
        assert_eq!(toggled.toggled(FeatureFlag::DebugMode), features);
    }

    #[test]
    fn test_theme_resolve() {
        assert_eq!(Theme::System.resolve(true), Theme::Dark);
        assert_eq!(Theme::System.resolve(false), Theme::Light);
        assert_eq!(Theme::Light.resolve(true), Theme::Light);
    }

    #[test]
    fn test_settings_patch_replaces_whole_sections() {
        let mut base = PersistedSettings::default();
        base.user_preferences.compact_mode = true;
        base.table_configs
            .insert("orders".into(), TableConfig::default());

        let patch: PersistedSettingsPatch =
            serde_json::from_str(r#"{"userPreferences":{"language":"en"}}"#).unwrap();
        let next = patch.apply(&base);

        assert_eq!(next.user_preferences.language, "en");
        // replaced wholesale, not merged
        assert!(!next.user_preferences.compact_mode);
        assert_eq!(next.table_configs, base.table_configs);
    }

    #[test]
    fn test_settings_patch_is_empty() {
        let empty: PersistedSettingsPatch = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());

        let unknown: PersistedSettingsPatch =
            serde_json::from_str(r#"{"somethingElse":1}"#).unwrap();
        assert!(unknown.is_empty());

        let features: PersistedSettingsPatch =
            serde_json::from_str(r#"{"activeFeatures":{"debugMode":true}}"#).unwrap();
        assert!(!features.is_empty());
    }
}
