use super::global_state::ItemKey;
use contracts::shared::preferences::{
    FeatureFlag, NotificationSettingsPatch, PersistedSettingsPatch, TableConfigPatch,
    UserPreferencesPatch,
};

/// Transitions accepted by [`super::reducer::reduce`].
#[derive(Clone, Debug, PartialEq)]
pub enum GlobalAction {
    UpdateUserPreferences(UserPreferencesPatch),
    ResetUserPreferences,
    /// Creates the table's config from defaults when absent, then merges.
    UpdateTableConfig {
        table_id: String,
        patch: TableConfigPatch,
    },
    /// Removes the table's entry; reads fall back to defaults.
    ResetTableConfig {
        table_id: String,
    },
    ResetAllTableConfigs,
    UpdateNotificationSettings(NotificationSettingsPatch),
    ToggleFeature(FeatureFlag),

    SetSelectedItems {
        context: String,
        items: Vec<ItemKey>,
    },
    AddSelectedItem {
        context: String,
        item: ItemKey,
    },
    RemoveSelectedItem {
        context: String,
        item: ItemKey,
    },
    /// Drops the context's selection entry entirely.
    ClearSelectedItems {
        context: String,
    },
    SetExpandedItems {
        context: String,
        items: Vec<ItemKey>,
    },
    ToggleExpandedItem {
        context: String,
        item: ItemKey,
    },
    SetSearchQuery {
        context: String,
        query: String,
    },
    /// Removes the query key; distinct from setting an empty string.
    ClearSearchQuery {
        context: String,
    },

    /// Replaces each section present in the patch. Temporary state is kept.
    ImportSettings(PersistedSettingsPatch),
    /// Restores every persisted section to defaults. Temporary state is kept.
    ResetAllSettings,
}
