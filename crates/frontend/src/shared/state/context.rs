//! Global state container shared through Leptos context.
//!
//! The raw dispatch stays inside this module. Components reach the state
//! through the `use_*` hooks below, each returning a handle scoped to one
//! concern.

use super::actions::GlobalAction;
use super::global_state::{GlobalState, ItemKey};
use super::persistence::{load_persisted, save_persisted, BrowserStorage, SettingsStorage};
use super::reducer::reduce;
use super::settings_io::{export_settings, parse_settings, SettingsError};
use contracts::shared::preferences::{
    ActiveFeatures, FeatureFlag, NotificationSettings, NotificationSettingsPatch, TableConfig,
    TableConfigPatch, UserPreferences, UserPreferencesPatch,
};
use leptos::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone, Copy)]
pub struct GlobalStateContext {
    state: RwSignal<GlobalState>,
    storage: StoredValue<Arc<dyn SettingsStorage>>,
}

impl GlobalStateContext {
    /// Loads persisted settings from `storage`; temporary state starts empty.
    pub fn new(storage: Arc<dyn SettingsStorage>) -> Self {
        let initial = GlobalState::from_persisted(load_persisted(storage.as_ref()));
        Self {
            state: RwSignal::new(initial),
            storage: StoredValue::new(storage),
        }
    }

    /// Creates the context and the effects that follow every transition:
    /// writing the persisted subset and matching the log level to the
    /// `debug_mode` flag. Must run under a reactive owner.
    pub fn install(storage: Arc<dyn SettingsStorage>) -> Self {
        let ctx = Self::new(storage);

        // Runs after each settled state change; a burst of dispatches ends in
        // one write of the latest state.
        Effect::new(move |_| {
            ctx.state.track();
            ctx.persist();
        });

        let debug_mode = Memo::new(move |_| ctx.state.with(|s| s.active_features.debug_mode));
        Effect::new(move |_| {
            let level = if debug_mode.get() {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            };
            log::set_max_level(level);
        });

        ctx
    }

    fn dispatch(&self, action: GlobalAction) {
        log::debug!("global state: {:?}", action);
        self.state.update(|state| *state = reduce(state, action));
    }

    /// Writes the persisted subset of the current state to storage.
    pub fn persist(&self) {
        let settings = self.state.with_untracked(GlobalState::persisted);
        self.storage
            .with_value(|storage| save_persisted(storage.as_ref(), &settings));
    }

    /// Untracked copy of the whole state.
    pub fn snapshot(&self) -> GlobalState {
        self.state.get_untracked()
    }

    pub fn user_preferences(&self) -> UserPreferencesHandle {
        UserPreferencesHandle { ctx: *self }
    }

    pub fn table_config(&self, table_id: impl Into<String>) -> TableConfigHandle {
        TableConfigHandle {
            ctx: *self,
            table_id: table_id.into(),
        }
    }

    pub fn notification_settings(&self) -> NotificationSettingsHandle {
        NotificationSettingsHandle { ctx: *self }
    }

    pub fn feature_flags(&self) -> FeatureFlagsHandle {
        FeatureFlagsHandle { ctx: *self }
    }

    pub fn temporary_state(&self, context: impl Into<String>) -> TemporaryStateHandle {
        TemporaryStateHandle {
            ctx: *self,
            context: context.into(),
        }
    }

    pub fn settings_transfer(&self) -> SettingsTransferHandle {
        SettingsTransferHandle { ctx: *self }
    }
}

#[derive(Clone, Copy)]
pub struct UserPreferencesHandle {
    ctx: GlobalStateContext,
}

impl UserPreferencesHandle {
    pub fn get(&self) -> UserPreferences {
        self.ctx.state.with(|s| s.user_preferences.clone())
    }

    pub fn update(&self, patch: UserPreferencesPatch) {
        self.ctx.dispatch(GlobalAction::UpdateUserPreferences(patch));
    }

    pub fn reset(&self) {
        self.ctx.dispatch(GlobalAction::ResetUserPreferences);
    }
}

#[derive(Clone)]
pub struct TableConfigHandle {
    ctx: GlobalStateContext,
    table_id: String,
}

impl TableConfigHandle {
    /// Stored config, or defaults derived from user preferences.
    pub fn get(&self) -> TableConfig {
        self.ctx
            .state
            .with(|s| s.table_config_or_default(&self.table_id))
    }

    pub fn has_override(&self) -> bool {
        self.ctx
            .state
            .with(|s| s.table_configs.contains_key(&self.table_id))
    }

    pub fn update(&self, patch: TableConfigPatch) {
        self.ctx.dispatch(GlobalAction::UpdateTableConfig {
            table_id: self.table_id.clone(),
            patch,
        });
    }

    pub fn reset(&self) {
        self.ctx.dispatch(GlobalAction::ResetTableConfig {
            table_id: self.table_id.clone(),
        });
    }
}

#[derive(Clone, Copy)]
pub struct NotificationSettingsHandle {
    ctx: GlobalStateContext,
}

impl NotificationSettingsHandle {
    pub fn get(&self) -> NotificationSettings {
        self.ctx.state.with(|s| s.notification_settings.clone())
    }

    pub fn update(&self, patch: NotificationSettingsPatch) {
        self.ctx
            .dispatch(GlobalAction::UpdateNotificationSettings(patch));
    }
}

#[derive(Clone, Copy)]
pub struct FeatureFlagsHandle {
    ctx: GlobalStateContext,
}

impl FeatureFlagsHandle {
    pub fn get(&self) -> ActiveFeatures {
        self.ctx.state.with(|s| s.active_features)
    }

    pub fn is_enabled(&self, flag: FeatureFlag) -> bool {
        self.ctx.state.with(|s| s.active_features.is_enabled(flag))
    }

    pub fn toggle(&self, flag: FeatureFlag) {
        self.ctx.dispatch(GlobalAction::ToggleFeature(flag));
    }
}

/// Selection, expansion and search query of one view context.
#[derive(Clone)]
pub struct TemporaryStateHandle {
    ctx: GlobalStateContext,
    context: String,
}

impl TemporaryStateHandle {
    pub fn selected_items(&self) -> HashSet<ItemKey> {
        self.ctx.state.with(|s| {
            s.temporary_state
                .selected_items
                .get(&self.context)
                .cloned()
                .unwrap_or_default()
        })
    }

    pub fn is_selected(&self, item: &ItemKey) -> bool {
        self.ctx.state.with(|s| {
            s.temporary_state
                .selected_items
                .get(&self.context)
                .is_some_and(|items| items.contains(item))
        })
    }

    pub fn set_selected_items(&self, items: Vec<ItemKey>) {
        self.ctx.dispatch(GlobalAction::SetSelectedItems {
            context: self.context.clone(),
            items,
        });
    }

    pub fn add_selected_item(&self, item: impl Into<ItemKey>) {
        self.ctx.dispatch(GlobalAction::AddSelectedItem {
            context: self.context.clone(),
            item: item.into(),
        });
    }

    pub fn remove_selected_item(&self, item: impl Into<ItemKey>) {
        self.ctx.dispatch(GlobalAction::RemoveSelectedItem {
            context: self.context.clone(),
            item: item.into(),
        });
    }

    pub fn clear_selected_items(&self) {
        self.ctx.dispatch(GlobalAction::ClearSelectedItems {
            context: self.context.clone(),
        });
    }

    pub fn expanded_items(&self) -> HashSet<ItemKey> {
        self.ctx.state.with(|s| {
            s.temporary_state
                .expanded_items
                .get(&self.context)
                .cloned()
                .unwrap_or_default()
        })
    }

    pub fn is_expanded(&self, item: &ItemKey) -> bool {
        self.ctx.state.with(|s| {
            s.temporary_state
                .expanded_items
                .get(&self.context)
                .is_some_and(|items| items.contains(item))
        })
    }

    pub fn set_expanded_items(&self, items: Vec<ItemKey>) {
        self.ctx.dispatch(GlobalAction::SetExpandedItems {
            context: self.context.clone(),
            items,
        });
    }

    pub fn toggle_expanded_item(&self, item: impl Into<ItemKey>) {
        self.ctx.dispatch(GlobalAction::ToggleExpandedItem {
            context: self.context.clone(),
            item: item.into(),
        });
    }

    /// `None` when no query was set or it was cleared.
    pub fn search_query(&self) -> Option<String> {
        self.ctx
            .state
            .with(|s| s.temporary_state.search_queries.get(&self.context).cloned())
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.ctx.dispatch(GlobalAction::SetSearchQuery {
            context: self.context.clone(),
            query: query.into(),
        });
    }

    pub fn clear_search_query(&self) {
        self.ctx.dispatch(GlobalAction::ClearSearchQuery {
            context: self.context.clone(),
        });
    }
}

/// Backup, restore and bulk reset of the persisted settings.
#[derive(Clone, Copy)]
pub struct SettingsTransferHandle {
    ctx: GlobalStateContext,
}

impl SettingsTransferHandle {
    pub fn export(&self) -> Result<String, SettingsError> {
        self.ctx.state.with_untracked(export_settings)
    }

    /// Applies an exported document. On error the state is left untouched.
    pub fn import(&self, raw: &str) -> Result<(), SettingsError> {
        let patch = parse_settings(raw).map_err(|e| {
            log::warn!("Settings import rejected: {}", e);
            e
        })?;
        if patch.is_empty() {
            log::warn!("Settings import contains no known sections, nothing changed");
        }
        self.ctx.dispatch(GlobalAction::ImportSettings(patch));
        Ok(())
    }

    pub fn reset_all_settings(&self) {
        self.ctx.dispatch(GlobalAction::ResetAllSettings);
    }

    pub fn reset_all_table_configs(&self) {
        self.ctx.dispatch(GlobalAction::ResetAllTableConfigs);
    }
}

/// Provides [`GlobalStateContext`] backed by localStorage and keeps the
/// stored copy in sync.
#[component]
pub fn GlobalStateProvider(children: Children) -> impl IntoView {
    let ctx = GlobalStateContext::install(Arc::new(BrowserStorage));
    provide_context(ctx);

    children()
}

pub fn use_global_state() -> GlobalStateContext {
    use_context::<GlobalStateContext>()
        .expect("GlobalStateContext not found. Wrap your app with GlobalStateProvider.")
}

pub fn use_user_preferences() -> UserPreferencesHandle {
    use_global_state().user_preferences()
}

pub fn use_table_config(table_id: impl Into<String>) -> TableConfigHandle {
    use_global_state().table_config(table_id)
}

pub fn use_notification_settings() -> NotificationSettingsHandle {
    use_global_state().notification_settings()
}

pub fn use_feature_flags() -> FeatureFlagsHandle {
    use_global_state().feature_flags()
}

pub fn use_temporary_state(context: impl Into<String>) -> TemporaryStateHandle {
    use_global_state().temporary_state(context)
}

pub fn use_settings_transfer() -> SettingsTransferHandle {
    use_global_state().settings_transfer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use any_spawner::Executor;
    use crate::shared::state::persistence::{MemoryStorage, GLOBAL_STATE_STORAGE_KEY};
    use contracts::shared::preferences::Theme;

    fn context_with(storage: &MemoryStorage) -> GlobalStateContext {
        GlobalStateContext::new(Arc::new(storage.clone()))
    }

    #[test]
    fn test_loads_partial_stored_document() {
        let storage =
            MemoryStorage::with_entry(GLOBAL_STATE_STORAGE_KEY, r#"{"userPreferences":{"theme":"dark"}}"#);
        let ctx = context_with(&storage);
        let prefs = ctx.user_preferences().get();

        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.language, "zh-TW");
        assert!(ctx.snapshot().table_configs.is_empty());
    }

    #[test]
    fn test_table_config_handle_falls_back_to_defaults() {
        let ctx = context_with(&MemoryStorage::new());
        let table = ctx.table_config("backorders");

        assert!(!table.has_override());
        assert_eq!(table.get().page_size, 20);

        table.update(TableConfigPatch {
            page_size: Some(40),
            ..Default::default()
        });
        assert!(table.has_override());
        assert_eq!(table.get().page_size, 40);

        table.reset();
        assert!(!table.has_override());
    }

    #[test]
    fn test_temporary_state_handle() {
        let ctx = context_with(&MemoryStorage::new());
        let orders = ctx.temporary_state("orders");
        let other = ctx.temporary_state("installations");

        orders.add_selected_item("o-1");
        orders.add_selected_item("o-1");
        orders.toggle_expanded_item(5i64);
        orders.set_search_query("SO-10");

        assert_eq!(orders.selected_items().len(), 1);
        assert!(orders.is_selected(&ItemKey::from("o-1")));
        assert!(orders.is_expanded(&ItemKey::Number(5)));
        assert_eq!(orders.search_query().as_deref(), Some("SO-10"));
        assert!(other.selected_items().is_empty());

        orders.clear_search_query();
        orders.clear_selected_items();
        assert_eq!(orders.search_query(), None);
        assert!(!ctx.snapshot().temporary_state.selected_items.contains_key("orders"));
    }

    #[test]
    fn test_persist_writes_settings_but_not_temporary_state() {
        let storage = MemoryStorage::new();
        let ctx = context_with(&storage);
        ctx.feature_flags().toggle(FeatureFlag::DebugMode);
        ctx.temporary_state("orders").set_search_query("secret-query");
        ctx.persist();

        let raw = storage.get(GLOBAL_STATE_STORAGE_KEY).unwrap();
        assert!(!raw.contains("secret-query"));

        let reloaded = context_with(&storage);
        assert!(reloaded.feature_flags().is_enabled(FeatureFlag::DebugMode));
        assert!(reloaded.temporary_state("orders").search_query().is_none());
    }

    #[test]
    fn test_failed_import_leaves_state_unchanged() {
        let ctx = context_with(&MemoryStorage::new());
        ctx.user_preferences().update(UserPreferencesPatch {
            compact_mode: Some(true),
            ..Default::default()
        });
        ctx.temporary_state("orders").add_selected_item(1i64);
        let before = ctx.snapshot();

        let result = ctx.settings_transfer().import("definitely not json");

        assert!(result.is_err());
        assert_eq!(ctx.snapshot(), before);
    }

    #[test]
    fn test_import_replaces_sections() {
        let ctx = context_with(&MemoryStorage::new());
        ctx.temporary_state("orders").add_selected_item(1i64);

        ctx.settings_transfer()
            .import(r#"{"notificationSettings":{"enableSound":true,"position":"bottom-left"}}"#)
            .unwrap();

        let notifications = ctx.notification_settings().get();
        assert!(notifications.enable_sound);
        assert_eq!(notifications.duration_ms, 5000);
        assert_eq!(ctx.temporary_state("orders").selected_items().len(), 1);
    }

    #[test]
    fn test_import_without_known_sections_changes_nothing() {
        let ctx = context_with(&MemoryStorage::new());
        ctx.user_preferences().update(UserPreferencesPatch {
            compact_mode: Some(true),
            ..Default::default()
        });
        let before = ctx.snapshot();

        assert!(ctx.settings_transfer().import("{}").is_ok());
        assert_eq!(ctx.snapshot(), before);
    }

    #[test]
    fn test_reset_all_settings_keeps_temporary_state() {
        let ctx = context_with(&MemoryStorage::new());
        ctx.user_preferences().update(UserPreferencesPatch {
            theme: Some(Theme::Light),
            ..Default::default()
        });
        ctx.table_config("orders").update(TableConfigPatch::default());
        ctx.temporary_state("orders").set_search_query("abc");

        ctx.settings_transfer().reset_all_settings();

        let state = ctx.snapshot();
        assert_eq!(state.user_preferences, UserPreferences::default());
        assert!(state.table_configs.is_empty());
        assert_eq!(
            ctx.temporary_state("orders").search_query().as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_installed_context_writes_every_transition() {
        let _ = Executor::init_futures_executor();
        let owner = Owner::new();
        owner.set();

        let storage = MemoryStorage::new();
        let ctx = GlobalStateContext::install(Arc::new(storage.clone()));
        Executor::poll_local();
        assert_eq!(load_persisted(&storage), ctx.snapshot().persisted());

        ctx.user_preferences().update(UserPreferencesPatch {
            theme: Some(Theme::Dark),
            ..Default::default()
        });
        ctx.table_config("backorders").update(TableConfigPatch {
            page_size: Some(50),
            ..Default::default()
        });
        Executor::poll_local();

        let stored = load_persisted(&storage);
        assert_eq!(stored.user_preferences.theme, Theme::Dark);
        assert_eq!(stored.table_configs["backorders"].page_size, 50);

        ctx.feature_flags().toggle(FeatureFlag::DebugMode);
        Executor::poll_local();
        assert!(load_persisted(&storage).active_features.debug_mode);
        assert_eq!(log::max_level(), log::LevelFilter::Debug);

        ctx.feature_flags().toggle(FeatureFlag::DebugMode);
        Executor::poll_local();
        assert_eq!(log::max_level(), log::LevelFilter::Info);
    }
}
