//! Pure transition function for [`GlobalState`].
//!
//! `reduce` never touches its input; it returns a new state in which only
//! the sections affected by the action are rebuilt.

use super::actions::GlobalAction;
use super::global_state::{GlobalState, ItemKey, TemporaryState};
use contracts::shared::preferences::{
    ActiveFeatures, NotificationSettings, PersistedSettings, UserPreferences,
};
use std::collections::{HashMap, HashSet};

pub fn reduce(state: &GlobalState, action: GlobalAction) -> GlobalState {
    match action {
        GlobalAction::UpdateUserPreferences(patch) => GlobalState {
            user_preferences: patch.merge(&state.user_preferences),
            ..state.clone()
        },
        GlobalAction::ResetUserPreferences => GlobalState {
            user_preferences: UserPreferences::default(),
            ..state.clone()
        },
        GlobalAction::UpdateTableConfig { table_id, patch } => {
            let current = state.table_config_or_default(&table_id);
            let mut table_configs = state.table_configs.clone();
            table_configs.insert(table_id, patch.merge(&current));
            GlobalState {
                table_configs,
                ..state.clone()
            }
        }
        GlobalAction::ResetTableConfig { table_id } => {
            let mut table_configs = state.table_configs.clone();
            table_configs.remove(&table_id);
            GlobalState {
                table_configs,
                ..state.clone()
            }
        }
        GlobalAction::ResetAllTableConfigs => GlobalState {
            table_configs: HashMap::new(),
            ..state.clone()
        },
        GlobalAction::UpdateNotificationSettings(patch) => GlobalState {
            notification_settings: patch.merge(&state.notification_settings),
            ..state.clone()
        },
        GlobalAction::ToggleFeature(flag) => GlobalState {
            active_features: state.active_features.toggled(flag),
            ..state.clone()
        },

        GlobalAction::SetSelectedItems { context, items } => {
            with_temporary(state, |tmp| {
                tmp.selected_items
                    .insert(context, items.into_iter().collect());
            })
        }
        GlobalAction::AddSelectedItem { context, item } => with_temporary(state, |tmp| {
            tmp.selected_items.entry(context).or_default().insert(item);
        }),
        GlobalAction::RemoveSelectedItem { context, item } => with_temporary(state, |tmp| {
            if let Some(items) = tmp.selected_items.get_mut(&context) {
                items.remove(&item);
            }
        }),
        GlobalAction::ClearSelectedItems { context } => with_temporary(state, |tmp| {
            tmp.selected_items.remove(&context);
        }),
        GlobalAction::SetExpandedItems { context, items } => {
            with_temporary(state, |tmp| {
                tmp.expanded_items
                    .insert(context, items.into_iter().collect());
            })
        }
        GlobalAction::ToggleExpandedItem { context, item } => with_temporary(state, |tmp| {
            let expanded: &mut HashSet<ItemKey> = tmp.expanded_items.entry(context).or_default();
            if !expanded.remove(&item) {
                expanded.insert(item);
            }
        }),
        GlobalAction::SetSearchQuery { context, query } => with_temporary(state, |tmp| {
            tmp.search_queries.insert(context, query);
        }),
        GlobalAction::ClearSearchQuery { context } => with_temporary(state, |tmp| {
            tmp.search_queries.remove(&context);
        }),

        GlobalAction::ImportSettings(patch) => {
            let imported = patch.apply(&state.persisted());
            GlobalState {
                temporary_state: state.temporary_state.clone(),
                ..GlobalState::from_persisted(imported)
            }
        }
        GlobalAction::ResetAllSettings => GlobalState {
            user_preferences: UserPreferences::default(),
            table_configs: HashMap::new(),
            notification_settings: NotificationSettings::default(),
            active_features: ActiveFeatures::default(),
            temporary_state: state.temporary_state.clone(),
        },
    }
}

/// Copies the temporary state, lets `f` edit the copy and returns the new
/// global state built around it.
fn with_temporary(state: &GlobalState, f: impl FnOnce(&mut TemporaryState)) -> GlobalState {
    let mut temporary_state = state.temporary_state.clone();
    f(&mut temporary_state);
    GlobalState {
        temporary_state,
        ..state.clone()
    }
}

/// Applies `actions` in order starting from `initial`.
pub fn reduce_all(
    initial: &GlobalState,
    actions: impl IntoIterator<Item = GlobalAction>,
) -> GlobalState {
    actions
        .into_iter()
        .fold(initial.clone(), |state, action| reduce(&state, action))
}

/// State a fresh tab starts from when nothing is stored.
pub fn initial_state() -> GlobalState {
    GlobalState::from_persisted(PersistedSettings::default())
}
