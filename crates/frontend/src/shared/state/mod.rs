pub mod actions;
pub mod batch_selection;
pub mod context;
pub mod global_state;
pub mod persistence;
pub mod reducer;
pub mod settings_io;

pub use batch_selection::{use_batch_selection, BatchSelectable, BatchSelection, BatchSelectionHandle};
pub use context::{
    use_feature_flags, use_global_state, use_notification_settings, use_settings_transfer,
    use_table_config, use_temporary_state, use_user_preferences, GlobalStateContext,
    GlobalStateProvider,
};
pub use global_state::{GlobalState, ItemKey, TemporaryState};
pub use settings_io::SettingsError;
