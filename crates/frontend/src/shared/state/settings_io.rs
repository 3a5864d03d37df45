//! Backup and restore of the persisted settings as a JSON document.

use super::global_state::GlobalState;
use contracts::shared::preferences::PersistedSettingsPatch;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings are not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("settings must be a JSON object")]
    NotAnObject,
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Serializes exactly the persisted sections of `state`.
pub fn export_settings(state: &GlobalState) -> Result<String, SettingsError> {
    serde_json::to_string_pretty(&state.persisted()).map_err(SettingsError::Serialize)
}

/// Parses and validates an exported document. Any subset of the four
/// sections may be present; unknown top-level keys are ignored.
pub fn parse_settings(raw: &str) -> Result<PersistedSettingsPatch, SettingsError> {
    let value: Value = serde_json::from_str(raw).map_err(SettingsError::Parse)?;
    if !value.is_object() {
        return Err(SettingsError::NotAnObject);
    }
    let patch: PersistedSettingsPatch =
        serde_json::from_value(value).map_err(SettingsError::Parse)?;
    validate(&patch)?;
    Ok(patch)
}

fn validate(patch: &PersistedSettingsPatch) -> Result<(), SettingsError> {
    if let Some(prefs) = &patch.user_preferences {
        if prefs.default_page_size == 0 {
            return Err(SettingsError::InvalidValue {
                field: "userPreferences.defaultPageSize".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
    }
    if let Some(tables) = &patch.table_configs {
        if let Some((table_id, _)) = tables.iter().find(|(_, config)| config.page_size == 0) {
            return Err(SettingsError::InvalidValue {
                field: format!("tableConfigs.{}.pageSize", table_id),
                reason: "must be greater than zero".to_string(),
            });
        }
    }
    Ok(())
}
