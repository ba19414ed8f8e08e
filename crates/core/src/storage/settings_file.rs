use crate::errors::CoreError;
use crate::models::settings::Settings;

/// Read user settings from a JSON file.
///
/// A missing file is `NotFound`; malformed JSON is `Deserialization`.
pub fn load_settings(path: &str) -> Result<Settings, CoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_string()),
        _ => CoreError::from(e),
    })?;

    let settings: Settings = serde_json::from_str(&content).map_err(|e| {
        CoreError::Deserialization(format!("Failed to parse settings {path}: {e}"))
    })?;

    log::info!(
        "Loaded settings from {path}: {} currencies, {} stocks",
        settings.currencies.len(),
        settings.stocks.len()
    );
    Ok(settings)
}

/// Write settings back as pretty JSON.
pub fn save_settings(settings: &Settings, path: &str) -> Result<(), CoreError> {
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize settings: {e}")))?;
    std::fs::write(path, json)?;
    Ok(())
}
