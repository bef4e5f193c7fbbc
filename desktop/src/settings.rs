use std::fs;

use log::{info, warn};
use math_champion::storage::data_dir;
use math_champion::Config;

const SETTINGS_FILE: &str = "settings.json";

fn load() -> Result<Option<Config>, String> {
    let data_dir = data_dir().map_err(|e| e.to_string())?;
    let file_path = data_dir.join(SETTINGS_FILE);

    if !file_path.exists() {
        return Ok(None);
    }

    let content =
        fs::read_to_string(&file_path).map_err(|e| format!("Failed to read file: {}", e))?;

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| format!("Failed to deserialize: {}", e))
}

pub fn load_or_default() -> Config {
    match load() {
        Ok(Some(config)) => {
            info!("Loaded {SETTINGS_FILE}");
            config
        }
        Ok(None) => Config::default(),
        Err(e) => {
            warn!("Ignoring {SETTINGS_FILE}: {e}");
            Config::default()
        }
    }
}
