//! JSON-file settings store
//!
//! One JSON object on disk plays the role of the browser's extension
//! storage area: composition settings live under their own key and any
//! sibling keys are preserved across saves.

use std::fs;
use std::path::PathBuf;

use serde_json::{Map, Value};

use snapmat_capture::{CompositionSettings, SettingsStore, StoreError, SETTINGS_KEY};

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_root(&self) -> Option<Map<String, Value>> {
        let text = fs::read_to_string(&self.path).ok()?;
        let root: Value = serde_json::from_str(&text).ok()?;
        match root {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Option<CompositionSettings> {
        let root = self.read_root()?;
        let entry = root.get(SETTINGS_KEY)?;
        serde_json::from_value(entry.clone()).ok()
    }

    fn save(&self, settings: &CompositionSettings) -> Result<(), StoreError> {
        let mut root = self.read_root().unwrap_or_default();

        let entry = serde_json::to_value(settings).map_err(|e| StoreError::Io(e.to_string()))?;
        root.insert(SETTINGS_KEY.to_string(), entry);

        let text = serde_json::to_string_pretty(&Value::Object(root))
            .map_err(|e| StoreError::Io(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
            }
        }
        fs::write(&self.path, text).map_err(|e| StoreError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapmat_capture::BackgroundKind;

    fn scratch_file(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("snapmat-{}-{}.json", tag, std::process::id()))
    }

    #[test]
    fn test_round_trip() {
        let path = scratch_file("roundtrip");
        let _ = fs::remove_file(&path);

        let store = JsonFileStore::new(&path);
        assert!(store.load().is_none());

        let settings = CompositionSettings {
            background: BackgroundKind::Transparent,
            padding: 12,
            ..CompositionSettings::default()
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_sibling_keys_survive_a_save() {
        let path = scratch_file("siblings");
        fs::write(&path, r#"{"screenshotCount": 42}"#).unwrap();

        let store = JsonFileStore::new(&path);
        store.save(&CompositionSettings::default()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let root: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(root["screenshotCount"], 42);
        assert!(root.get(SETTINGS_KEY).is_some());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_unreadable_file_loads_as_empty() {
        let path = scratch_file("garbage");
        fs::write(&path, "not json at all {{{").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.load().is_none());

        let _ = fs::remove_file(&path);
    }
}
