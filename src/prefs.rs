use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// UI flags remembered between sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub map_controls_minimized: bool,
    pub filters_visible: bool,
}

#[derive(Debug)]
pub struct PreferencesStore {
    path: Option<PathBuf>,
    prefs: Preferences,
}

impl PreferencesStore {
    /// Read the stored flags. A missing file gives the defaults, as does an
    /// unreadable one after a warning.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!("ignoring preferences in {}: {}", path.display(), e);
                Preferences::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Preferences::default(),
            Err(e) => {
                tracing::warn!("cannot read preferences {}: {}", path.display(), e);
                Preferences::default()
            }
        };
        PreferencesStore {
            path: Some(path),
            prefs,
        }
    }

    /// Flags kept only in memory
    pub fn in_memory() -> Self {
        PreferencesStore {
            path: None,
            prefs: Preferences::default(),
        }
    }

    pub fn get(&self) -> Preferences {
        self.prefs
    }

    pub fn toggle_map_controls(&mut self) -> bool {
        self.prefs.map_controls_minimized = !self.prefs.map_controls_minimized;
        self.save();
        self.prefs.map_controls_minimized
    }

    pub fn toggle_filters(&mut self) -> bool {
        self.prefs.filters_visible = !self.prefs.filters_visible;
        self.save();
        self.prefs.filters_visible
    }

    // write failures only cost persistence
    fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let result = serde_json::to_string_pretty(&self.prefs)
            .map_err(std::io::Error::other)
            .and_then(|text| std::fs::write(path, text));
        if let Err(e) = result {
            tracing::warn!("failed to save preferences to {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferencesStore::load(dir.path().join("prefs.json"));
        assert_eq!(store.get(), Preferences::default());
        assert!(!store.get().map_controls_minimized);
        assert!(!store.get().filters_visible);
    }

    #[test]
    fn test_toggles_persist_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut store = PreferencesStore::load(&path);
        assert!(store.toggle_map_controls());
        assert!(store.toggle_filters());
        assert!(!store.toggle_filters());

        let reloaded = PreferencesStore::load(&path);
        assert_eq!(
            reloaded.get(),
            Preferences {
                map_controls_minimized: true,
                filters_visible: false,
            }
        );
    }

    #[test]
    fn test_stored_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let mut store = PreferencesStore::load(&path);
        store.toggle_filters();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["filtersVisible"], serde_json::json!(true));
        assert_eq!(raw["mapControlsMinimized"], serde_json::json!(false));
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{{{").unwrap();
        assert_eq!(PreferencesStore::load(&path).get(), Preferences::default());
    }

    #[test]
    fn test_unwritable_path_still_toggles() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be written as a file
        let mut store = PreferencesStore::load(dir.path());
        assert!(store.toggle_map_controls());
        assert!(store.get().map_controls_minimized);
    }
}
