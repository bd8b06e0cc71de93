//! Persisted page preferences.
//!
//! Exactly two values survive between visits: `lang` (`sv` | `en`) and
//! `theme` (`dark` | `light`). Reads happen once at startup, writes on every
//! toggle. Anything unexpected in the store is treated as absent.
//!
//! [`FileStore`] keeps the values in a small JSON file for hosts without
//! browser storage:
//!
//! ```json
//! { "lang": "en", "theme": "light" }
//! ```

use crate::types::{Lang, Theme};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const LANG_KEY: &str = "lang";
pub const THEME_KEY: &str = "theme";

/// Synchronous key-value storage for preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory store, the equivalent of a fresh browser profile.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// JSON-file store. Every `set` writes through immediately.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: &Path) -> Self {
        let values = std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            values,
        }
    }

    fn save(&self) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json)
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        if let Err(err) = self.save() {
            tracing::warn!(path = %self.path.display(), %err, "failed to persist preference");
        }
    }
}

/// Saved language; anything but `"en"` means Swedish.
pub fn saved_lang(store: &dyn PreferenceStore) -> Lang {
    match store.get(LANG_KEY).as_deref() {
        Some("en") => Lang::En,
        _ => Lang::Sv,
    }
}

pub fn save_lang(store: &mut dyn PreferenceStore, lang: Lang) {
    store.set(LANG_KEY, lang.as_str());
}

/// Saved theme, if a valid one was ever stored.
pub fn saved_theme(store: &dyn PreferenceStore) -> Option<Theme> {
    store.get(THEME_KEY).as_deref().and_then(Theme::parse)
}

pub fn save_theme(store: &mut dyn PreferenceStore, theme: Theme) {
    store.set(THEME_KEY, theme.as_str());
}

/// Saved theme, else the host's colour-scheme signal (dark unless it
/// prefers light).
pub fn preferred_theme(store: &dyn PreferenceStore, prefers_light: bool) -> Theme {
    saved_theme(store).unwrap_or(if prefers_light {
        Theme::Light
    } else {
        Theme::Dark
    })
}
