//! Localization store.
//!
//! One flat JSON dictionary per language:
//!
//! ```text
//! locales/
//! ├── sv.json    # default language, also the fallback dictionary
//! └── en.json
//! ```
//!
//! ```json
//! { "sections.packages.badge": "Populärast", "form.status.success": "Tack!" }
//! ```
//!
//! Resolution never fails. A key missing from the requested language is
//! looked up in Swedish, and a key missing from both is returned verbatim so
//! the page shows the key rather than dropping the element.

use crate::types::Lang;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Language whose dictionary backs every other language.
pub const DEFAULT_LANG: Lang = Lang::Sv;

#[derive(Error, Debug)]
pub enum I18nError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dictionary {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Static per-language dictionaries. Loaded once, never mutated.
#[derive(Debug, Clone, Default)]
pub struct Localizer {
    dictionaries: HashMap<Lang, HashMap<String, String>>,
}

impl Localizer {
    pub fn from_maps(dictionaries: HashMap<Lang, HashMap<String, String>>) -> Self {
        Self { dictionaries }
    }

    /// Load `<lang>.json` for every supported language from `dir`.
    ///
    /// A missing file yields an empty dictionary for that language; a file
    /// that exists but does not parse is an error.
    pub fn from_dir(dir: &Path) -> Result<Self, I18nError> {
        let mut dictionaries = HashMap::new();
        for lang in Lang::ALL {
            let path = dir.join(format!("{}.json", lang.as_str()));
            if !path.exists() {
                tracing::warn!(path = %path.display(), "dictionary not found, using empty");
                dictionaries.insert(lang, HashMap::new());
                continue;
            }
            let content = fs::read_to_string(&path).map_err(|source| I18nError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let dict: HashMap<String, String> =
                serde_json::from_str(&content).map_err(|source| I18nError::Json {
                    path: path.display().to_string(),
                    source,
                })?;
            dictionaries.insert(lang, dict);
        }
        Ok(Self { dictionaries })
    }

    fn lookup(&self, lang: Lang, key: &str) -> Option<&str> {
        self.dictionaries
            .get(&lang)
            .and_then(|dict| dict.get(key))
            .map(String::as_str)
    }

    /// Resolve `key` for `lang`, falling back to the default language and
    /// finally to the key itself.
    pub fn resolve(&self, lang: Lang, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key)
            .to_string()
    }

    /// True when `lang` has its own entry for `key` (no fallback).
    pub fn has_key(&self, lang: Lang, key: &str) -> bool {
        self.lookup(lang, key).is_some()
    }

    /// For each language, the keys among `keys` it does not define itself.
    ///
    /// Languages with nothing missing are omitted.
    pub fn missing_keys<'a>(
        &self,
        keys: impl IntoIterator<Item = &'a str> + Clone,
    ) -> Vec<(Lang, Vec<String>)> {
        Lang::ALL
            .into_iter()
            .filter_map(|lang| {
                let mut missing: Vec<String> = keys
                    .clone()
                    .into_iter()
                    .filter(|key| !self.has_key(lang, key))
                    .map(str::to_string)
                    .collect();
                missing.sort();
                missing.dedup();
                (!missing.is_empty()).then_some((lang, missing))
            })
            .collect()
    }
}
