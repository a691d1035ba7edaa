//! Persisted user preferences.
//!
//! Stored as one flat JSON object. Every key is read on its own and falls
//! back to its own default, so a corrupt `colorScheme` never costs the user
//! their selected archetype.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::core::Selection;
use crate::error::{Result, SbError};

pub const SELECTED_ARCHETYPE_KEY: &str = "selectedArchetype";
pub const SHOW_DESCRIPTIONS_KEY: &str = "checked";
pub const COLOR_SCHEME_KEY: &str = "colorScheme";
pub const VERSION_KEY: &str = "version";

/// Stored in place of an archetype name when nothing is selected.
pub const UNSELECTED_SENTINEL: i64 = -1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorScheme {
    #[default]
    Melon,
    DarkMode,
    EarthTones,
    Bubblegum,
    Honey,
    Mint,
    TheBay,
}

impl ColorScheme {
    pub const ALL: [Self; 7] = [
        Self::Melon,
        Self::DarkMode,
        Self::EarthTones,
        Self::Bubblegum,
        Self::Honey,
        Self::Mint,
        Self::TheBay,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Melon => "melon",
            Self::DarkMode => "dark-mode",
            Self::EarthTones => "earth-tones",
            Self::Bubblegum => "bubblegum",
            Self::Honey => "honey",
            Self::Mint => "mint",
            Self::TheBay => "the-bay",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorScheme {
    type Err = SbError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == s)
            .ok_or_else(|| {
                SbError::Config(format!(
                    "unknown color scheme {s:?} (expected one of: {})",
                    Self::ALL.map(Self::as_str).join(", ")
                ))
            })
    }
}

/// Key-value store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one key. Missing file, missing key or a value of the wrong
    /// shape all read as `None`.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.load_map().remove(key)?;
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(target: "sb::prefs", key, error = %err, "ignoring invalid stored preference");
                None
            }
        }
    }

    /// Write one key, leaving the others untouched.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut map = self.load_map();
        map.insert(key.to_string(), serde_json::to_value(value)?);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|err| SbError::Serialization(format!("preferences serialize: {err}")))?;
        fs::write(&self.path, payload)?;
        debug!(target: "sb::prefs", key, "stored preference");
        Ok(())
    }

    /// Raw stored object, for display.
    #[must_use]
    pub fn snapshot(&self) -> Map<String, Value> {
        self.load_map()
    }

    fn load_map(&self) -> Map<String, Value> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return Map::new();
        };
        if raw.trim().is_empty() {
            return Map::new();
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!(target: "sb::prefs", path = %self.path.display(), "preferences file is not a JSON object, ignoring");
                Map::new()
            }
        }
    }
}

/// Typed view over the stored keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Preferences {
    pub selection: Selection,
    pub show_descriptions: bool,
    pub color_scheme: ColorScheme,
    pub last_seen_version: Option<String>,
}

impl Preferences {
    #[must_use]
    pub fn load(store: &PreferenceStore) -> Self {
        let selection = match store.get::<Value>(SELECTED_ARCHETYPE_KEY) {
            Some(Value::String(key)) if !key.is_empty() => Selection::Selected(key),
            _ => Selection::Unselected,
        };
        let color_scheme = store
            .get::<String>(COLOR_SCHEME_KEY)
            .and_then(|raw| match raw.parse() {
                Ok(scheme) => Some(scheme),
                Err(err) => {
                    warn!(target: "sb::prefs", error = %err, "ignoring stored color scheme");
                    None
                }
            })
            .unwrap_or_default();

        Self {
            selection,
            show_descriptions: store.get(SHOW_DESCRIPTIONS_KEY).unwrap_or(false),
            color_scheme,
            last_seen_version: store.get(VERSION_KEY),
        }
    }

    pub fn save_selection(store: &PreferenceStore, selection: &Selection) -> Result<()> {
        match selection.key() {
            Some(key) => store.set(SELECTED_ARCHETYPE_KEY, &key),
            None => store.set(SELECTED_ARCHETYPE_KEY, &UNSELECTED_SENTINEL),
        }
    }

    pub fn save_show_descriptions(store: &PreferenceStore, show: bool) -> Result<()> {
        store.set(SHOW_DESCRIPTIONS_KEY, &show)
    }

    pub fn save_color_scheme(store: &PreferenceStore, scheme: ColorScheme) -> Result<()> {
        store.set(COLOR_SCHEME_KEY, &scheme.as_str())
    }

    /// Record `current` as seen. Returns true when it differs from the
    /// previously stored version (first run included).
    pub fn note_version(store: &PreferenceStore, current: &str) -> Result<bool> {
        let previous: Option<String> = store.get(VERSION_KEY);
        if previous.as_deref() == Some(current) {
            return Ok(false);
        }
        store.set(VERSION_KEY, &current)?;
        Ok(true)
    }
}

/// Cycle `scheme` by one step, wrapping in both directions.
#[must_use]
pub fn cycle_color_scheme(scheme: ColorScheme, forward: bool) -> ColorScheme {
    let all = ColorScheme::ALL;
    let index = all.iter().position(|s| *s == scheme).unwrap_or(0);
    let next = if forward {
        (index + 1) % all.len()
    } else {
        index.checked_sub(1).unwrap_or(all.len() - 1)
    };
    all[next]
}
