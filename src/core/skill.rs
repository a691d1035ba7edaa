//! Canonical skill entity and the loosely typed cells it is built from.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Prerequisite value meaning "depends on nothing".
pub const NO_PREREQUISITE: &str = "None";

/// Column order of the offline feed and of exports.
pub const COLUMNS: [&str; 10] = [
    "name",
    "archetype",
    "prerequisite",
    "casting_time",
    "range",
    "duration",
    "uses",
    "has_active",
    "has_passive",
    "description",
];

/// Columns that identify a skill or its graph edges. Their text is kept
/// verbatim: `"007"` stays `"007"`, never the number 7.
pub const IDENTITY_COLUMNS: [&str; 3] = ["name", "archetype", "prerequisite"];

/// A single cell after dynamic typing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Type a raw text cell: booleans, numbers, empty-as-null, else text.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "" => Self::Null,
            "true" | "TRUE" | "True" => Self::Bool(true),
            "false" | "FALSE" | "False" => Self::Bool(false),
            _ => looks_numeric(raw)
                .then(|| raw.trim().parse::<f64>().ok())
                .flatten()
                .filter(|value| value.is_finite())
                .map_or_else(|| Self::Text(raw.to_string()), Self::Number),
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text form used for identity columns; `None` for null or blank cells.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(text) if text.trim().is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(value) => write!(f, "{value}"),
            #[allow(clippy::cast_possible_truncation)]
            Self::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{}", *value as i64)
            }
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

fn looks_numeric(raw: &str) -> bool {
    let trimmed = raw.trim();
    let body = trimmed.strip_prefix('-').unwrap_or(trimmed);
    !body.is_empty()
        && body.chars().any(|c| c.is_ascii_digit())
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
}

/// One untyped record as delivered by a source, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: BTreeMap<String, FieldValue>,
}

impl RawRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already typed cells (live source).
    pub fn from_cells<K, I>(cells: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FieldValue)>,
    {
        Self {
            cells: cells.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Build from raw text cells (offline feed). Payload columns are typed
    /// dynamically; identity columns stay text.
    pub fn from_text<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            cells: cells
                .into_iter()
                .map(|(column, raw)| {
                    let value = match raw {
                        "" => FieldValue::Null,
                        _ if IDENTITY_COLUMNS.contains(&column) => FieldValue::Text(raw.to_string()),
                        _ => FieldValue::coerce(raw),
                    };
                    (column.to_string(), value)
                })
                .collect(),
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: FieldValue) {
        self.cells.insert(column.into(), value);
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.cells.get(column)
    }

    /// Owned copy of a cell, null when absent.
    #[must_use]
    pub fn take_or_null(&self, column: &str) -> FieldValue {
        self.cells.get(column).cloned().unwrap_or_default()
    }

    /// True when every cell is null or blank text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|value| value.as_text().is_none())
    }
}

/// A skill as the rest of the engine sees it.
///
/// Only `name`, `archetype` and `prerequisite` are examined; the remaining
/// fields are carried through untouched for display and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub archetype: String,
    pub prerequisite: String,
    #[serde(default)]
    pub casting_time: FieldValue,
    #[serde(default)]
    pub range: FieldValue,
    #[serde(default)]
    pub duration: FieldValue,
    #[serde(default)]
    pub uses: FieldValue,
    #[serde(default)]
    pub has_active: FieldValue,
    #[serde(default)]
    pub has_passive: FieldValue,
    #[serde(default)]
    pub description: FieldValue,
}

impl Skill {
    /// Minimal skill with an empty payload.
    pub fn new(
        name: impl Into<String>,
        archetype: impl Into<String>,
        prerequisite: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            archetype: archetype.into(),
            prerequisite: prerequisite.into(),
            casting_time: FieldValue::Null,
            range: FieldValue::Null,
            duration: FieldValue::Null,
            uses: FieldValue::Null,
            has_active: FieldValue::Null,
            has_passive: FieldValue::Null,
            description: FieldValue::Null,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = FieldValue::Text(description.into());
        self
    }

    /// Cells in `COLUMNS` order.
    #[must_use]
    pub fn cells(&self) -> [FieldValue; 10] {
        [
            FieldValue::Text(self.name.clone()),
            FieldValue::Text(self.archetype.clone()),
            FieldValue::Text(self.prerequisite.clone()),
            self.casting_time.clone(),
            self.range.clone(),
            self.duration.clone(),
            self.uses.clone(),
            self.has_active.clone(),
            self.has_passive.clone(),
            self.description.clone(),
        ]
    }

    #[must_use]
    pub fn has_prerequisite(&self, sentinel: &str) -> bool {
        self.prerequisite != sentinel
    }
}
