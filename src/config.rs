use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::NO_PREREQUISITE;
use crate::error::{Result, SbError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub graph: GraphConfig,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>, sb_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("SB_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                SbError::MissingConfig(format!("config file {} not found", path.display()))
            })?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(sb_root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a config file on its own, without defaults layering or env.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        if let Some(patch) = Self::load_patch(path)? {
            config.merge_patch(patch);
        }
        config.validate()?;
        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("sb/config.toml"))
    }

    fn load_project(sb_root: &Path) -> Result<Option<ConfigPatch>> {
        let path = sb_root.join("config.toml");
        Self::load_patch(&path)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| SbError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| SbError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.source {
            self.source.merge(patch);
        }
        if let Some(patch) = patch.graph {
            self.graph.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_string("SB_SOURCE_MODE") {
            self.source.mode = value.parse()?;
        }
        if let Some(value) = env_string("SB_DATABASE_PATH") {
            self.source.database_path = PathBuf::from(value);
        }
        if let Some(value) = env_string("SB_FEED_PATH") {
            self.source.feed_path = PathBuf::from(value);
        }
        if let Some(value) = env_u64("SB_POLL_INTERVAL_MS")? {
            self.source.poll_interval_ms = value;
        }

        if let Some(value) = env_string("SB_GRAPH_SENTINEL") {
            self.graph.sentinel = value;
        }
        if let Some(value) = env_string("SB_GRAPH_FORMAT") {
            self.graph.default_format = value;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.source.poll_interval_ms == 0 {
            return Err(SbError::Config(
                "source.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.graph.sentinel.trim().is_empty() {
            return Err(SbError::Config("graph.sentinel must not be empty".to_string()));
        }
        if !GRAPH_FORMATS.contains(&self.graph.default_format.as_str()) {
            return Err(SbError::Config(format!(
                "graph.default_format {:?} (expected one of: {})",
                self.graph.default_format,
                GRAPH_FORMATS.join(", ")
            )));
        }
        Ok(())
    }
}

/// Export formats the `graph` command understands.
pub const GRAPH_FORMATS: [&str; 4] = ["elements", "json", "dot", "mermaid"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// SQLite table with change notifications.
    #[default]
    Live,
    /// Feed file, polled for modification.
    Offline,
}

impl std::str::FromStr for SourceMode {
    type Err = SbError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "offline" => Ok(Self::Offline),
            _ => Err(SbError::Config(format!(
                "invalid source mode {value} (expected live|offline)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub mode: SourceMode,
    /// Relative paths resolve against the sb root.
    #[serde(default)]
    pub database_path: PathBuf,
    #[serde(default)]
    pub feed_path: PathBuf,
    #[serde(default)]
    pub poll_interval_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::Live,
            database_path: PathBuf::from("skills.db"),
            feed_path: PathBuf::from("skills.csv"),
            poll_interval_ms: 500,
        }
    }
}

impl SourceConfig {
    fn merge(&mut self, patch: SourcePatch) {
        if let Some(value) = patch.mode {
            self.mode = value;
        }
        if let Some(value) = patch.database_path {
            self.database_path = value;
        }
        if let Some(value) = patch.feed_path {
            self.feed_path = value;
        }
        if let Some(value) = patch.poll_interval_ms {
            self.poll_interval_ms = value;
        }
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn resolved_database_path(&self, sb_root: &Path) -> PathBuf {
        sb_root.join(&self.database_path)
    }

    #[must_use]
    pub fn resolved_feed_path(&self, sb_root: &Path) -> PathBuf {
        sb_root.join(&self.feed_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Prerequisite text meaning "no prerequisite".
    #[serde(default)]
    pub sentinel: String,
    #[serde(default)]
    pub default_format: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            sentinel: NO_PREREQUISITE.to_string(),
            default_format: "elements".to_string(),
        }
    }
}

impl GraphConfig {
    fn merge(&mut self, patch: GraphPatch) {
        if let Some(value) = patch.sentinel {
            self.sentinel = value;
        }
        if let Some(value) = patch.default_format {
            self.default_format = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub source: Option<SourcePatch>,
    pub graph: Option<GraphPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SourcePatch {
    pub mode: Option<SourceMode>,
    pub database_path: Option<PathBuf>,
    pub feed_path: Option<PathBuf>,
    pub poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GraphPatch {
    pub sentinel: Option<String>,
    pub default_format: Option<String>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(value) => value.parse::<u64>().map(Some).map_err(|err| {
            SbError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        Err(_) => Ok(None),
    }
}
