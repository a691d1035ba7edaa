use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::OutputFormat;
use crate::config::{Config, SourceMode};
use crate::core::{Selection, SelectionKeyMissing};
use crate::error::{Result, SbError};
use crate::live::{CatalogSnapshot, Reconciler};
use crate::prefs::{PreferenceStore, Preferences};
use crate::source::{AnySource, CsvSource, SqliteSource};

pub struct AppContext {
    pub sb_root: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
    pub prefs: PreferenceStore,
    pub output_format: OutputFormat,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let sb_root = Self::find_sb_root()?;
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| default_config_path(&sb_root));
        let config = Config::load(cli.config.as_deref(), &sb_root)?;
        debug!(target: "sb::app", root = %sb_root.display(), mode = ?config.source.mode, "context ready");

        let ctx = Self {
            prefs: PreferenceStore::new(sb_root.join("prefs.json")),
            sb_root,
            config_path,
            config,
            output_format: cli.output_format(),
            verbosity: cli.verbose,
        };
        ctx.note_version()?;
        Ok(ctx)
    }

    /// Context over an explicit root and config, for embedding and tests.
    #[must_use]
    pub fn with_root(sb_root: PathBuf, config: Config, output_format: OutputFormat) -> Self {
        Self {
            prefs: PreferenceStore::new(sb_root.join("prefs.json")),
            config_path: sb_root.join("config.toml"),
            sb_root,
            config,
            output_format,
            verbosity: 0,
        }
    }

    /// Source for the configured mode.
    pub fn build_source(&self) -> Result<AnySource> {
        let source = &self.config.source;
        Ok(match source.mode {
            SourceMode::Live => AnySource::Live(SqliteSource::open(
                source.resolved_database_path(&self.sb_root),
                source.poll_interval(),
            )?),
            SourceMode::Offline => AnySource::Offline(CsvSource::new(
                source.resolved_feed_path(&self.sb_root),
                source.poll_interval(),
            )),
        })
    }

    /// One reconciliation pass over the configured source.
    pub async fn load_catalog(&self) -> Result<Arc<CatalogSnapshot>> {
        let reconciler = Reconciler::with_sentinel(
            Arc::new(self.build_source()?),
            self.config.graph.sentinel.clone(),
        );
        reconciler.reconcile().await
    }

    /// Stored selection, re-validated against `keys` and persisted when
    /// validation moved it.
    pub fn current_selection(
        &self,
        keys: &[String],
    ) -> Result<(Selection, Option<SelectionKeyMissing>)> {
        let mut selection = Preferences::load(&self.prefs).selection;
        let before = selection.clone();
        let missing = selection.reconcile(keys);
        if selection != before {
            Preferences::save_selection(&self.prefs, &selection)?;
        }
        Ok((selection, missing))
    }

    fn note_version(&self) -> Result<()> {
        let version = env!("CARGO_PKG_VERSION");
        if Preferences::note_version(&self.prefs, version)? {
            info!(target: "sb::app", version, "sb updated, see the changelog for what's new");
        }
        Ok(())
    }

    fn find_sb_root() -> Result<PathBuf> {
        if let Ok(root) = std::env::var("SB_ROOT") {
            return Ok(PathBuf::from(root));
        }
        let cwd = std::env::current_dir()?;
        if let Some(found) = find_upwards(&cwd, ".sb") {
            return Ok(found);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| SbError::MissingConfig("data directory not found".to_string()))?;
        Ok(data_dir.join("sb"))
    }
}

fn default_config_path(sb_root: &Path) -> PathBuf {
    if sb_root.ends_with(".sb") {
        sb_root.join("config.toml")
    } else {
        dirs::config_dir()
            .unwrap_or_else(|| sb_root.to_path_buf())
            .join("sb/config.toml")
    }
}

fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}
