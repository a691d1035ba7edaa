use std::path::PathBuf;

use tempfile::TempDir;

use crate::core::{RawRow, Skill};
use crate::error::Result;
use crate::feed::write_feed;
use crate::storage::Database;

/// Small catalog used across tests: two archetypes, one chain, one
/// dangling prerequisite.
#[must_use]
pub fn sample_skills() -> Vec<Skill> {
    vec![
        Skill::new("Arcane Bolt", "Mage", "None").with_description("Basic bolt"),
        Skill::new("Blink", "Mage", "Arcane Bolt"),
        Skill::new("Meteor", "Mage", "Blink, Fireball"),
        Skill::new("Backstab", "Rogue", "None"),
        Skill::new("Vanish", "Rogue", "Backstab"),
    ]
}

/// [`sample_skills`] as raw text rows.
#[must_use]
pub fn sample_rows() -> Vec<RawRow> {
    sample_skills()
        .iter()
        .map(|skill| {
            RawRow::from_text([
                ("name", skill.name.as_str()),
                ("archetype", skill.archetype.as_str()),
                ("prerequisite", skill.prerequisite.as_str()),
            ])
        })
        .collect()
}

/// Isolated directory holding a feed file and a database.
pub struct CatalogFixture {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl CatalogFixture {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().to_path_buf();
        Ok(Self { temp_dir, root })
    }

    #[must_use]
    pub fn feed_path(&self) -> PathBuf {
        self.root.join("skills.csv")
    }

    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.root.join("skills.db")
    }

    /// Write `skills` as the feed file.
    pub fn write_feed(&self, skills: &[Skill]) -> Result<PathBuf> {
        let path = self.feed_path();
        write_feed(&path, skills)?;
        Ok(path)
    }

    /// Create the database and fill it with `skills`.
    pub fn seed_database(&self, skills: &[Skill]) -> Result<Database> {
        let mut db = Database::open(self.database_path())?;
        db.replace_all(skills)?;
        Ok(db)
    }
}
