//! SQLite skill table backing live mode.

use std::path::Path;

use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, params};
use tracing::debug;

use crate::core::{FieldValue, RawRow, Skill};
use crate::error::Result;

/// Current schema version, stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: u32 = 1;

const SKILL_COLUMNS: &str = "name, archetype, prerequisite, casting_time, \"range\", duration, \
                             uses, has_active, has_passive, description";

const BOOLEAN_COLUMNS: [&str; 2] = ["has_active", "has_passive"];

/// SQLite database wrapper for the skill catalog
pub struct Database {
    conn: Connection,
    schema_version: u32,
}

impl Database {
    /// Open database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::configure_pragmas(&conn)?;
        Self::from_connection(conn)
    }

    /// Private in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let schema_version = migrate(&conn)?;
        Ok(Self {
            conn,
            schema_version,
        })
    }

    /// Get a reference to the connection
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Current schema version after migrations.
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    /// Every skill row, ordered by name ascending.
    pub fn fetch_rows(&self) -> Result<Vec<RawRow>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {SKILL_COLUMNS} FROM skills ORDER BY name ASC, id ASC"))?;
        let names: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();

        let rows = stmt.query_map([], |row| {
            let mut raw = RawRow::new();
            for (index, column) in names.iter().enumerate() {
                let value = field_from_sql(row.get_ref(index)?, BOOLEAN_COLUMNS.contains(&column.as_str()));
                raw.insert(column.clone(), value);
            }
            Ok(raw)
        })?;

        let rows = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(target: "sb::storage", rows = rows.len(), "fetched skill rows");
        Ok(rows)
    }

    /// Insert or update the skill identified by (archetype, name).
    pub fn upsert_skill(&self, skill: &Skill) -> Result<()> {
        upsert(&self.conn, skill)?;
        Ok(())
    }

    /// Delete a skill. Returns whether a row was removed.
    pub fn delete_skill(&self, archetype: &str, name: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM skills WHERE archetype = ?1 AND name = ?2",
            params![archetype, name],
        )?;
        Ok(removed > 0)
    }

    /// Replace the whole table in one transaction.
    pub fn replace_all(&mut self, skills: &[Skill]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM skills", [])?;
        for skill in skills {
            upsert(&tx, skill)?;
        }
        tx.commit()?;
        debug!(target: "sb::storage", skills = skills.len(), "replaced skill table");
        Ok(skills.len())
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM skills", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

/// `PRAGMA data_version` of a connection; changes when another connection commits.
pub fn data_version(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("PRAGMA data_version", [], |row| row.get(0))?)
}

fn migrate(conn: &Connection) -> Result<u32> {
    let current: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if current < 1 {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS skills (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                archetype TEXT NOT NULL,
                prerequisite TEXT NOT NULL DEFAULT 'None',
                casting_time,
                \"range\",
                duration,
                uses,
                has_active BOOLEAN,
                has_passive BOOLEAN,
                description,
                UNIQUE (archetype, name)
            );
            CREATE INDEX IF NOT EXISTS idx_skills_name ON skills(name);
            PRAGMA user_version = 1;",
        )?;
        debug!(target: "sb::storage", from = current, to = SCHEMA_VERSION, "migrated schema");
    }
    Ok(SCHEMA_VERSION)
}

fn upsert(conn: &Connection, skill: &Skill) -> rusqlite::Result<usize> {
    conn.execute(
        &format!(
            "INSERT INTO skills ({SKILL_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT (archetype, name) DO UPDATE SET
                prerequisite = excluded.prerequisite,
                casting_time = excluded.casting_time,
                \"range\" = excluded.\"range\",
                duration = excluded.duration,
                uses = excluded.uses,
                has_active = excluded.has_active,
                has_passive = excluded.has_passive,
                description = excluded.description"
        ),
        params![
            skill.name,
            skill.archetype,
            skill.prerequisite,
            field_to_sql(&skill.casting_time),
            field_to_sql(&skill.range),
            field_to_sql(&skill.duration),
            field_to_sql(&skill.uses),
            field_to_sql(&skill.has_active),
            field_to_sql(&skill.has_passive),
            field_to_sql(&skill.description),
        ],
    )
}

fn field_to_sql(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Bool(flag) => Value::Integer(i64::from(*flag)),
        FieldValue::Number(number) => Value::Real(*number),
        FieldValue::Text(text) => Value::Text(text.clone()),
    }
}

#[allow(clippy::cast_precision_loss)]
fn field_from_sql(value: ValueRef<'_>, boolean: bool) -> FieldValue {
    match value {
        ValueRef::Null => FieldValue::Null,
        ValueRef::Integer(flag) if boolean => FieldValue::Bool(flag != 0),
        ValueRef::Integer(number) => FieldValue::Number(number as f64),
        ValueRef::Real(number) => FieldValue::Number(number),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            FieldValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
