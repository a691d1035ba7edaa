//! Offline tabular feed: comma-delimited, newline-terminated, fixed header.
//!
//! Reading types every cell dynamically and drops a trailing sentinel row.
//! Writing emits the canonical header and column order so that a written
//! feed reads back to the same skill list.

use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, Terminator, WriterBuilder};
use tracing::debug;

use crate::core::{COLUMNS, RawRow, Skill};
use crate::error::{IngestionError, Result, SbError};

/// Parse feed text into raw rows.
pub fn parse_feed(text: &str) -> Result<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(b',')
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if !headers.iter().any(|header| header == "name") {
        return Err(IngestionError::Malformed("header row has no `name` column".to_string()).into());
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(RawRow::from_text(headers.iter().zip(record.iter())));
    }

    if drop_trailing_sentinel(&mut rows) {
        debug!(target: "sb::feed", "dropped trailing sentinel row");
    }
    Ok(rows)
}

/// Read and parse a feed file.
pub fn read_feed(path: &Path) -> Result<Vec<RawRow>> {
    let text = fs::read_to_string(path)
        .map_err(|err| SbError::NotFound(format!("read feed {}: {err}", path.display())))?;
    parse_feed(&text)
}

/// Remove the blank row that terminates a feed. Returns whether one was dropped.
pub fn drop_trailing_sentinel(rows: &mut Vec<RawRow>) -> bool {
    if rows.last().is_some_and(RawRow::is_blank) {
        rows.pop();
        return true;
    }
    false
}

/// Serialize skills to feed text.
pub fn export_feed(skills: &[Skill]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .delimiter(b',')
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(COLUMNS)
        .map_err(|err| SbError::Serialization(format!("feed header: {err}")))?;
    for skill in skills {
        let cells = skill.cells().map(|cell| cell.to_string());
        writer
            .write_record(&cells)
            .map_err(|err| SbError::Serialization(format!("feed row {:?}: {err}", skill.name)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| SbError::Serialization(format!("feed flush: {err}")))?;
    String::from_utf8(bytes).map_err(|err| SbError::Serialization(format!("feed utf-8: {err}")))
}

/// Write skills to a feed file, creating parent directories.
pub fn write_feed(path: &Path, skills: &[Skill]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, export_feed(skills)?)?;
    Ok(())
}
