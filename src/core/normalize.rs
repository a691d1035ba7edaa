//! Record normalizer: raw source rows to canonical skills.
//!
//! Both sources (live table rows and the offline feed) arrive as
//! [`RawRow`]s. The normalizer keeps source order, fills the typed
//! payload, and rejects record sets it cannot turn into graph nodes.
//! Prerequisite text is left as-is; parsing it belongs to the graph builder.

use std::collections::HashMap;

use tracing::debug;

use super::skill::{FieldValue, NO_PREREQUISITE, RawRow, Skill};
use crate::error::{IngestionError, Result};

/// Turn rows into skills, in source order.
pub fn normalize(rows: Vec<RawRow>) -> Result<Vec<Skill>> {
    normalize_with_sentinel(rows, NO_PREREQUISITE)
}

/// Like [`normalize`], with an explicit "no prerequisite" value.
pub fn normalize_with_sentinel(rows: Vec<RawRow>, sentinel: &str) -> Result<Vec<Skill>> {
    if rows.is_empty() {
        return Err(IngestionError::Empty.into());
    }

    let mut seen: HashMap<(String, String), usize> = HashMap::with_capacity(rows.len());
    let mut skills = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        let skill = skill_from_row(&row, index, sentinel)?;
        let key = (skill.archetype.clone(), skill.name.clone());
        if let Some(first) = seen.insert(key, index) {
            return Err(IngestionError::DuplicateSkill {
                archetype: skill.archetype,
                name: skill.name,
                first,
                second: index,
            }
            .into());
        }
        skills.push(skill);
    }

    debug!(target: "sb::ingest", skills = skills.len(), "normalized record set");
    Ok(skills)
}

fn skill_from_row(row: &RawRow, index: usize, sentinel: &str) -> Result<Skill> {
    let name = row
        .get("name")
        .and_then(FieldValue::as_text)
        .ok_or(IngestionError::MissingName { row: index })?;

    let archetype = row
        .get("archetype")
        .and_then(FieldValue::as_text)
        .unwrap_or_default();

    let prerequisite = row
        .get("prerequisite")
        .and_then(FieldValue::as_text)
        .unwrap_or_else(|| sentinel.to_string());

    Ok(Skill {
        name,
        archetype,
        prerequisite,
        casting_time: row.take_or_null("casting_time"),
        range: row.take_or_null("range"),
        duration: row.take_or_null("duration"),
        uses: row.take_or_null("uses"),
        has_active: row.take_or_null("has_active"),
        has_passive: row.take_or_null("has_passive"),
        description: row.take_or_null("description"),
    })
}
