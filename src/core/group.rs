//! Archetype grouping.

use serde::{Serialize, Serializer};
use serde::ser::SerializeMap;

use super::skill::Skill;

/// Skills partitioned by archetype, keyed in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchetypeGroups {
    groups: Vec<(String, Vec<Skill>)>,
}

impl ArchetypeGroups {
    #[must_use]
    pub const fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// Archetype names in first-seen order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.groups.iter().map(|(key, _)| key.as_str())
    }

    /// Owned key list, the universe the selection cycles over.
    #[must_use]
    pub fn key_list(&self) -> Vec<String> {
        self.keys().map(str::to_string).collect()
    }

    #[must_use]
    pub fn first_key(&self) -> Option<&str> {
        self.groups.first().map(|(key, _)| key.as_str())
    }

    #[must_use]
    pub fn get(&self, archetype: &str) -> Option<&[Skill]> {
        self.groups
            .iter()
            .find(|(key, _)| key == archetype)
            .map(|(_, skills)| skills.as_slice())
    }

    #[must_use]
    pub fn contains(&self, archetype: &str) -> bool {
        self.get(archetype).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Skill])> + '_ {
        self.groups
            .iter()
            .map(|(key, skills)| (key.as_str(), skills.as_slice()))
    }

    /// Total number of skills across all groups.
    #[must_use]
    pub fn skill_count(&self) -> usize {
        self.groups.iter().map(|(_, skills)| skills.len()).sum()
    }

    /// All skills, group by group.
    #[must_use]
    pub fn skills(&self) -> Vec<Skill> {
        self.groups
            .iter()
            .flat_map(|(_, skills)| skills.iter().cloned())
            .collect()
    }

    fn push(&mut self, skill: Skill) {
        match self
            .groups
            .iter_mut()
            .find(|(key, _)| *key == skill.archetype)
        {
            Some((_, skills)) => skills.push(skill),
            None => self.groups.push((skill.archetype.clone(), vec![skill])),
        }
    }
}

impl Serialize for ArchetypeGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (key, skills) in &self.groups {
            map.serialize_entry(key, skills)?;
        }
        map.end()
    }
}

/// Partition skills by archetype in a single pass, keeping source order
/// within each group.
#[must_use]
pub fn group_by_archetype(skills: Vec<Skill>) -> ArchetypeGroups {
    let mut groups = ArchetypeGroups::new();
    for skill in skills {
        groups.push(skill);
    }
    groups
}
