use std::collections::HashSet;

use proptest::prelude::*;

use sb::core::{Skill, group_by_archetype, ingest};
use sb::feed::{export_feed, parse_feed};
use sb::core::normalize;

/// Skill lists with unique (archetype, name) pairs. Names may look numeric
/// ("007", "1.50"); descriptions cannot be mistaken for numbers or booleans.
fn skill_list() -> impl Strategy<Value = Vec<Skill>> {
    prop::collection::vec(
        (
            "[A-Za-z0-9][a-z0-9.]{1,6}",
            prop::sample::select(vec!["Mage", "Rogue", "Warrior", "Cleric"]),
            prop::option::of("[a-z ]{1,12}x"),
        ),
        1..40,
    )
    .prop_map(|entries| {
        let mut seen = HashSet::new();
        entries
            .into_iter()
            .filter(|(name, archetype, _)| seen.insert((name.clone(), *archetype)))
            .map(|(name, archetype, description)| {
                let skill = Skill::new(name, archetype, "None");
                match description {
                    Some(text) => skill.with_description(text),
                    None => skill,
                }
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn grouping_partitions_input(skills in skill_list()) {
        let groups = group_by_archetype(skills.clone());

        prop_assert_eq!(groups.skill_count(), skills.len());
        let mut regrouped: Vec<Skill> = groups.skills();
        let mut original = skills.clone();
        let key = |s: &Skill| (s.archetype.clone(), s.name.clone());
        regrouped.sort_by_key(key);
        original.sort_by_key(key);
        prop_assert_eq!(regrouped, original);

        for (archetype, members) in groups.iter() {
            prop_assert!(!members.is_empty());
            prop_assert!(members.iter().all(|s| s.archetype == archetype));
        }
    }

    #[test]
    fn grouping_keeps_source_order_within_groups(skills in skill_list()) {
        let groups = group_by_archetype(skills.clone());
        for (archetype, members) in groups.iter() {
            let expected: Vec<&Skill> = skills.iter().filter(|s| s.archetype == archetype).collect();
            let actual: Vec<&Skill> = members.iter().collect();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn pipeline_is_deterministic(skills in skill_list()) {
        let text = export_feed(&skills).unwrap();
        let first = ingest(parse_feed(&text).unwrap(), "None").unwrap();
        let second = ingest(parse_feed(&text).unwrap(), "None").unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn export_then_reimport_is_identity(skills in skill_list()) {
        let text = export_feed(&skills).unwrap();
        let reimported = normalize(parse_feed(&text).unwrap()).unwrap();
        prop_assert_eq!(reimported, skills);
    }
}
