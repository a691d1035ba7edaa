use sb::core::{FieldValue, Selection, ingest, normalize};
use sb::error::{IngestionError, SbError};
use sb::feed::{export_feed, parse_feed, read_feed};
use sb::test_utils::fixtures::sample_skills;

use crate::common::fixture_path;

#[test]
fn sample_feed_groups_in_first_appearance_order() {
    let rows = read_feed(&fixture_path("tests/fixtures/feeds/skills.csv")).unwrap();
    assert_eq!(rows.len(), 6, "trailing blank row must be dropped");

    let groups = ingest(rows, "None").unwrap();
    assert_eq!(groups.key_list(), vec!["Mage", "Rogue"]);

    let mage: Vec<&str> = groups
        .get("Mage")
        .unwrap()
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(mage, vec!["Arcane Bolt", "Blink", "Meteor"]);
}

#[test]
fn sample_feed_fields_are_typed() {
    let rows = read_feed(&fixture_path("tests/fixtures/feeds/skills.csv")).unwrap();
    let skills = normalize(rows).unwrap();

    let blink = &skills[1];
    assert_eq!(blink.casting_time, FieldValue::Number(1.0));
    assert_eq!(blink.uses, FieldValue::Number(3.0));
    assert_eq!(blink.has_active, FieldValue::Bool(true));
    assert_eq!(blink.description, FieldValue::Text("Short-range teleport".to_string()));

    let evasion = &skills[5];
    assert_eq!(evasion.casting_time, FieldValue::Null);
    assert_eq!(evasion.has_passive, FieldValue::Bool(true));
}

#[test]
fn first_row_without_name_fails_ingestion() {
    let rows = parse_feed("name,archetype,prerequisite\n,Mage,None\nZap,Mage,None\n").unwrap();
    let err = ingest(rows, "None").unwrap_err();
    assert!(matches!(
        err,
        SbError::Ingestion(IngestionError::MissingName { row: 0 })
    ));
}

#[test]
fn header_only_feed_is_empty_ingestion() {
    let rows = parse_feed("name,archetype,prerequisite\n").unwrap();
    let err = ingest(rows, "None").unwrap_err();
    assert!(matches!(err, SbError::Ingestion(IngestionError::Empty)));
}

#[test]
fn exported_catalog_reimports_identically() {
    let skills = sample_skills();
    let text = export_feed(&skills).unwrap();
    let reimported = normalize(parse_feed(&text).unwrap()).unwrap();
    assert_eq!(reimported, skills);
}

#[test]
fn selection_follows_catalog_changes() {
    let first = ingest(
        parse_feed("name,archetype,prerequisite\nZap,Mage,None\nStab,Rogue,None\n").unwrap(),
        "None",
    )
    .unwrap();
    let mut selection = Selection::Unselected;
    assert!(selection.reconcile(&first.key_list()).is_none());
    assert_eq!(selection.key(), Some("Mage"));

    selection.cycle_forward(&first.key_list());
    assert_eq!(selection.key(), Some("Rogue"));

    let second = ingest(
        parse_feed("name,archetype,prerequisite\nZap,Mage,None\nSmash,Warrior,None\n").unwrap(),
        "None",
    )
    .unwrap();
    let missing = selection.reconcile(&second.key_list()).unwrap();
    assert_eq!(missing.missing, "Rogue");
    assert_eq!(missing.fallback.as_deref(), Some("Mage"));
    assert_eq!(selection.key(), Some("Mage"));
}
