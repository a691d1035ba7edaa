use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::watch;

use sb::core::{Selection, Skill};
use sb::live::{CatalogSnapshot, Reconciler};
use sb::source::{CsvSource, SkillSource, SqliteSource};
use sb::storage::Database;
use sb::test_utils::{CatalogFixture, fixtures::sample_skills};

const POLL: Duration = Duration::from_millis(20);

/// Writers may produce more than one notice per edit, so wait on content
/// rather than on an exact generation.
async fn wait_for_snapshot(
    rx: &mut watch::Receiver<Arc<CatalogSnapshot>>,
    ready: impl FnMut(&Arc<CatalogSnapshot>) -> bool,
) -> Arc<CatalogSnapshot> {
    tokio::time::timeout(Duration::from_secs(10), rx.wait_for(ready))
        .await
        .expect("timed out waiting for snapshot")
        .expect("controller stopped")
        .clone()
}

/// Rewrite the feed and push its mtime forward so coarse timestamps still move.
fn rewrite_feed(fixture: &CatalogFixture, skills: &[Skill], bump: u64) {
    let path = fixture.write_feed(skills).unwrap();
    let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(bump))
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn offline_feed_edits_flow_into_snapshots() {
    let fixture = CatalogFixture::new().unwrap();
    fixture.write_feed(&sample_skills()).unwrap();

    let source = Arc::new(CsvSource::new(fixture.feed_path(), POLL));
    let reconciler = Arc::new(Reconciler::new(Arc::clone(&source)));
    let mut rx = reconciler.snapshots();
    let handle = reconciler.start().await.unwrap();

    let baseline = reconciler.current();
    assert_eq!(baseline.keys(), vec!["Mage", "Rogue"]);
    let mut selection = Selection::default();
    selection.reconcile(&baseline.keys());
    selection.cycle_forward(&baseline.keys());
    assert_eq!(selection.key(), Some("Rogue"));

    // Drop the Rogue archetype entirely.
    let mage_only: Vec<Skill> = sample_skills()
        .into_iter()
        .filter(|skill| skill.archetype == "Mage")
        .collect();
    rewrite_feed(&fixture, &mage_only, 2);

    let snapshot = wait_for_snapshot(&mut rx, |s| s.generation > 1).await;
    assert_eq!(snapshot.keys(), vec!["Mage"]);
    assert_eq!(snapshot.skill_count(), 3);

    let missing = selection.reconcile(&snapshot.keys()).unwrap();
    assert_eq!(missing.missing, "Rogue");
    assert_eq!(selection.key(), Some("Mage"));

    let stats = handle.close().await;
    assert!(stats.runs >= 1);
    assert_eq!(stats.failures, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn broken_feed_keeps_last_good_catalog() {
    let fixture = CatalogFixture::new().unwrap();
    fixture.write_feed(&sample_skills()).unwrap();

    let source = Arc::new(CsvSource::new(fixture.feed_path(), POLL));
    let reconciler = Arc::new(Reconciler::new(Arc::clone(&source)));
    let mut rx = reconciler.snapshots();
    let handle = reconciler.start().await.unwrap();

    let mut duplicated = sample_skills();
    duplicated.push(Skill::new("Blink", "Mage", "None"));
    rewrite_feed(&fixture, &duplicated, 2);

    // Several polls pass; the failed reload must not publish.
    tokio::time::sleep(POLL * 15).await;
    let current = reconciler.current();
    assert_eq!(current.generation, 1);
    assert_eq!(current.skill_count(), 5);

    let mut repaired = sample_skills();
    repaired.push(Skill::new("Shadowstep", "Rogue", "Vanish"));
    rewrite_feed(&fixture, &repaired, 4);

    let snapshot = wait_for_snapshot(&mut rx, |s| s.generation > 1).await;
    assert_eq!(snapshot.skill_count(), 6);

    let stats = handle.close().await;
    assert!(stats.runs >= 1);
    assert!(stats.failures >= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn live_table_writes_from_any_connection_reload() {
    let fixture = CatalogFixture::new().unwrap();
    fixture.seed_database(&sample_skills()).unwrap();

    let source = Arc::new(SqliteSource::open(fixture.database_path(), POLL).unwrap());
    let reconciler = Arc::new(Reconciler::new(Arc::clone(&source)));
    let mut rx = reconciler.snapshots();
    let handle = reconciler.start().await.unwrap();
    assert_eq!(reconciler.current().skill_count(), 5);

    // In-process write through the source.
    source
        .upsert(Skill::new("Frost Nova", "Mage", "Arcane Bolt"))
        .await
        .unwrap();
    let snapshot = wait_for_snapshot(&mut rx, |s| s.skill_count() == 6).await;
    assert_eq!(snapshot.keys(), vec!["Mage", "Rogue"]);

    // Foreign write on a separate connection, seen through data_version.
    let foreign = Database::open(fixture.database_path()).unwrap();
    foreign
        .upsert_skill(&Skill::new("Cleave", "Warrior", "None"))
        .unwrap();
    let snapshot = wait_for_snapshot(&mut rx, |s| s.skill_count() == 7).await;
    assert_eq!(snapshot.keys(), vec!["Mage", "Rogue", "Warrior"]);

    handle.close().await;
    assert_eq!(source.notifier().subscriber_count(), 0);
}

#[tokio::test]
async fn describe_names_the_backing_store() {
    let fixture = CatalogFixture::new().unwrap();
    let csv = CsvSource::new(fixture.feed_path(), POLL);
    assert!(csv.describe().starts_with("feed:"));
    assert!(csv.describe().ends_with("skills.csv"));
}
