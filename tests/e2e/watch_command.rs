use std::io::{BufRead, BufReader};
use std::process::Stdio;
use std::time::{Duration, SystemTime};

use serde_json::Value;
use tempfile::tempdir;

use crate::common::{offline_root, sb_process};

#[test]
fn watch_streams_baseline_and_update_then_stops() {
    let dir = tempdir().unwrap();
    let feed = offline_root(dir.path());

    let mut child = sb_process(dir.path())
        .args(["--robot", "-q", "watch", "--max-updates", "1"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let mut lines = BufReader::new(child.stdout.take().unwrap()).lines();

    let baseline: Value = serde_json::from_str(&lines.next().unwrap().unwrap()).unwrap();
    assert_eq!(baseline["event"], "snapshot");
    assert_eq!(baseline["generation"], 1);
    assert_eq!(baseline["archetypes"], serde_json::json!(["Mage", "Rogue"]));
    assert_eq!(baseline["selected"], "Mage");

    // Keep only the header and the Rogue rows.
    let text = std::fs::read_to_string(&feed).unwrap();
    let rogue_only: Vec<&str> = text
        .lines()
        .enumerate()
        .filter(|(index, line)| *index == 0 || line.contains(",Rogue,"))
        .map(|(_, line)| line)
        .collect();
    std::fs::write(&feed, rogue_only.join("\n") + "\n").unwrap();
    std::fs::OpenOptions::new()
        .write(true)
        .open(&feed)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(2))
        .unwrap();

    let update: Value = serde_json::from_str(&lines.next().unwrap().unwrap()).unwrap();
    assert_eq!(update["event"], "snapshot");
    assert_eq!(update["archetypes"], serde_json::json!(["Rogue"]));
    assert_eq!(update["selected"], "Rogue");
    assert_eq!(update["selection_fallback"]["missing"], "Mage");

    let stopped: Value = serde_json::from_str(&lines.next().unwrap().unwrap()).unwrap();
    assert_eq!(stopped["event"], "stopped");
    assert!(child.wait().unwrap().success());

    let prefs: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("prefs.json")).unwrap())
            .unwrap();
    assert_eq!(prefs["selectedArchetype"], "Rogue");
}
