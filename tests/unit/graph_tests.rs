use sb::core::{GraphBuilder, NodeKind, ROOT_NODE_ID, Skill, build_graph};
use sb::test_utils::capture_logs;

fn skill(name: &str, prerequisite: &str) -> Skill {
    Skill::new(name, "Mage", prerequisite)
}

#[test]
fn chain_example_builds_expected_graph() {
    let skills = vec![skill("A", "None"), skill("B", "A"), skill("C", "A, B")];
    let graph = build_graph("Mage", &skills);

    assert_eq!(graph.nodes().len(), 4);
    assert_eq!(graph.nodes()[0].id, ROOT_NODE_ID);
    assert_eq!(graph.nodes()[0].kind, NodeKind::Root);
    assert!(
        graph.skill_nodes().all(|n| n.parent.as_deref() == Some(ROOT_NODE_ID)),
        "every skill node sits under the root"
    );

    assert_eq!(graph.edges().len(), 3);
    assert!(graph.has_edge("A", "B"));
    assert!(graph.has_edge("A", "C"));
    assert!(graph.has_edge("B", "C"));
    assert!(graph.warnings().is_empty());
}

#[test]
fn dangling_prerequisite_is_kept_and_logged() {
    let skills = vec![skill("Meteor", "Fireball")];
    let (graph, logs) = capture_logs(|| build_graph("Mage", &skills));

    assert_eq!(graph.edges().len(), 1);
    assert!(graph.edges()[0].dangling);
    assert_eq!(graph.warnings().len(), 1);
    assert_eq!(graph.warnings()[0].prerequisite, "Fireball");

    let warnings = logs.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].target, "sb::graph");
    assert_eq!(warnings[0].field("prerequisite"), Some("Fireball"));
}

#[test]
fn custom_sentinel_is_honoured() {
    let skills = vec![skill("A", "-"), skill("B", "A")];
    let graph = GraphBuilder::new("-").build("Mage", &skills);
    assert_eq!(graph.edges().len(), 1);
    assert_eq!(graph.nodes()[0].label, "-");
}

#[test]
fn layers_follow_prerequisite_depth() {
    let skills = vec![
        skill("A", "None"),
        skill("B", "A"),
        skill("C", "B"),
        skill("D", "None"),
    ];
    let layering = build_graph("Mage", &skills).layers();
    assert_eq!(layering.layers[0], vec!["A", "D"]);
    assert_eq!(layering.layers[1], vec!["B"]);
    assert_eq!(layering.layers[2], vec!["C"]);
    assert!(layering.cyclic.is_empty());
}

#[test]
fn elements_carry_renderer_hints() {
    let graph = build_graph("Mage", &[skill("A", "None"), skill("B", "A")]);
    let elements = graph.to_elements();

    let root = &elements["nodes"][0]["data"];
    assert_eq!(root["id"], ROOT_NODE_ID);

    let node = &elements["nodes"][1];
    assert_eq!(node["classes"], "switch");
    assert_eq!(node["data"]["parent"], ROOT_NODE_ID);
    assert_eq!(node["data"]["callCount"], 10);
    assert_eq!(node["data"]["delayMS"], 100);

    let edge = &elements["edges"][0]["data"];
    assert_eq!(edge["source"], "A");
    assert_eq!(edge["target"], "B");
    assert_eq!(edge["speed"], 100);
    assert_eq!(edge["bw"], 50);
}
