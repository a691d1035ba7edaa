use proptest::prelude::*;

use sb::core::{Skill, build_graph, parse_prerequisites};

/// Skills named S0..Sn whose prerequisites point at arbitrary indices,
/// some of them outside the list.
fn archetype_skills() -> impl Strategy<Value = Vec<Skill>> {
    (1usize..20).prop_flat_map(|count| {
        prop::collection::vec(prop::collection::vec(0usize..count + 3, 0..4), count).prop_map(
            |prereqs| {
                prereqs
                    .into_iter()
                    .enumerate()
                    .map(|(index, targets)| {
                        let prerequisite = if targets.is_empty() {
                            "None".to_string()
                        } else {
                            targets
                                .iter()
                                .map(|t| format!("S{t}"))
                                .collect::<Vec<_>>()
                                .join(", ")
                        };
                        Skill::new(format!("S{index}"), "Mage", prerequisite)
                    })
                    .collect()
            },
        )
    })
}

proptest! {
    #[test]
    fn node_and_edge_counts(skills in archetype_skills()) {
        let graph = build_graph("Mage", &skills);
        prop_assert_eq!(graph.nodes().len(), skills.len() + 1);

        let named: usize = skills
            .iter()
            .map(|s| parse_prerequisites(&s.prerequisite, "None").len())
            .sum();
        prop_assert_eq!(graph.edges().len(), named);
    }

    #[test]
    fn dangling_edges_match_warnings(skills in archetype_skills()) {
        let graph = build_graph("Mage", &skills);
        let dangling = graph.edges().iter().filter(|e| e.dangling).count();
        prop_assert_eq!(dangling, graph.warnings().len());
        for edge in graph.edges().iter().filter(|e| e.dangling) {
            prop_assert!(graph.node(&edge.source).is_none());
        }
    }

    #[test]
    fn layering_places_every_skill_once(skills in archetype_skills()) {
        let layering = build_graph("Mage", &skills).layers();
        let placed: usize = layering.layers.iter().map(Vec::len).sum();
        prop_assert_eq!(placed + layering.cyclic.len(), skills.len());
    }
}
