use proptest::prelude::*;

use sb::core::Selection;

fn keys() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[A-Z][a-z]{2,8}", 1..12)
        .prop_map(|set| set.into_iter().collect())
}

proptest! {
    #[test]
    fn forward_then_backward_is_identity((keys, index) in keys().prop_flat_map(|k| {
        let len = k.len();
        (Just(k), 0..len)
    })) {
        let mut selection = Selection::Selected(keys[index].clone());
        selection.cycle_forward(&keys);
        selection.cycle_backward(&keys);
        prop_assert_eq!(selection.key(), Some(keys[index].as_str()));
    }

    #[test]
    fn cycling_wraps_around(keys in keys()) {
        let last = keys.len() - 1;

        let mut selection = Selection::Selected(keys[last].clone());
        selection.cycle_forward(&keys);
        prop_assert_eq!(selection.key(), Some(keys[0].as_str()));

        let mut selection = Selection::Selected(keys[0].clone());
        selection.cycle_backward(&keys);
        prop_assert_eq!(selection.key(), Some(keys[last].as_str()));
    }

    #[test]
    fn full_forward_cycle_returns_home((keys, index) in keys().prop_flat_map(|k| {
        let len = k.len();
        (Just(k), 0..len)
    })) {
        let mut selection = Selection::Selected(keys[index].clone());
        for _ in 0..keys.len() {
            selection.cycle_forward(&keys);
        }
        prop_assert_eq!(selection.key(), Some(keys[index].as_str()));
    }

    #[test]
    fn reconcile_always_lands_on_a_key(keys in keys(), stale in "[a-z]{3,6}") {
        let mut selection = Selection::Selected(stale);
        selection.reconcile(&keys);
        let key = selection.key().unwrap();
        prop_assert!(keys.iter().any(|k| k == key));
    }
}
