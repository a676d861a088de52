//! Property-based tests for roving tab index navigation.

use jumper::navigation::roving_tab_index::{NavigationOutcome, RovingConfig, RovingTabIndex};
use proptest::prelude::*;

fn registered(rows: usize, is_infinite_list: bool) -> RovingTabIndex {
    let mut roving = RovingTabIndex::new(RovingConfig {
        is_infinite_list,
        ..RovingConfig::default()
    });
    for i in 0..rows {
        roving.register(i);
    }
    roving
}

// **Property: infinite lists never wrap**
//
// *For any* infinite list of N rows, pressing "next" on row N-1 any number of
// times never focuses row 0 and signals load-more exactly once.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn infinite_list_end_signals_load_more_once(rows in 1usize..50, presses in 1usize..8) {
        let mut roving = registered(rows, true);
        roving.focus(rows - 1);

        let outcomes: Vec<NavigationOutcome> = (0..presses).map(|_| roving.next()).collect();
        let load_more = outcomes.iter().filter(|o| **o == NavigationOutcome::LoadMore).count();

        prop_assert_eq!(load_more, 1);
        prop_assert_eq!(outcomes[0], NavigationOutcome::LoadMore);
        prop_assert_eq!(roving.focused(), Some(rows - 1));
    }
}

// **Property: focus always lands on a registered row**
//
// *For any* sequence of moves and unregistrations, the focused index (when
// there is one) is registered.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn focus_stays_on_registered_rows(
        rows in 1usize..20,
        infinite in any::<bool>(),
        ops in prop::collection::vec((0u8..3, 0usize..20), 0..40),
    ) {
        let mut roving = registered(rows, infinite);
        for (op, index) in ops {
            match op {
                0 => { roving.next(); }
                1 => { roving.previous(); }
                _ => roving.unregister(index),
            }
            if let Some(focused) = roving.focused() {
                prop_assert!(roving.is_registered(focused));
            }
        }
    }
}

// **Property: finite lists visit every row in one lap**
//
// *For any* finite list of N rows, N presses of "next" from row 0 visit every
// row once and come back to row 0.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn finite_list_cycles_through_all_rows(rows in 2usize..30) {
        let mut roving = registered(rows, false);
        roving.focus(0);
        let visited: Vec<usize> = (0..rows)
            .filter_map(|_| match roving.next() {
                NavigationOutcome::Moved(i) => Some(i),
                _ => None,
            })
            .collect();
        let mut expected: Vec<usize> = (1..rows).collect();
        expected.push(0);
        prop_assert_eq!(visited, expected);
    }
}
