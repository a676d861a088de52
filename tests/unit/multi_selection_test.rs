//! Unit tests for multi-selection and the feed navigator that binds it to a
//! mounted feed.

use jumper::navigation::feed_navigator::FeedNavigator;
use jumper::navigation::multi_selection::{BulkAction, MultiSelection};
use jumper::navigation::roving_tab_index::{NavigationOutcome, RovingConfig, RovingTabIndex};
use jumper::navigation::Direction;
use jumper::types::feed::FeedIdentity;
use jumper::types::visit::Visit;

fn roving(rows: usize) -> RovingTabIndex {
    let mut roving = RovingTabIndex::default();
    for i in 0..rows {
        roving.register(i);
    }
    roving
}

fn visits(count: usize) -> Vec<Visit> {
    (0..count)
        .map(|i| Visit::new(&format!("https://a.com/{}", i), "A", "a.com", 0))
        .collect()
}

// ─── MultiSelection ───

#[test]
fn test_toggle_flips_membership() {
    let mut selection = MultiSelection::new(5);
    assert!(selection.toggle(2));
    assert!(selection.is_selected(2));
    assert!(!selection.toggle(2));
    assert!(selection.is_empty());
}

#[test]
fn test_toggle_out_of_range_is_ignored() {
    let mut selection = MultiSelection::new(3);
    assert!(!selection.toggle(3));
    assert!(selection.is_empty());
    assert_eq!(selection.anchor(), None);
}

#[test]
fn test_set_range_is_inclusive_in_both_directions() {
    let mut selection = MultiSelection::new(10);
    selection.set_range(2, 4);
    assert_eq!(selection.selected_indices(), vec![2, 3, 4]);

    let mut backwards = MultiSelection::new(10);
    backwards.set_range(6, 3);
    assert_eq!(backwards.selected_indices(), vec![3, 4, 5, 6]);
}

#[test]
fn test_set_range_keeps_indices_outside_the_range() {
    let mut selection = MultiSelection::new(10);
    selection.toggle(8);
    selection.set_range(1, 2);
    assert_eq!(selection.selected_indices(), vec![1, 2, 8]);
}

#[test]
fn test_set_range_clamps_to_selectable_items() {
    let mut selection = MultiSelection::new(4);
    selection.set_range(2, 9);
    assert_eq!(selection.selected_indices(), vec![2, 3]);

    let mut empty = MultiSelection::new(0);
    empty.set_range(0, 3);
    assert!(empty.is_empty());
}

#[test]
fn test_extend_to_uses_existing_anchor() {
    let mut selection = MultiSelection::new(10);
    selection.toggle(5);
    selection.extend_to(0, 7);
    assert_eq!(selection.selected_indices(), vec![5, 6, 7]);
}

#[test]
fn test_clear_empties_selection_and_anchor() {
    let mut selection = MultiSelection::new(5);
    selection.set_range(0, 3);
    selection.clear();
    assert!(selection.is_empty());
    assert_eq!(selection.anchor(), None);
}

#[test]
fn test_actions_menu_visible_iff_something_selected() {
    let mut selection = MultiSelection::new(3);
    assert!(!selection.is_actions_menu_visible());
    assert!(selection.actions().is_empty());

    selection.toggle(0);
    assert!(selection.is_actions_menu_visible());
    assert_eq!(
        selection.actions(),
        vec![
            BulkAction::OpenAll,
            BulkAction::GroupIntoTag,
            BulkAction::EditTags,
            BulkAction::Save
        ]
    );
}

#[test]
fn test_resolve_selected_returns_items_in_index_order() {
    let items = visits(5);
    let mut selection = MultiSelection::new(5);
    selection.toggle(3);
    selection.toggle(1);

    let resolved = selection.resolve_selected(&roving(5), |i| items.get(i));
    let urls: Vec<&str> = resolved.iter().map(|v| v.url.as_str()).collect();
    assert_eq!(urls, vec!["https://a.com/1", "https://a.com/3"]);
}

#[test]
fn test_submit_selected_falls_back_to_focused_item() {
    let items = visits(3);
    let selection = MultiSelection::new(3);
    let mut roving = roving(3);
    roving.focus(2);

    let mut submitted = Vec::new();
    let count = selection.submit_selected(&roving, |i| items.get(i), |batch| submitted = batch);
    assert_eq!(count, 1);
    assert_eq!(submitted[0].url, "https://a.com/2");
}

#[test]
fn test_submit_selected_with_nothing_is_noop() {
    let items = visits(3);
    let selection = MultiSelection::new(3);
    let mut called = false;
    let count = selection.submit_selected(&roving(3), |i| items.get(i), |_| called = true);
    assert_eq!(count, 0);
    assert!(!called);
}

#[test]
fn test_complete_bulk_action_clears_only_on_success() {
    let mut selection = MultiSelection::new(3);
    selection.toggle(1);

    selection.complete_bulk_action::<String>(&Err("offline".to_string()));
    assert_eq!(selection.len(), 1, "failed action keeps the selection");

    selection.complete_bulk_action::<String>(&Ok(()));
    assert!(selection.is_empty());
}

#[test]
fn test_shrinking_selectable_items_drops_stale_indices() {
    let mut selection = MultiSelection::new(10);
    selection.set_range(3, 8);
    selection.set_total_selectable_items(5);
    assert_eq!(selection.selected_indices(), vec![3, 4]);
}

// ─── FeedNavigator ───

#[test]
fn test_binding_a_different_view_clears_selection_and_focus() {
    let mut nav = FeedNavigator::default();
    nav.bind(FeedIdentity::new("saved", 1), 5, RovingConfig::default());
    nav.sync_rows(5);
    nav.toggle(1);
    nav.toggle(3);
    assert_eq!(nav.selection().len(), 2);

    let changed = nav.bind(FeedIdentity::new("recent", 2), 5, RovingConfig::default());
    assert!(changed);
    assert!(nav.selection().is_empty());
    assert_eq!(nav.roving().focused(), None);
    assert_eq!(nav.roving().registered_count(), 0, "no row of the old feed survives");
}

#[test]
fn test_new_generation_of_same_view_keeps_state() {
    let mut nav = FeedNavigator::default();
    nav.bind(FeedIdentity::new("recent", 1), 3, RovingConfig::default());
    nav.sync_rows(3);
    nav.roving_mut().focus(2);
    nav.toggle(2);

    let changed = nav.bind(FeedIdentity::new("recent", 2), 6, RovingConfig::default());
    nav.sync_rows(6);
    assert!(!changed);
    assert_eq!(nav.selection().selected_indices(), vec![2]);
    assert_eq!(nav.roving().focused(), Some(2));
    assert_eq!(nav.roving().registered_count(), 6);
}

#[test]
fn test_shift_move_extends_selection() {
    let mut nav = FeedNavigator::default();
    nav.bind(FeedIdentity::new("saved", 1), 5, RovingConfig::default());
    nav.sync_rows(5);

    assert_eq!(nav.move_focus(Direction::Next, false), NavigationOutcome::Moved(0));
    assert_eq!(nav.move_focus(Direction::Next, true), NavigationOutcome::Moved(1));
    assert_eq!(nav.move_focus(Direction::Next, true), NavigationOutcome::Moved(2));
    assert_eq!(nav.selection().selected_indices(), vec![0, 1, 2]);
}

#[test]
fn test_submit_urls_prefers_selection_over_focus() {
    let items = visits(4);
    let mut nav = FeedNavigator::default();
    nav.bind(FeedIdentity::new("recent", 1), 4, RovingConfig::default());
    nav.sync_rows(4);

    nav.roving_mut().focus(0);
    assert_eq!(nav.submit_urls(|i| items.get(i)), vec!["https://a.com/0".to_string()]);

    nav.toggle(3);
    nav.toggle(1);
    assert_eq!(
        nav.submit_urls(|i| items.get(i)),
        vec!["https://a.com/1".to_string(), "https://a.com/3".to_string()]
    );
}

#[test]
fn test_sync_rows_shrinks_registered_rows() {
    let mut nav = FeedNavigator::default();
    nav.bind(FeedIdentity::new("allOpen", 1), 5, RovingConfig::default());
    nav.sync_rows(5);
    nav.roving_mut().focus(4);

    nav.bind(FeedIdentity::new("allOpen", 2), 2, RovingConfig::default());
    nav.sync_rows(2);
    assert_eq!(nav.roving().registered_count(), 2);
    assert_eq!(nav.roving().focused(), Some(0));
}

#[test]
fn test_toggle_does_not_move_focus() {
    let mut nav = FeedNavigator::default();
    nav.bind(FeedIdentity::new("allOpen", 1), 3, RovingConfig::default());
    nav.sync_rows(3);
    nav.roving_mut().focus(0);

    assert!(nav.toggle(2));
    assert_eq!(nav.roving().focused(), Some(0));
    assert_eq!(nav.selection().selected_indices(), vec![2]);
}

#[test]
fn test_new_generation_rearms_load_more_without_new_rows() {
    let config = RovingConfig {
        initial_index: 0,
        is_infinite_list: true,
        with_focus_on_hover: false,
    };
    let mut nav = FeedNavigator::default();
    nav.bind(FeedIdentity::new("recent", 1), 2, config);
    nav.sync_rows(2);
    nav.roving_mut().focus(1);
    assert_eq!(nav.move_focus(Direction::Next, false), NavigationOutcome::LoadMore);
    assert_eq!(nav.move_focus(Direction::Next, false), NavigationOutcome::Stalled);

    nav.bind(FeedIdentity::new("recent", 1), 2, config);
    assert_eq!(nav.move_focus(Direction::Next, false), NavigationOutcome::Stalled, "same generation stays stalled");

    nav.bind(FeedIdentity::new("recent", 2), 2, config);
    nav.sync_rows(2);
    assert_eq!(nav.move_focus(Direction::Next, false), NavigationOutcome::LoadMore);
}
