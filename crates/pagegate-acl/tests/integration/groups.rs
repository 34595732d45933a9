//! Nested and cyclic group membership.

use pagegate_acl::{Decision, Group, GroupResolver, Identity, PageActions};

use crate::common::{TestHarness, group};

#[test]
fn test_membership_through_three_levels() {
    let harness = TestHarness::new(
        &["Alice"],
        vec![
            Group::with_members("Staff", [Identity::group("Editors")]),
            Group::with_members("Editors", [Identity::group("Interns")]),
            group("Interns", &["Alice"]),
        ],
    );
    harness.install("Main", "ALLOW edit Staff");
    assert_eq!(
        harness.decide("Alice", "Main", PageActions::COMMENT),
        Decision::Allow
    );
    assert_eq!(
        harness.decide("Bob", "Main", PageActions::COMMENT),
        Decision::None
    );
}

#[test]
fn test_cycle_terminates_and_still_credits_members() {
    let harness = TestHarness::new(
        &["Alice"],
        vec![
            Group::with_members("A", [Identity::group("B"), Identity::user("Alice")]),
            Group::with_members("B", [Identity::group("C")]),
            Group::with_members("C", [Identity::group("A")]),
        ],
    );
    harness.install("Main", "ALLOW view B");
    assert_eq!(
        harness.decide("Alice", "Main", PageActions::VIEW),
        Decision::Allow
    );
    assert_eq!(
        harness.decide("Bob", "Main", PageActions::VIEW),
        Decision::None
    );
}

#[test]
fn test_self_membership_is_harmless() {
    let harness = TestHarness::new(
        &[],
        vec![Group::with_members("Loop", [Identity::group("Loop")])],
    );
    harness.install("Main", "DENY view Loop");
    assert_eq!(
        harness.decide("Alice", "Main", PageActions::VIEW),
        Decision::None
    );
}

#[test]
fn test_group_changes_apply_to_next_decision() {
    let harness = TestHarness::new(&["Alice"], vec![Group::new("Editors")]);
    harness.install("Main", "ALLOW edit Editors");
    assert_eq!(
        harness.decide("Alice", "Main", PageActions::EDIT),
        Decision::None
    );

    let alice = Identity::user("Alice");
    harness.groups.add_member("Editors", alice).unwrap();
    assert_eq!(
        harness.decide("Alice", "Main", PageActions::EDIT),
        Decision::Allow
    );

    harness.groups.remove("Editors");
    assert!(!harness.groups.has_group("Editors"));
    assert_eq!(
        harness.decide("Alice", "Main", PageActions::EDIT),
        Decision::None
    );
}
