//! The worked scenarios and ordering properties.

use std::sync::Arc;

use pagegate_acl::{
    Capability, Decision, Group, Identity, InMemoryGroups, PageActions, PolicyEvaluator,
    PolicyStore, Requester, Rule, RuleList,
};

use crate::common::{TestHarness, group};

/// Opaque actions with no hierarchy: each implies only itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Act {
    View,
    Edit,
}

impl Capability for Act {
    fn implies(&self, other: &Self) -> bool {
        self == other
    }
}

fn rule(allow: bool, acts: &[Act], principal: Identity) -> Rule<Act> {
    let mut rule = if allow {
        Rule::allow(principal)
    } else {
        Rule::deny(principal)
    };
    for act in acts {
        rule.add_capability(*act);
    }
    rule
}

fn evaluator(groups: InMemoryGroups) -> PolicyEvaluator {
    PolicyEvaluator::new(Arc::new(groups), Arc::new(PolicyStore::new()))
}

fn decide(evaluator: &PolicyEvaluator, rules: &RuleList<Act>, who: &str, act: Act) -> Decision {
    evaluator
        .first_match(&Requester::new(Identity::user(who)), &act, Some(rules), None)
        .decision
}

// ----------------------------------------------------------------------------
// Opaque capabilities
// ----------------------------------------------------------------------------

#[test]
fn test_single_resource_scenario() {
    let evaluator = evaluator(InMemoryGroups::new());
    let rules = RuleList::new()
        .with_rule(rule(true, &[Act::View], Identity::user("Alice")))
        .with_rule(rule(false, &[Act::Edit], Identity::user("Charlie")))
        .with_rule(rule(true, &[Act::View], Identity::user("Charlie")))
        .with_rule(rule(true, &[Act::View, Act::Edit], Identity::user("Bob")));

    assert_eq!(
        decide(&evaluator, &rules, "Alice", Act::Edit),
        Decision::None
    );
    assert_eq!(
        decide(&evaluator, &rules, "Bob", Act::Edit),
        Decision::Allow
    );
    assert_eq!(
        decide(&evaluator, &rules, "Charlie", Act::Edit),
        Decision::Deny
    );
    assert_eq!(
        decide(&evaluator, &rules, "Charlie", Act::View),
        Decision::Allow
    );
}

#[test]
fn test_group_scenario() {
    let groups = InMemoryGroups::from_groups([
        group("Foo", &["Alice", "Bob"]),
        group("Bar", &["Bob", "Charlie"]),
    ]);
    let evaluator = evaluator(groups);
    let rules = RuleList::new()
        .with_rule(rule(true, &[Act::Edit], Identity::group("Foo")))
        .with_rule(rule(false, &[Act::Edit], Identity::group("Bar")))
        .with_rule(rule(true, &[Act::View], Identity::user("Alice")))
        .with_rule(rule(false, &[Act::Edit], Identity::user("Charlie")));

    assert_eq!(
        decide(&evaluator, &rules, "Alice", Act::Edit),
        Decision::Allow
    );
    assert_eq!(
        decide(&evaluator, &rules, "Bob", Act::Edit),
        Decision::Allow
    );
    assert_eq!(decide(&evaluator, &rules, "Bob", Act::View), Decision::None);
    assert_eq!(
        decide(&evaluator, &rules, "Charlie", Act::Edit),
        Decision::Deny
    );
}

#[test]
fn test_opaque_default_list() {
    let acl = evaluator(InMemoryGroups::new());
    let alice_views = rule(true, &[Act::View], Identity::user("Alice"));
    let default = RuleList::new().with_rule(alice_views);
    let alice = Requester::new(Identity::user("Alice"));

    let empty = RuleList::new();
    let fallback = Some(&default);
    let verdict = acl.first_match(&alice, &Act::View, Some(&empty), fallback);
    assert_eq!(verdict.decision, Decision::Allow);

    let verdict = acl.first_match(&alice, &Act::View, None, None);
    assert_eq!(verdict.decision, Decision::None);
    assert_eq!(verdict.source, None);
}

// ----------------------------------------------------------------------------
// Page permissions from rule text
// ----------------------------------------------------------------------------

#[test]
fn test_page_scenario_with_action_hierarchy() {
    let harness = TestHarness::new(&["Alice", "Bob", "Charlie"], Vec::new());
    harness.install(
        "Main",
        "ALLOW view Alice\nDENY edit Charlie\nALLOW view Charlie\nALLOW view,edit Bob",
    );

    assert_eq!(
        harness.decide("Alice", "Main", PageActions::EDIT),
        Decision::None
    );
    assert_eq!(
        harness.decide("Bob", "Main", PageActions::EDIT),
        Decision::Allow
    );
    assert_eq!(
        harness.decide("Bob", "Main", PageActions::COMMENT),
        Decision::Allow
    );
    assert_eq!(
        harness.decide("Charlie", "Main", PageActions::EDIT),
        Decision::Deny
    );
    // `edit` implies `view`, so the earlier DENY covers the view request.
    assert_eq!(
        harness.decide("Charlie", "Main", PageActions::VIEW),
        Decision::Deny
    );
}

#[test]
fn test_first_match_beats_later_deny_across_groups() {
    let harness = TestHarness::new(
        &["Bob"],
        vec![group("Writers", &["Bob"]), group("Suspended", &["Bob"])],
    );
    harness.install("Main", "ALLOW edit Writers\nDENY edit Suspended");
    assert_eq!(
        harness.decide("Bob", "Main", PageActions::EDIT),
        Decision::Allow
    );

    harness.install("Main", "DENY edit Suspended\nALLOW edit Writers");
    assert_eq!(
        harness.decide("Bob", "Main", PageActions::EDIT),
        Decision::Deny
    );
}

#[test]
fn test_all_role_and_default_list() {
    let harness = TestHarness::new(&["Alice"], Vec::new());
    harness.install_default("ALLOW view All");

    assert_eq!(
        harness.decide("Alice", "Anything", PageActions::VIEW),
        Decision::Allow
    );
    assert_eq!(
        harness.decide("Stranger", "Anything", PageActions::VIEW),
        Decision::Allow
    );
    assert_eq!(
        harness.decide("Alice", "Anything", PageActions::EDIT),
        Decision::None
    );

    harness.install("Private", "ALLOW view Alice");
    assert_eq!(
        harness.decide("Stranger", "Private", PageActions::VIEW),
        Decision::None
    );
}

#[test]
fn test_unresolved_principal_never_grants() {
    let harness = TestHarness::new(&[], vec![Group::new("Editors")]);
    let source = "ALLOW edit Ghost\nALLOW view Editors";
    let parsed = pagegate_acl::parse_rules("Main", source, &harness.directory);
    let ghost = Identity::unresolved("Ghost");
    assert_eq!(parsed.rules.unresolved(), vec![&ghost]);
    harness.evaluator.store().install("Main", parsed.rules);

    assert_eq!(
        harness.decide("Ghost", "Main", PageActions::VIEW),
        Decision::None
    );
}
