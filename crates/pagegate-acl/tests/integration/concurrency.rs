//! Concurrent evaluation against swapped snapshots.

use std::sync::Arc;
use std::thread;

use pagegate_acl::{
    Decision, Identity, InMemoryGroups, PageActions, PagePermission, PolicyEvaluator, PolicyStore,
    Requester, Rule, RuleList,
};

fn list(allow: bool) -> RuleList {
    let principal = Identity::user("Alice");
    let rule = if allow {
        Rule::allow(principal)
    } else {
        Rule::deny(principal)
    };
    let edit = PagePermission::new("Main", PageActions::EDIT);
    RuleList::new().with_rule(rule.with_capability(edit))
}

#[test]
fn test_readers_see_whole_snapshots() {
    let store = Arc::new(PolicyStore::new());
    store.install("Main", list(true));
    let groups = Arc::new(InMemoryGroups::new());
    let evaluator = PolicyEvaluator::new(groups, store.clone());

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let evaluator = evaluator.clone();
            thread::spawn(move || {
                let alice = Requester::new(Identity::user("Alice"));
                let view = PagePermission::new("Main", PageActions::VIEW);
                for _ in 0..500 {
                    let decision = evaluator.decide(&alice, &view);
                    assert!(matches!(decision, Decision::Allow | Decision::Deny));
                }
            })
        })
        .collect();

    let writer = thread::spawn(move || {
        for i in 0..200 {
            store.install("Main", list(i % 2 == 0));
        }
    });

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn test_held_snapshot_outlives_install() {
    let store = Arc::new(PolicyStore::new());
    store.install("Main", list(true));
    let groups = Arc::new(InMemoryGroups::new());
    let evaluator = PolicyEvaluator::new(groups, store.clone());

    let snapshot = store.rules_for("Main").unwrap();
    store.install("Main", list(false));

    let alice = Requester::new(Identity::user("Alice"));
    let edit = PagePermission::new("Main", PageActions::EDIT);
    let held = evaluator.evaluate(&alice, &edit, Some(snapshot.as_ref()));
    assert_eq!(held, Decision::Allow);
    assert_eq!(evaluator.decide(&alice, &edit), Decision::Deny);
}

#[test]
fn test_evaluator_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PolicyEvaluator>();
    assert_send_sync::<PolicyStore>();
    assert_send_sync::<InMemoryGroups>();
}
