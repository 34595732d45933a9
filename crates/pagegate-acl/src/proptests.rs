//! Property-based tests for capabilities, rules and evaluation.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use crate::evaluator::{Decision, PolicyEvaluator, Requester};
    use crate::group::InMemoryGroups;
    use crate::identity::Identity;
    use crate::permission::{Capability, PageActions, PagePermission};
    use crate::rule::{Polarity, Rule};
    use crate::rule_list::RuleList;
    use crate::store::PolicyStore;
    use proptest::prelude::*;

    const USERS: [&str; 3] = ["Alice", "Bob", "Charlie"];

    fn actions() -> impl Strategy<Value = PageActions> {
        (1u8..128).prop_map(PageActions::from_bits_truncate)
    }

    fn permission() -> impl Strategy<Value = PagePermission> {
        (prop::sample::select(vec!["*", "Main", "Other"]), actions())
            .prop_map(|(target, actions)| PagePermission::new(target, actions))
    }

    fn rule() -> impl Strategy<Value = (usize, bool, PageActions)> {
        (0..USERS.len(), any::<bool>(), actions())
    }

    proptest! {
        #[test]
        fn test_implication_is_reflexive(p in permission()) {
            prop_assert!(p.implies(&p));
        }

        #[test]
        fn test_implication_is_transitive(a in permission(), b in permission(), c in permission()) {
            if a.implies(&b) && b.implies(&c) {
                prop_assert!(a.implies(&c));
            }
        }

        #[test]
        fn test_stored_capabilities_never_imply_each_other(
            caps in prop::collection::vec(permission(), 0..12),
        ) {
            let mut rule = Rule::for_principal(Identity::user("Alice"));
            for cap in &caps {
                rule.add_capability(cap.clone());
            }
            let stored: Vec<_> = rule.capabilities().collect();
            for (i, a) in stored.iter().enumerate() {
                for (j, b) in stored.iter().enumerate() {
                    if i != j {
                        prop_assert!(!a.implies(b));
                    }
                }
            }
            for cap in &caps {
                prop_assert!(rule.has_capability(cap));
            }
        }

        #[test]
        fn test_add_capability_is_idempotent(caps in prop::collection::vec(permission(), 1..8)) {
            let mut rule = Rule::new();
            for cap in &caps {
                rule.add_capability(cap.clone());
            }
            let before: Vec<_> = rule.capabilities().cloned().collect();
            for cap in &caps {
                prop_assert!(!rule.add_capability(cap.clone()));
            }
            let after: Vec<_> = rule.capabilities().cloned().collect();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn test_decision_is_first_match(
            specs in prop::collection::vec(rule(), 0..10),
            who in 0..USERS.len(),
            wanted in actions(),
        ) {
            let rules: RuleList = specs
                .iter()
                .map(|(user, deny, acts)| {
                    let principal = Identity::user(USERS[*user]);
                    let rule = if *deny { Rule::deny(principal) } else { Rule::allow(principal) };
                    rule.with_capability(PagePermission::new("Main", *acts))
                })
                .collect();
            let request = PagePermission::new("Main", wanted);
            let requester = Requester::new(Identity::user(USERS[who]));

            let expected = rules
                .iter()
                .find(|r| r.principal() == Some(requester.identity()) && r.has_capability(&request))
                .map_or(Decision::None, |r| Decision::from(r.polarity()));

            let groups = Arc::new(InMemoryGroups::new());
            let evaluator = PolicyEvaluator::new(groups, Arc::new(PolicyStore::new()));
            let decision = evaluator.evaluate(&requester, &request, Some(&rules));
            prop_assert_eq!(decision, expected);
        }

        #[test]
        fn test_polarity_roundtrip_through_decision(deny in any::<bool>()) {
            let polarity = if deny { Polarity::Deny } else { Polarity::Allow };
            prop_assert_eq!(Decision::from(polarity).to_string(), polarity.keyword());
        }
    }
}
