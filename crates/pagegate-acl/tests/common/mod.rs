//! Common test utilities and harness for pagegate-acl integration tests.

use std::sync::Arc;

use pagegate_acl::{
    Decision, Group, Identity, InMemoryGroups, PageActions, PagePermission, PolicyEvaluator,
    PolicyStore, PrincipalDirectory, Requester, parse_rules,
};

/// Test harness wiring a group store, a directory, a rule store and an
/// evaluator together.
pub struct TestHarness {
    /// Group store shared by the directory and the evaluator.
    pub groups: Arc<InMemoryGroups>,
    /// Name resolution for rule text.
    pub directory: PrincipalDirectory,
    /// The evaluator under test.
    pub evaluator: PolicyEvaluator,
}

impl TestHarness {
    /// Creates a harness knowing the given users and groups.
    pub fn new(users: &[&str], groups: Vec<Group>) -> Self {
        let groups = Arc::new(InMemoryGroups::from_groups(groups));
        let directory = PrincipalDirectory::new(groups.clone());
        let directory = directory.with_users(users.iter().copied());
        let evaluator = PolicyEvaluator::new(groups.clone(), Arc::new(PolicyStore::new()));
        Self {
            groups,
            directory,
            evaluator,
        }
    }

    /// Parses `source` for `page` and installs it, asserting it is clean.
    pub fn install(&self, page: &str, source: &str) {
        let parsed = parse_rules(page, source, &self.directory);
        assert!(parsed.is_clean(), "diagnostics: {:?}", parsed.diagnostics);
        self.evaluator.store().install(page, parsed.rules);
    }

    /// Parses `source` as the default list and installs it.
    pub fn install_default(&self, source: &str) {
        let parsed = parse_rules("*", source, &self.directory);
        assert!(parsed.is_clean(), "diagnostics: {:?}", parsed.diagnostics);
        self.evaluator.store().install_default(parsed.rules);
    }

    /// Decides `action` on `page` for the named user.
    pub fn decide(&self, user: &str, page: &str, action: PageActions) -> Decision {
        let requester = Requester::new(Identity::user(user));
        let permission = PagePermission::new(page, action);
        self.evaluator.decide(&requester, &permission)
    }
}

/// A group with user members.
pub fn group(name: &str, users: &[&str]) -> Group {
    Group::with_members(name, users.iter().map(|u| Identity::user(*u)))
}
