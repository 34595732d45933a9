//! Access decisions.
//!
//! [`PolicyEvaluator`] answers ALLOW, DENY or NONE for a requester and a page
//! capability. The first rule (in authored order) whose principal the
//! requester matches and whose capabilities imply the request decides; later
//! rules are never consulted, whatever their polarity. When the page has no
//! rules at all, the default rule list is consulted the same way.
//!
//! ```rust
//! use std::sync::Arc;
//! use pagegate_acl::{
//!     Decision, Identity, InMemoryGroups, PageActions, PagePermission, PolicyEvaluator,
//!     PolicyStore, Requester, Rule, RuleList,
//! };
//!
//! let edit = PagePermission::new("Main", PageActions::EDIT);
//! let view = PagePermission::new("Main", PageActions::VIEW);
//!
//! let store = Arc::new(PolicyStore::new());
//! store.install(
//!     "Main",
//!     RuleList::new()
//!         .with_rule(Rule::deny(Identity::user("Charlie")).with_capability(edit))
//!         .with_rule(Rule::allow(Identity::user("Charlie")).with_capability(view.clone())),
//! );
//!
//! let evaluator = PolicyEvaluator::new(Arc::new(InMemoryGroups::new()), store);
//! let charlie = Requester::new(Identity::user("Charlie"));
//!
//! assert_eq!(evaluator.decide(&charlie, &view), Decision::Deny);
//! ```
//!
//! The last line is `Deny` because the `DENY edit` rule comes first and
//! `edit` implies `view`.
//!
//! Group rules match when the requester's identity, or any role the session
//! holds, is listed in the group or in one of its nested groups.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::group::GroupResolver;
use crate::identity::{Identity, Role};
use crate::permission::{Capability, PagePermission};
use crate::rule::{Polarity, Rule};
use crate::rule_list::RuleList;
use crate::store::PolicyStore;

// ============================================================================
// Decision
// ============================================================================

/// The outcome of an evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// A matching `ALLOW` rule came first.
    Allow,
    /// A matching `DENY` rule came first.
    Deny,
    /// No rule matched. Callers treat this as not allowed.
    None,
}

impl Decision {
    /// Whether the request is granted.
    pub fn is_allowed(self) -> bool {
        self == Self::Allow
    }
}

impl From<Polarity> for Decision {
    fn from(polarity: Polarity) -> Self {
        match polarity {
            Polarity::Allow => Self::Allow,
            Polarity::Deny => Self::Deny,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Allow => "ALLOW",
            Self::Deny => "DENY",
            Self::None => "NONE",
        })
    }
}

// ============================================================================
// Requester
// ============================================================================

/// The subject of a request: who they are and which roles the session holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requester {
    identity: Identity,
    roles: Vec<Role>,
}

impl Requester {
    /// A requester holding no roles beyond [`Role::All`].
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            roles: Vec::new(),
        }
    }

    /// An anonymous requester.
    pub fn anonymous() -> Self {
        let identity = Identity::role(Role::Anonymous);
        Self::new(identity).with_role(Role::Anonymous)
    }

    /// Adds a held role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
        self
    }

    /// Adds several held roles.
    #[must_use]
    pub fn with_roles(self, roles: impl IntoIterator<Item = Role>) -> Self {
        roles.into_iter().fold(self, Self::with_role)
    }

    /// The requester's identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Roles explicitly granted to the session.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Whether the session holds `role`. Everyone holds [`Role::All`].
    pub fn holds(&self, role: &Role) -> bool {
        *role == Role::All || self.roles.contains(role)
    }

    /// Every identity a group may list for this requester: the requester's
    /// own identity, then [`Role::All`], then each held role.
    pub fn subjects(&self) -> Vec<Identity> {
        let mut subjects = Vec::new();
        if self.identity.is_resolved() {
            subjects.push(self.identity.clone());
        }
        let held = std::iter::once(&Role::All).chain(&self.roles);
        for role in held {
            let subject = Identity::role(role.clone());
            if !subjects.contains(&subject) {
                subjects.push(subject);
            }
        }
        subjects
    }
}

// ============================================================================
// Verdict
// ============================================================================

/// Which list produced a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSource {
    /// The page's own rule list.
    Resource,
    /// The default rule list.
    Default,
}

/// A decision with the rule that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// The outcome.
    pub decision: Decision,
    /// Which list was consulted. `None` when neither list had rules.
    pub source: Option<RuleSource>,
    /// Position of the deciding rule in that list.
    pub rule_index: Option<usize>,
    /// The deciding rule's principal.
    pub matched_principal: Option<Identity>,
}

impl Verdict {
    fn none(source: Option<RuleSource>) -> Self {
        Self {
            decision: Decision::None,
            source,
            rule_index: None,
            matched_principal: None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.decision)?;
        if let (Some(index), Some(principal)) = (self.rule_index, &self.matched_principal) {
            let list = match self.source {
                Some(RuleSource::Default) => "default",
                _ => "page",
            };
            let nth = index + 1;
            write!(f, " (rule {nth} of {list} list, principal {principal})")?;
        }
        Ok(())
    }
}

// ============================================================================
// Group membership
// ============================================================================

/// Transitive group membership for one requester, memoised for the length
/// of a single evaluation.
struct Membership<'a> {
    groups: &'a dyn GroupResolver,
    subjects: Vec<Identity>,
    known: HashMap<String, bool>,
    cycles: Vec<(String, String)>,
}

impl<'a> Membership<'a> {
    fn new(groups: &'a dyn GroupResolver, requester: &Requester) -> Self {
        Self {
            groups,
            subjects: requester.subjects(),
            known: HashMap::new(),
            cycles: Vec::new(),
        }
    }

    fn contains(&mut self, group: &str) -> bool {
        if let Some(&answer) = self.known.get(group) {
            return answer;
        }
        let answer = self.search(group);
        self.known.insert(group.to_string(), answer);
        answer
    }

    /// Breadth-first walk down `root` and its subgroups.
    fn search(&mut self, root: &str) -> bool {
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        visited.insert(root.to_string());
        queue.push_back(root.to_string());

        while let Some(group) = queue.pop_front() {
            if self.known.get(&group) == Some(&true) || self.lists_subject(&group) {
                return true;
            }
            for sub in self.groups.subgroups(&group) {
                if visited.insert(sub.clone()) {
                    queue.push_back(sub);
                } else if self.reaches(&sub, &group) {
                    self.record_cycle(sub, group.clone());
                }
            }
        }
        false
    }

    fn lists_subject(&self, group: &str) -> bool {
        self.subjects
            .iter()
            .any(|subject| self.groups.is_member(group, subject))
    }

    /// Whether `to` is `from` or nested somewhere below it.
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        queue.push_back(from.to_string());

        while let Some(group) = queue.pop_front() {
            if group == to {
                return true;
            }
            for sub in self.groups.subgroups(&group) {
                if visited.insert(sub.clone()) {
                    queue.push_back(sub);
                }
            }
        }
        false
    }

    fn record_cycle(&mut self, group: String, via: String) {
        let edge = (group, via);
        if self.cycles.contains(&edge) {
            return;
        }
        tracing::warn!(
            group = %edge.0,
            via = %edge.1,
            "group nesting forms a cycle"
        );
        self.cycles.push(edge);
    }
}

// ============================================================================
// PolicyEvaluator
// ============================================================================

/// Decides access using installed rule lists and a group resolver.
#[derive(Clone)]
pub struct PolicyEvaluator {
    groups: Arc<dyn GroupResolver>,
    store: Arc<PolicyStore>,
}

impl fmt::Debug for PolicyEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyEvaluator")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl PolicyEvaluator {
    /// Creates an evaluator over `store`, resolving groups with `groups`.
    pub fn new(groups: Arc<dyn GroupResolver>, store: Arc<PolicyStore>) -> Self {
        Self { groups, store }
    }

    /// The rule store.
    pub fn store(&self) -> &Arc<PolicyStore> {
        &self.store
    }

    /// Decides `capability` for `requester`, using the rules installed for
    /// the capability's page.
    pub fn decide(&self, requester: &Requester, capability: &PagePermission) -> Decision {
        self.explain(requester, capability).decision
    }

    /// Whether `decide` answers [`Decision::Allow`].
    pub fn is_allowed(&self, requester: &Requester, capability: &PagePermission) -> bool {
        self.decide(requester, capability).is_allowed()
    }

    /// Like [`decide`](Self::decide), also reporting the deciding rule.
    pub fn explain(&self, requester: &Requester, capability: &PagePermission) -> Verdict {
        let rules = capability
            .target()
            .name()
            .and_then(|page| self.store.rules_for(page));
        self.explain_with(requester, capability, rules.as_deref())
    }

    /// Decides `capability` against an explicitly supplied rule list, with
    /// the installed default list as fallback when `rules` is absent or
    /// empty.
    pub fn evaluate(
        &self,
        requester: &Requester,
        capability: &PagePermission,
        rules: Option<&RuleList>,
    ) -> Decision {
        self.explain_with(requester, capability, rules).decision
    }

    /// Like [`evaluate`](Self::evaluate), also reporting the deciding rule.
    pub fn explain_with(
        &self,
        requester: &Requester,
        capability: &PagePermission,
        rules: Option<&RuleList>,
    ) -> Verdict {
        let default = self.store.default_rules();
        let fallback = default.as_deref();
        self.first_match(requester, capability, rules, fallback)
    }

    /// First-match evaluation for any capability type.
    ///
    /// `rules` decides when it holds at least one rule; otherwise `default`
    /// is scanned the same way. When neither has rules the decision is
    /// [`Decision::None`].
    pub fn first_match<C: Capability>(
        &self,
        requester: &Requester,
        capability: &C,
        rules: Option<&RuleList<C>>,
        default: Option<&RuleList<C>>,
    ) -> Verdict {
        let chosen = match (rules, default) {
            (Some(list), _) if !list.is_empty() => Some((list, RuleSource::Resource)),
            (_, Some(list)) if !list.is_empty() => Some((list, RuleSource::Default)),
            _ => None,
        };

        let verdict = match chosen {
            Some((list, source)) => {
                let mut membership = Membership::new(self.groups.as_ref(), requester);
                Self::scan(list, source, requester, capability, &mut membership)
            }
            None => Verdict::none(None),
        };

        tracing::debug!(
            requester = %requester.identity(),
            capability = ?capability,
            decision = %verdict.decision,
            rule = ?verdict.rule_index,
            "access decision"
        );
        verdict
    }

    fn scan<C: Capability>(
        rules: &RuleList<C>,
        source: RuleSource,
        requester: &Requester,
        capability: &C,
        membership: &mut Membership<'_>,
    ) -> Verdict {
        for (index, rule) in rules.iter().enumerate() {
            let Some(principal) = rule.principal() else {
                tracing::trace!(index, "skipping unbound rule");
                continue;
            };
            if !rule.has_capability(capability) {
                continue;
            }
            let matched = Self::matches(principal, requester, membership);
            tracing::trace!(index, principal = %principal, matched, "rule covers capability");
            if matched {
                return Self::decided(rule, principal, source, index);
            }
        }
        Verdict::none(Some(source))
    }

    fn decided<C: Capability>(
        rule: &Rule<C>,
        principal: &Identity,
        source: RuleSource,
        index: usize,
    ) -> Verdict {
        Verdict {
            decision: rule.polarity().into(),
            source: Some(source),
            rule_index: Some(index),
            matched_principal: Some(principal.clone()),
        }
    }

    fn matches(
        principal: &Identity,
        requester: &Requester,
        membership: &mut Membership<'_>,
    ) -> bool {
        match principal {
            Identity::Unresolved(name) => {
                tracing::debug!(principal = %name, "skipping unresolved principal");
                false
            }
            Identity::User(_) => principal == requester.identity(),
            Identity::Role(role) => requester.holds(role) || principal == requester.identity(),
            Identity::Group(group) => membership.contains(group),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
