//! Ordered rule lists.
//!
//! The position of a rule in its [`RuleList`] decides which rule answers a
//! request, so the list is append-only from the library's point of view and
//! is never sorted, deduplicated or otherwise reordered.

use std::fmt;

use crate::identity::{Identity, PrincipalResolver};
use crate::permission::{Capability, PagePermission};
use crate::rule::{Polarity, Rule};

/// The rules governing one resource, in authored order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleList<C = PagePermission> {
    rules: Vec<Rule<C>>,
}

impl<C> Default for RuleList<C> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<C: Capability> RuleList<C> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule after every existing rule.
    pub fn push(&mut self, rule: Rule<C>) {
        self.rules.push(rule);
    }

    /// Appends a rule, builder style.
    #[must_use]
    pub fn with_rule(mut self, rule: Rule<C>) -> Self {
        self.push(rule);
        self
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the list holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rule at `index`.
    pub fn get(&self, index: usize) -> Option<&Rule<C>> {
        self.rules.get(index)
    }

    /// Rules in authored order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule<C>> {
        self.rules.iter()
    }

    /// Rules bound to `principal`, in order.
    pub fn rules_for<'a>(&'a self, principal: &'a Identity) -> impl Iterator<Item = &'a Rule<C>> {
        self.rules
            .iter()
            .filter(move |rule| rule.principal() == Some(principal))
    }

    /// Removes every rule bound to `principal`, keeping the others in
    /// order. Returns how many were removed.
    pub fn remove_rules_for(&mut self, principal: &Identity) -> usize {
        let before = self.rules.len();
        self.rules
            .retain(|rule| rule.principal() != Some(principal));
        before - self.rules.len()
    }

    /// Principals of rules with `polarity` that cover `capability`, in rule
    /// order and without repeats.
    ///
    /// This ignores rule ordering between polarities; it answers "who is
    /// named for this", not "who would be allowed".
    pub fn principals_with(&self, capability: &C, polarity: Polarity) -> Vec<&Identity> {
        let mut principals: Vec<&Identity> = Vec::new();
        for rule in &self.rules {
            let Some(principal) = rule.principal() else {
                continue;
            };
            let covers = rule.polarity() == polarity && rule.has_capability(capability);
            if covers && !principals.contains(&principal) {
                principals.push(principal);
            }
        }
        principals
    }

    /// Principals still waiting for reconciliation.
    pub fn unresolved(&self) -> Vec<&Identity> {
        self.rules
            .iter()
            .filter_map(|rule| rule.principal())
            .filter(|principal| !principal.is_resolved())
            .collect()
    }

    /// A copy of this list with every unresolved principal passed through
    /// `resolver`. Rule order is preserved.
    #[must_use]
    pub fn reconcile(&self, resolver: &dyn PrincipalResolver) -> Self {
        self.rules
            .iter()
            .cloned()
            .map(|rule| rule.resolve_principal(resolver))
            .collect()
    }
}

impl<C> FromIterator<Rule<C>> for RuleList<C> {
    fn from_iter<I: IntoIterator<Item = Rule<C>>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl<'a, C> IntoIterator for &'a RuleList<C> {
    type Item = &'a Rule<C>;
    type IntoIter = std::slice::Iter<'a, Rule<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl fmt::Display for RuleList {
    /// One `[{...}]` directive per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "[{{{rule}}}]")?;
        }
        Ok(())
    }
}
