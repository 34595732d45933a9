//! A single access-control statement.
//!
//! A [`Rule`] binds one principal to a set of page permissions with a
//! polarity. The principal is bound at most once; the capability set never
//! holds two members where one implies the other.
//!
//! ```rust
//! use pagegate_acl::{Identity, PageActions, PagePermission, Rule};
//!
//! let mut rule = Rule::for_principal(Identity::user("Bob"));
//! assert!(rule.add_capability(PagePermission::new("Main", PageActions::EDIT)));
//!
//! // Already implied by edit: rejected as redundant.
//! assert!(!rule.add_capability(PagePermission::new("Main", PageActions::VIEW)));
//! assert!(rule.has_capability(&PagePermission::new("Main", PageActions::COMMENT)));
//!
//! // The principal is write-once.
//! assert!(rule.set_principal(Identity::user("Mallory")).is_err());
//! assert_eq!(rule.to_string(), "ALLOW edit Bob");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::identity::{Identity, PrincipalResolver};
use crate::permission::{Capability, PageActions, PagePermission, Permission};

/// Whether a matching rule grants or refuses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Polarity {
    /// Grant the capability.
    #[default]
    Allow,
    /// Refuse the capability.
    Deny,
}

impl Polarity {
    /// The directive keyword for this polarity.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Deny => "DENY",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One principal, its capabilities, and a polarity.
///
/// Generic over the capability type; wiki pages use [`PagePermission`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule<C = PagePermission> {
    principal: Option<Identity>,
    capabilities: Vec<C>,
    polarity: Polarity,
}

impl<C> Default for Rule<C> {
    fn default() -> Self {
        Self {
            principal: None,
            capabilities: Vec::new(),
            polarity: Polarity::default(),
        }
    }
}

impl<C> Rule<C> {
    /// Creates an unbound, empty `ALLOW` rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an `ALLOW` rule bound to `principal`.
    ///
    /// The name is taken as given. Use
    /// [`try_for_principal`](Self::try_for_principal) to reject blank names.
    pub fn for_principal(principal: Identity) -> Self {
        Self {
            principal: Some(principal),
            ..Self::default()
        }
    }

    /// Creates an `ALLOW` rule bound to `principal`, with the same checks as
    /// [`set_principal`](Self::set_principal).
    pub fn try_for_principal(principal: Identity) -> Result<Self> {
        let mut rule = Self::new();
        rule.set_principal(principal)?;
        Ok(rule)
    }

    /// Shorthand for an `ALLOW` rule bound to `principal`.
    pub fn allow(principal: Identity) -> Self {
        Self::for_principal(principal)
    }

    /// Shorthand for a `DENY` rule bound to `principal`.
    pub fn deny(principal: Identity) -> Self {
        let mut rule = Self::for_principal(principal);
        rule.set_denial();
        rule
    }

    /// The bound principal, if any.
    pub fn principal(&self) -> Option<&Identity> {
        self.principal.as_ref()
    }

    /// Binds the principal.
    ///
    /// Fails without changing the rule when a principal is already bound or
    /// when `principal` has a blank name.
    pub fn set_principal(&mut self, principal: Identity) -> Result<()> {
        if let Some(bound) = &self.principal {
            return Err(Error::AlreadyBound(bound.name().to_string()));
        }
        if principal.name().trim().is_empty() {
            return Err(Error::InvalidIdentity(
                "principal name must not be blank".to_string(),
            ));
        }
        self.principal = Some(principal);
        Ok(())
    }

    /// Turns this into a `DENY` rule.
    pub fn set_denial(&mut self) {
        self.polarity = Polarity::Deny;
    }

    /// Whether this is a `DENY` rule.
    pub fn is_denial(&self) -> bool {
        self.polarity == Polarity::Deny
    }

    /// The rule's polarity.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Stored capabilities in insertion order. Each call starts afresh.
    pub fn capabilities(&self) -> std::slice::Iter<'_, C> {
        self.capabilities.iter()
    }

    /// Whether the rule holds no capabilities.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Replaces an unresolved principal using `resolver`.
    #[must_use]
    pub fn resolve_principal(mut self, resolver: &dyn PrincipalResolver) -> Self {
        self.principal = self.principal.map(|p| p.resolve(resolver));
        self
    }
}

impl<C: Capability> Rule<C> {
    /// Adds a capability, builder style. Rejected capabilities are ignored.
    #[must_use]
    pub fn with_capability(mut self, capability: C) -> Self {
        self.add_capability(capability);
        self
    }

    /// Stores a capability.
    ///
    /// Returns `false` and changes nothing when the capability grants
    /// nothing or is already implied by a stored member. Stored members
    /// implied by the new capability are dropped so only the stronger one
    /// remains.
    pub fn add_capability(&mut self, capability: C) -> bool {
        if capability.is_empty() || self.has_capability(&capability) {
            return false;
        }
        self.capabilities
            .retain(|existing| !capability.implies(existing));
        self.capabilities.push(capability);
        true
    }

    /// Removes every stored capability that implies `capability`.
    ///
    /// Returns whether anything was removed.
    pub fn remove_capability(&mut self, capability: &C) -> bool {
        let before = self.capabilities.len();
        self.capabilities
            .retain(|existing| !existing.implies(capability));
        self.capabilities.len() != before
    }

    /// Whether some stored capability implies `capability`.
    pub fn has_capability(&self, capability: &C) -> bool {
        self.capabilities
            .iter()
            .any(|existing| existing.implies(capability))
    }
}

impl Rule<PagePermission> {
    /// Stores a permission of any kind. Only page permissions are accepted;
    /// anything else returns `false`.
    pub fn add_permission(&mut self, permission: impl Into<Permission>) -> bool {
        match permission.into() {
            Permission::Page(page) => self.add_capability(page),
            Permission::Wiki(_) => false,
        }
    }

    fn action_summary(&self) -> PageActions {
        self.capabilities
            .iter()
            .fold(PageActions::empty(), |acc, cap| acc | cap.actions())
    }
}

impl fmt::Display for Rule<PagePermission> {
    /// Renders the rule in directive form, e.g. `DENY edit,view Charlie`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let principal = self.principal.as_ref().map_or("", Identity::name);
        let actions = self.action_summary();
        write!(f, "{} {actions} {principal}", self.polarity)
    }
}

// ============================================================================
// Tests
// ============================================================================
