//! Name resolution for principals written in rule text.
//!
//! [`PrincipalDirectory`] is the stock [`PrincipalResolver`]. It checks, in
//! order: built-in roles, configured container roles, known groups, known
//! users. A name that matches none of them becomes
//! [`Identity::Unresolved`] and never grants anything.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::group::GroupResolver;
use crate::identity::{Identity, PrincipalResolver, Role};

/// Resolves principal names against roles, groups and users.
pub struct PrincipalDirectory {
    roles: BTreeSet<String>,
    users: BTreeSet<String>,
    groups: Arc<dyn GroupResolver>,
}

impl PrincipalDirectory {
    /// Creates a directory that knows only built-in roles and the groups in
    /// `groups`.
    pub fn new(groups: Arc<dyn GroupResolver>) -> Self {
        Self {
            roles: BTreeSet::new(),
            users: BTreeSet::new(),
            groups,
        }
    }

    /// Adds deployment-defined role names.
    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Adds known user names.
    #[must_use]
    pub fn with_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users.extend(users.into_iter().map(Into::into));
        self
    }

    /// Registers one more user name.
    pub fn add_user(&mut self, name: impl Into<String>) {
        self.users.insert(name.into());
    }

    /// Whether `name` is a known user.
    pub fn has_user(&self, name: &str) -> bool {
        self.users.contains(name)
    }
}

impl fmt::Debug for PrincipalDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrincipalDirectory")
            .field("roles", &self.roles)
            .field("users", &self.users)
            .finish_non_exhaustive()
    }
}

impl PrincipalResolver for PrincipalDirectory {
    fn resolve(&self, name: &str) -> Identity {
        let name = name.trim();
        if let Some(role) = Role::builtin(name) {
            return Identity::role(role);
        }
        if self.roles.contains(name) {
            return Identity::role(Role::named(name));
        }
        if self.groups.has_group(name) {
            return Identity::group(name);
        }
        if self.users.contains(name) {
            return Identity::user(name);
        }
        tracing::debug!(principal = name, "principal did not resolve");
        Identity::unresolved(name)
    }
}
