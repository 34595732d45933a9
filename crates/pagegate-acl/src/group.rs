//! Groups and group resolution.
//!
//! A [`Group`] answers direct membership only. Transitive membership
//! (groups nested in groups) is worked out by the evaluator through the
//! [`GroupResolver`] seam, which can be backed by memory, wiki pages or a
//! directory service.
//!
//! # Thread Safety
//!
//! [`InMemoryGroups`] keeps each group behind an `Arc` and replaces it
//! wholesale on change, so a concurrent reader sees either the old member
//! list or the new one.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Error, Result};
use crate::identity::Identity;

// ============================================================================
// Group
// ============================================================================

/// A named, ordered set of identities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    name: String,
    members: Vec<Identity>,
}

impl Group {
    /// Creates an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Creates a group with the given members, dropping repeats and
    /// unresolved placeholders.
    pub fn with_members(
        name: impl Into<String>,
        members: impl IntoIterator<Item = Identity>,
    ) -> Self {
        let mut group = Self::new(name);
        for member in members {
            group.add_member(member);
        }
        group
    }

    /// The group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The identity that names this group in rules.
    pub fn identity(&self) -> Identity {
        Identity::group(self.name.clone())
    }

    /// Members in insertion order.
    pub fn members(&self) -> &[Identity] {
        &self.members
    }

    /// Adds a member. Returns `false` for repeats and unresolved
    /// placeholders, which can never be members.
    pub fn add_member(&mut self, member: Identity) -> bool {
        if !member.is_resolved() || self.members.contains(&member) {
            return false;
        }
        self.members.push(member);
        true
    }

    /// Removes a member. Returns whether it was present.
    pub fn remove_member(&mut self, member: &Identity) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != member);
        self.members.len() != before
    }

    /// Direct membership.
    pub fn is_member(&self, identity: &Identity) -> bool {
        identity.is_resolved() && self.members.contains(identity)
    }

    /// Names of groups listed directly among the members.
    pub fn subgroups(&self) -> impl Iterator<Item = &str> {
        self.members.iter().filter_map(Identity::as_group)
    }

    /// Removes all members.
    pub fn clear(&mut self) {
        self.members.clear();
    }
}

// ============================================================================
// GroupResolver
// ============================================================================

/// Membership lookups the evaluator needs.
///
/// Every method answers for direct membership only and must not fail:
/// a backend that cannot answer returns `false` or an empty list.
pub trait GroupResolver: Send + Sync {
    /// Whether `identity` is listed directly in `group`.
    fn is_member(&self, group: &str, identity: &Identity) -> bool;

    /// Groups listed directly in `group`.
    fn subgroups(&self, group: &str) -> Vec<String>;

    /// Whether a group with this name exists.
    fn has_group(&self, group: &str) -> bool;

    /// Groups listing `identity` directly. Optional.
    fn groups_containing(&self, _identity: &Identity) -> Vec<String> {
        Vec::new()
    }
}

// ============================================================================
// InMemoryGroups
// ============================================================================

/// Thread-safe in-memory group store.
#[derive(Debug, Default)]
pub struct InMemoryGroups {
    groups: RwLock<BTreeMap<String, Arc<Group>>>,
}

impl InMemoryGroups {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `groups`. Later duplicates replace earlier
    /// ones.
    pub fn from_groups(groups: impl IntoIterator<Item = Group>) -> Self {
        let map = groups
            .into_iter()
            .map(|group| (group.name.clone(), Arc::new(group)))
            .collect();
        Self {
            groups: RwLock::new(map),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Arc<Group>>> {
        self.groups.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Arc<Group>>> {
        self.groups.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// A snapshot of the named group.
    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.read().get(name).cloned()
    }

    /// Group names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Inserts or replaces a group, returning the previous snapshot.
    pub fn insert(&self, group: Group) -> Option<Arc<Group>> {
        tracing::debug!(
            group = %group.name,
            members = group.members.len(),
            "storing group"
        );
        self.write().insert(group.name.clone(), Arc::new(group))
    }

    /// Creates a new empty group.
    pub fn create(&self, name: &str) -> Result<()> {
        let mut groups = self.write();
        if groups.contains_key(name) {
            return Err(Error::GroupExists(name.to_string()));
        }
        groups.insert(name.to_string(), Arc::new(Group::new(name)));
        Ok(())
    }

    /// Deletes a group, returning its last snapshot.
    pub fn remove(&self, name: &str) -> Option<Arc<Group>> {
        self.write().remove(name)
    }

    /// Renames a group.
    ///
    /// References to the old name inside other groups are left alone; they
    /// stop matching until updated, the same as a deleted group.
    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        let mut groups = self.write();
        if groups.contains_key(to) {
            return Err(Error::GroupExists(to.to_string()));
        }
        let old = groups
            .remove(from)
            .ok_or_else(|| Error::UnknownGroup(from.to_string()))?;
        let mut renamed = (*old).clone();
        renamed.name = to.to_string();
        groups.insert(to.to_string(), Arc::new(renamed));
        Ok(())
    }

    /// Adds a member to an existing group.
    pub fn add_member(&self, group: &str, member: Identity) -> Result<bool> {
        self.update(group, |g| g.add_member(member))
    }

    /// Removes a member from an existing group.
    pub fn remove_member(&self, group: &str, member: &Identity) -> Result<bool> {
        self.update(group, |g| g.remove_member(member))
    }

    fn update(&self, name: &str, change: impl FnOnce(&mut Group) -> bool) -> Result<bool> {
        let mut groups = self.write();
        let current = groups
            .get(name)
            .ok_or_else(|| Error::UnknownGroup(name.to_string()))?;
        let mut next = (**current).clone();
        let changed = change(&mut next);
        if changed {
            groups.insert(name.to_string(), Arc::new(next));
        }
        Ok(changed)
    }
}

impl GroupResolver for InMemoryGroups {
    fn is_member(&self, group: &str, identity: &Identity) -> bool {
        self.get(group).is_some_and(|g| g.is_member(identity))
    }

    fn subgroups(&self, group: &str) -> Vec<String> {
        self.get(group)
            .map(|g| g.subgroups().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn has_group(&self, group: &str) -> bool {
        self.read().contains_key(group)
    }

    fn groups_containing(&self, identity: &Identity) -> Vec<String> {
        self.read()
            .values()
            .filter(|g| g.is_member(identity))
            .map(|g| g.name.clone())
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
