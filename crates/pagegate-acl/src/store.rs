//! Installed rule lists, keyed by resource name.
//!
//! Each resource holds an immutable `Arc<RuleList>` snapshot. Installing a
//! list replaces the snapshot wholesale; an evaluation that already holds
//! the old snapshot finishes against it.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::rule_list::RuleList;

/// Resource name used for the default rule list unless configured.
pub const DEFAULT_RESOURCE: &str = "Default";

/// Thread-safe map from resource name to its rule list.
#[derive(Debug)]
pub struct PolicyStore {
    lists: RwLock<HashMap<String, Arc<RuleList>>>,
    default_resource: String,
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyStore {
    /// Creates an empty store using [`DEFAULT_RESOURCE`] for the default
    /// list.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_resource(DEFAULT_RESOURCE)
    }

    /// Creates an empty store whose default list lives under `name`.
    pub fn with_default_resource(name: impl Into<String>) -> Self {
        Self {
            lists: RwLock::new(HashMap::new()),
            default_resource: name.into(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<RuleList>>> {
        self.lists.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<RuleList>>> {
        self.lists.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The resource name holding the default list.
    pub fn default_resource(&self) -> &str {
        &self.default_resource
    }

    /// Installs `rules` for `resource`, returning the replaced snapshot.
    pub fn install(&self, resource: impl Into<String>, rules: RuleList) -> Option<Arc<RuleList>> {
        let resource = resource.into();
        tracing::debug!(resource = %resource, rules = rules.len(), "installing rule list");
        self.write().insert(resource, Arc::new(rules))
    }

    /// Installs the default list.
    pub fn install_default(&self, rules: RuleList) -> Option<Arc<RuleList>> {
        let resource = self.default_resource.clone();
        self.install(resource, rules)
    }

    /// Drops the list for `resource`.
    pub fn remove(&self, resource: &str) -> Option<Arc<RuleList>> {
        self.write().remove(resource)
    }

    /// The current snapshot for `resource`.
    pub fn rules_for(&self, resource: &str) -> Option<Arc<RuleList>> {
        self.read().get(resource).cloned()
    }

    /// The current default list.
    pub fn default_rules(&self) -> Option<Arc<RuleList>> {
        self.rules_for(&self.default_resource)
    }

    /// Installed resource names, sorted.
    pub fn resources(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }
}
