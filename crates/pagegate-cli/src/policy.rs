//! Policy files.
//!
//! A policy file describes a small wiki in TOML: engine settings, known
//! users, groups, and the rule text of each page.
//!
//! ```toml
//! users = ["Alice", "Bob", "Charlie"]
//!
//! [acl]
//! roles = ["Admin"]
//! default_rules = "ALLOW view All"
//!
//! [[groups]]
//! name = "Editors"
//! members = ["Alice", "Bob"]
//!
//! [pages]
//! Main = """
//! ALLOW edit Editors
//! DENY view Charlie
//! """
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use pagegate_acl::{
    AclConfig, Group, Identity, InMemoryGroups, ParsedRules, PolicyEvaluator, PolicyStore,
    PrincipalDirectory, PrincipalResolver, parse_rules,
};
use serde::Deserialize;

use crate::error::{Error, Result};

/// One `[[groups]]` entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    /// Group name.
    pub name: String,
    /// Member names: users, roles or other groups.
    #[serde(default)]
    pub members: Vec<String>,
}

/// The policy file as written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyFile {
    /// Engine settings.
    pub acl: AclConfig,
    /// Known user names.
    pub users: Vec<String>,
    /// Groups and their members.
    pub groups: Vec<GroupSpec>,
    /// Rule text per page.
    pub pages: BTreeMap<String, String>,
}

impl PolicyFile {
    /// Parses a policy file from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: Self = toml::from_str(content)
            .map_err(|e| Error::policy(format!("Failed to parse policy: {e}")))?;
        file.acl.validate()?;
        Ok(file)
    }

    /// Reads a policy file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| pagegate_acl::Error::io_with_path(e, path))?;
        Self::from_toml_str(&content)
    }
}

/// A loaded policy, ready to answer requests.
#[derive(Debug)]
pub struct Policy {
    /// Groups built from the file.
    pub groups: Arc<InMemoryGroups>,
    /// Evaluator over the installed pages.
    pub evaluator: PolicyEvaluator,
    /// Parse results per page, default list included.
    pub pages: BTreeMap<String, ParsedRules>,
    /// Group members that did not resolve, as `(group, member)`.
    pub unknown_members: Vec<(String, String)>,
}

impl Policy {
    /// Builds groups, resolves names, parses every page and installs the
    /// results.
    pub fn build(file: &PolicyFile) -> Self {
        let empty_groups = file.groups.iter().map(|spec| Group::new(spec.name.clone()));
        let groups = Arc::new(InMemoryGroups::from_groups(empty_groups));
        let directory = PrincipalDirectory::new(groups.clone())
            .with_roles(file.acl.roles.iter().cloned())
            .with_users(file.users.iter().cloned());

        let mut unknown_members = Vec::new();
        for spec in &file.groups {
            let members = spec.members.iter().filter_map(|name| {
                let identity = directory.resolve(name);
                if identity.is_resolved() {
                    Some(identity)
                } else {
                    unknown_members.push((spec.name.clone(), name.clone()));
                    None
                }
            });
            let members: Vec<Identity> = members.collect();
            groups.insert(Group::with_members(spec.name.clone(), members));
        }

        let store = Arc::new(PolicyStore::with_default_resource(
            file.acl.default_resource.clone(),
        ));
        let mut pages = BTreeMap::new();

        let defaults = file.acl.parse_default_rules(&directory);
        store.install_default(defaults.rules.clone());
        pages.insert(file.acl.default_resource.clone(), defaults);

        for (page, source) in &file.pages {
            let parsed = parse_rules(page, source, &directory);
            store.install(page.clone(), parsed.rules.clone());
            pages.insert(page.clone(), parsed);
        }

        tracing::info!(
            pages = pages.len(),
            groups = file.groups.len(),
            users = file.users.len(),
            "policy loaded"
        );
        let evaluator = PolicyEvaluator::new(groups.clone(), store);
        Self {
            groups,
            evaluator,
            pages,
            unknown_members,
        }
    }

    /// Loads and builds a policy file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::build(&PolicyFile::load(path)?))
    }

    /// Parse results for `page`.
    pub fn page(&self, page: &str) -> Option<&ParsedRules> {
        self.pages.get(page)
    }
}
