//! Engine configuration.
//!
//! ```toml
//! default_resource = "Default"
//! roles = ["Admin", "Reviewer"]
//! default_rules = """
//! ALLOW view All
//! ALLOW edit Authenticated
//! """
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identity::{PrincipalResolver, Role};
use crate::parser::{self, ParsedRules};
use crate::permission::WILDCARD;
use crate::store::DEFAULT_RESOURCE;

/// Settings for the policy engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AclConfig {
    /// Resource name holding the default rule list.
    pub default_resource: String,
    /// Deployment-defined role names the directory should recognise.
    pub roles: Vec<String>,
    /// Directive lines for the default rule list.
    pub default_rules: String,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            default_resource: DEFAULT_RESOURCE.to_string(),
            roles: Vec::new(),
            default_rules: String::new(),
        }
    }
}

impl AclConfig {
    /// Parses and validates TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse ACL config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), roles = config.roles.len(), "loaded ACL config");
        Ok(config)
    }

    /// Serializes back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Checks the settings for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.default_resource.trim().is_empty() {
            return Err(Error::config("default_resource must not be blank"));
        }
        if let Some(role) = self.roles.iter().find(|r| r.trim().is_empty()) {
            return Err(Error::config(format!("invalid role name '{role}'")));
        }
        if let Some(role) = self.roles.iter().find(|r| Role::builtin(r).is_some()) {
            return Err(Error::config(format!("'{role}' is a built-in role")));
        }
        Ok(())
    }

    /// Parses `default_rules` against every page.
    pub fn parse_default_rules(&self, resolver: &dyn PrincipalResolver) -> ParsedRules {
        parser::parse_rules(WILDCARD, &self.default_rules, resolver)
    }
}
