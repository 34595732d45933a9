#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Pagegate ACL
//!
//! Page-level access control for wikis: identities, capabilities, ordered
//! rule lists, group resolution and first-match evaluation.

pub mod config;
pub mod directory;
pub mod error;
pub mod evaluator;
pub mod group;
pub mod identity;
pub mod parser;
pub mod permission;
pub mod rule;
pub mod rule_list;
pub mod store;

mod proptests;

// Re-exports for convenience
pub use config::AclConfig;
pub use directory::PrincipalDirectory;
pub use error::{Error, Result};
pub use evaluator::{Decision, PolicyEvaluator, Requester, RuleSource, Verdict};
pub use group::{Group, GroupResolver, InMemoryGroups};
pub use identity::{Identity, NameKind, PrincipalResolver, Role, UserPrincipal};
pub use parser::{Diagnostic, ParsedRules, parse_rules};
pub use permission::{
    Capability, PageActions, PagePermission, Permission, Target, WILDCARD, WikiActions,
    WikiPermission,
};
pub use rule::{Polarity, Rule};
pub use rule_list::RuleList;
pub use store::{DEFAULT_RESOURCE, PolicyStore};
