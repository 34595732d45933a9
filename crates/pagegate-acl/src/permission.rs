//! Capabilities and their implication order.
//!
//! A capability is a requested action bound to a target. Two families exist:
//!
//! | Type | Target | Actions |
//! |------|--------|---------|
//! | [`PagePermission`] | one page, or `*` | view, comment, edit, modify, upload, rename, delete |
//! | [`WikiPermission`] | one wiki, or `*` | createPages, createGroups, editPreferences, editProfile, login |
//!
//! Page rules only ever hold page permissions. The implication order is a
//! closure over the action hierarchy:
//!
//! ```text
//! delete ──► modify ──► edit ──► comment ──► view
//! rename ──────────────► edit       upload ──► view
//!            modify ──► upload
//! ```
//!
//! ```rust
//! use pagegate_acl::{Capability, PageActions, PagePermission};
//!
//! let edit = PagePermission::new("Main", PageActions::EDIT);
//! let comment = PagePermission::new("Main", PageActions::COMMENT);
//! assert!(edit.implies(&comment));
//! assert!(!comment.implies(&edit));
//!
//! // `*` covers every page, a page never covers `*`.
//! let any_view = PagePermission::new("*", PageActions::VIEW);
//! assert!(any_view.implies(&PagePermission::new("Other", PageActions::VIEW)));
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Target token that matches every page or wiki.
pub const WILDCARD: &str = "*";

// ============================================================================
// Capability trait
// ============================================================================

/// The implication contract the engine relies on.
///
/// Implementations must be reflexive (every capability implies itself) and
/// total: they answer for every pair without failing. Rules, rule lists and
/// the evaluator are generic over this trait; [`PagePermission`] is the
/// capability the wiki uses.
pub trait Capability: Clone + fmt::Debug {
    /// Whether holding `self` also grants `other`.
    fn implies(&self, other: &Self) -> bool;

    /// Whether the capability grants nothing at all. Rules never store
    /// such capabilities.
    fn is_empty(&self) -> bool {
        false
    }
}

// ============================================================================
// Targets
// ============================================================================

/// The resource a capability is bound to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Every resource (`*`).
    Any,
    /// Exactly one named resource.
    Named(String),
}

impl Target {
    /// Parses a target token; `*` becomes [`Target::Any`].
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if token == WILDCARD {
            Self::Any
        } else {
            Self::Named(token.to_string())
        }
    }

    /// Whether this target includes `other`.
    pub fn covers(&self, other: &Target) -> bool {
        match (self, other) {
            (Self::Any, _) => true,
            (Self::Named(_), Self::Any) => false,
            (Self::Named(mine), Self::Named(theirs)) => mine == theirs,
        }
    }

    /// The named resource, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Any => None,
            Self::Named(name) => Some(name),
        }
    }
}

impl From<&str> for Target {
    fn from(token: &str) -> Self {
        Self::parse(token)
    }
}

impl From<String> for Target {
    fn from(token: String) -> Self {
        Self::parse(&token)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(WILDCARD),
            Self::Named(name) => f.write_str(name),
        }
    }
}

// ============================================================================
// Page permissions
// ============================================================================

bitflags! {
    /// Actions on a wiki page.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PageActions: u8 {
        /// Read the page.
        const VIEW    = 0b0000_0001;
        /// Append comments.
        const COMMENT = 0b0000_0010;
        /// Change the page text.
        const EDIT    = 0b0000_0100;
        /// Edit plus attach files.
        const MODIFY  = 0b0000_1000;
        /// Attach files.
        const UPLOAD  = 0b0001_0000;
        /// Rename the page.
        const RENAME  = 0b0010_0000;
        /// Delete the page.
        const DELETE  = 0b0100_0000;
    }
}

impl PageActions {
    /// Action names in canonical order, paired with their flags.
    const NAMES: [(&'static str, Self); 7] = [
        ("view", Self::VIEW),
        ("comment", Self::COMMENT),
        ("edit", Self::EDIT),
        ("modify", Self::MODIFY),
        ("upload", Self::UPLOAD),
        ("rename", Self::RENAME),
        ("delete", Self::DELETE),
    ];

    /// Expands the set with every action it implies.
    #[must_use]
    pub fn implied(self) -> Self {
        let mut mask = self;
        if mask.contains(Self::DELETE) {
            mask |= Self::MODIFY;
        }
        if mask.contains(Self::RENAME) {
            mask |= Self::EDIT;
        }
        if mask.contains(Self::MODIFY) {
            mask |= Self::EDIT | Self::UPLOAD;
        }
        if mask.contains(Self::EDIT) {
            mask |= Self::COMMENT;
        }
        if mask.contains(Self::COMMENT) {
            mask |= Self::VIEW;
        }
        if mask.contains(Self::UPLOAD) {
            mask |= Self::VIEW;
        }
        mask
    }

    /// Parses one action token, case-insensitively.
    ///
    /// `create` is accepted as an alias of `edit`: creating a page is
    /// editing one that does not exist yet.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim().to_lowercase();
        if token == "create" {
            return Some(Self::EDIT);
        }
        Self::NAMES
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, flag)| *flag)
    }

    /// Parses a comma-separated action list, failing on the first unknown
    /// token.
    pub fn parse_list(list: &str) -> Result<Self> {
        list.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .try_fold(Self::empty(), |acc, token| {
                Self::parse(token)
                    .map(|flag| acc | flag)
                    .ok_or_else(|| Error::UnknownAction(token.to_string()))
            })
    }

    /// Lower-case names of the actions set, in canonical order.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }
}

impl fmt::Display for PageActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(","))
    }
}

/// Permission to perform actions on a page.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PagePermission {
    target: Target,
    actions: PageActions,
}

impl PagePermission {
    /// Creates a page permission.
    pub fn new(target: impl Into<Target>, actions: PageActions) -> Self {
        Self {
            target: target.into(),
            actions,
        }
    }

    /// The page this permission is bound to.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The actions as written, before implication.
    pub fn actions(&self) -> PageActions {
        self.actions
    }

    /// Splits into one permission per action, preserving canonical order.
    pub fn split(&self) -> Vec<PagePermission> {
        PageActions::NAMES
            .iter()
            .filter(|(_, flag)| self.actions.contains(*flag))
            .map(|(_, flag)| PagePermission::new(self.target.clone(), *flag))
            .collect()
    }
}

impl Capability for PagePermission {
    fn implies(&self, other: &Self) -> bool {
        self.target.covers(&other.target) && self.actions.implied().contains(other.actions)
    }

    fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Display for PagePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page:{}#{}", self.target, self.actions)
    }
}

// ============================================================================
// Wiki permissions
// ============================================================================

bitflags! {
    /// Wiki-wide actions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct WikiActions: u8 {
        /// Create new pages.
        const CREATE_PAGES     = 0b0000_0001;
        /// Create new groups.
        const CREATE_GROUPS    = 0b0000_0010;
        /// Edit session preferences.
        const EDIT_PREFERENCES = 0b0000_0100;
        /// Edit the user profile.
        const EDIT_PROFILE     = 0b0000_1000;
        /// Log in.
        const LOGIN            = 0b0001_0000;
    }
}

impl WikiActions {
    /// Expands the set with every action it implies.
    #[must_use]
    pub fn implied(self) -> Self {
        let mut mask = self;
        if mask.contains(Self::CREATE_GROUPS) {
            mask |= Self::CREATE_PAGES;
        }
        if mask.contains(Self::EDIT_PROFILE) {
            mask |= Self::EDIT_PREFERENCES;
        }
        mask
    }
}

/// Permission to perform wiki-wide actions.
///
/// Never granted by page rules.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WikiPermission {
    wiki: Target,
    actions: WikiActions,
}

impl WikiPermission {
    /// Creates a wiki permission.
    pub fn new(wiki: impl Into<Target>, actions: WikiActions) -> Self {
        Self {
            wiki: wiki.into(),
            actions,
        }
    }

    /// The wiki this permission is bound to.
    pub fn wiki(&self) -> &Target {
        &self.wiki
    }

    /// The actions as written, before implication.
    pub fn actions(&self) -> WikiActions {
        self.actions
    }
}

impl Capability for WikiPermission {
    fn implies(&self, other: &Self) -> bool {
        self.wiki.covers(&other.wiki) && self.actions.implied().contains(other.actions)
    }

    fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

// ============================================================================
// Permission
// ============================================================================

/// Any capability a caller might hand to a rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// A page permission.
    Page(PagePermission),
    /// A wiki permission.
    Wiki(WikiPermission),
}

impl Permission {
    /// The page permission, if this is one.
    pub fn as_page(&self) -> Option<&PagePermission> {
        match self {
            Self::Page(page) => Some(page),
            Self::Wiki(_) => None,
        }
    }
}

impl Capability for Permission {
    fn implies(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Page(mine), Self::Page(theirs)) => mine.implies(theirs),
            (Self::Wiki(mine), Self::Wiki(theirs)) => mine.implies(theirs),
            _ => false,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Page(page) => page.is_empty(),
            Self::Wiki(wiki) => wiki.is_empty(),
        }
    }
}

impl From<PagePermission> for Permission {
    fn from(permission: PagePermission) -> Self {
        Self::Page(permission)
    }
}

impl From<WikiPermission> for Permission {
    fn from(permission: WikiPermission) -> Self {
        Self::Wiki(permission)
    }
}

// ============================================================================
// Tests
// ============================================================================
