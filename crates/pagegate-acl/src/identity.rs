//! Security subjects.
//!
//! An [`Identity`] is anything a rule can name: a user, a built-in or
//! container role, a group, or a name that could not be matched to any of
//! these when the rule was parsed.
//!
//! ```rust
//! use pagegate_acl::{Identity, NameKind, Role};
//!
//! // Provenance annotations never change who the subject is.
//! let login = Identity::user("alice");
//! let display = Identity::user_with_kind("alice", NameKind::FullName);
//! assert_eq!(login, display);
//!
//! // Variants never compare equal, even with the same name.
//! assert_ne!(Identity::user("Admin"), Identity::role(Role::named("Admin")));
//! assert_ne!(Identity::unresolved("alice"), login);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

// ============================================================================
// UserPrincipal
// ============================================================================

/// Where a user name came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameKind {
    /// The name typed at login.
    #[default]
    LoginName,
    /// The user's full display name.
    FullName,
    /// The user's wiki page name.
    WikiName,
    /// Unknown provenance.
    Unspecified,
}

/// A resolved user.
///
/// Equality, ordering and hashing consider the name only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserPrincipal {
    name: String,
    #[serde(default)]
    kind: NameKind,
}

impl UserPrincipal {
    /// Creates a user principal with [`NameKind::LoginName`].
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, NameKind::default())
    }

    /// Creates a user principal with an explicit name kind.
    pub fn with_kind(name: impl Into<String>, kind: NameKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// The user name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the name came from.
    pub fn kind(&self) -> NameKind {
        self.kind
    }
}

impl PartialEq for UserPrincipal {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for UserPrincipal {}

impl Hash for UserPrincipal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for UserPrincipal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UserPrincipal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

// ============================================================================
// Role
// ============================================================================

/// A session-derived role.
///
/// The authentication layer decides which roles a request holds; the engine
/// only reads them. [`Role::All`] is held by every request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Every request, authenticated or not.
    All,
    /// Requests with no established identity.
    Anonymous,
    /// Requests carrying an asserted (cookie) identity.
    Asserted,
    /// Requests that logged in.
    Authenticated,
    /// A container or deployment-defined role.
    Named(String),
}

impl Role {
    /// Names of the built-in roles, in declaration order.
    pub const BUILTIN_NAMES: [&'static str; 4] = ["All", "Anonymous", "Asserted", "Authenticated"];

    /// Creates a deployment-defined role, mapping built-in names to their
    /// built-in variant.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::builtin(&name).unwrap_or(Self::Named(name))
    }

    /// Looks up a built-in role by its exact name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "All" => Some(Self::All),
            "Anonymous" => Some(Self::Anonymous),
            "Asserted" => Some(Self::Asserted),
            "Authenticated" => Some(Self::Authenticated),
            _ => None,
        }
    }

    /// The role name.
    pub fn name(&self) -> &str {
        match self {
            Self::All => "All",
            Self::Anonymous => "Anonymous",
            Self::Asserted => "Asserted",
            Self::Authenticated => "Authenticated",
            Self::Named(name) => name,
        }
    }

    /// Whether this is one of the fixed roles.
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Named(_))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Any named security subject.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identity {
    /// A resolved user.
    User(UserPrincipal),
    /// A role.
    Role(Role),
    /// A group, by name. Members live in the group store.
    Group(String),
    /// A name that matched nothing when the rule was built. Never matches
    /// a requester and is never a group member.
    Unresolved(String),
}

impl Identity {
    /// A user identity with a login name.
    pub fn user(name: impl Into<String>) -> Self {
        Self::User(UserPrincipal::new(name))
    }

    /// A user identity with an explicit name kind.
    pub fn user_with_kind(name: impl Into<String>, kind: NameKind) -> Self {
        Self::User(UserPrincipal::with_kind(name, kind))
    }

    /// A role identity.
    pub fn role(role: Role) -> Self {
        Self::Role(role)
    }

    /// A group identity.
    pub fn group(name: impl Into<String>) -> Self {
        Self::Group(name.into())
    }

    /// An unresolved placeholder.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::Unresolved(name.into())
    }

    /// The identity name, regardless of variant.
    pub fn name(&self) -> &str {
        match self {
            Self::User(user) => user.name(),
            Self::Role(role) => role.name(),
            Self::Group(name) | Self::Unresolved(name) => name,
        }
    }

    /// Whether the identity participates in matching.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved(_))
    }

    /// Whether this identity names a group.
    pub fn as_group(&self) -> Option<&str> {
        match self {
            Self::Group(name) => Some(name),
            _ => None,
        }
    }

    /// Replaces an unresolved placeholder with whatever `resolver` now
    /// answers for its name. Resolved identities are returned unchanged.
    pub fn resolve(self, resolver: &dyn PrincipalResolver) -> Self {
        match self {
            Self::Unresolved(name) => resolver.resolve(&name),
            resolved => resolved,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Role> for Identity {
    fn from(role: Role) -> Self {
        Self::Role(role)
    }
}

impl From<UserPrincipal> for Identity {
    fn from(user: UserPrincipal) -> Self {
        Self::User(user)
    }
}

// ============================================================================
// PrincipalResolver
// ============================================================================

/// Maps a principal name written in rule text to an [`Identity`].
///
/// Implementations return [`Identity::Unresolved`] for names they cannot
/// match; they never fail.
pub trait PrincipalResolver: Send + Sync {
    /// Resolve `name` to an identity.
    fn resolve(&self, name: &str) -> Identity;
}

// ============================================================================
// Tests
// ============================================================================
