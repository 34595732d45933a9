//! Command implementations.
//!
//! Each command returns its output as a string so `main` only prints.

use std::fmt::Write as _;

use pagegate_acl::{Identity, PageActions, PagePermission, Requester, Role};

use crate::error::{Error, Result};
use crate::policy::Policy;

/// Output of `lint`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LintReport {
    /// Human-readable report.
    pub text: String,
    /// Number of problems found.
    pub problems: usize,
}

impl LintReport {
    /// Whether no problems were found.
    pub fn is_clean(&self) -> bool {
        self.problems == 0
    }
}

/// Arguments for `check`.
#[derive(Clone, Debug, Default)]
pub struct CheckRequest {
    /// Requesting user; anonymous when absent.
    pub user: Option<String>,
    /// Roles held by the session.
    pub roles: Vec<String>,
    /// Page name.
    pub page: String,
    /// Comma-separated action list.
    pub action: String,
    /// Print the full verdict as JSON.
    pub json: bool,
}

/// Decides one request and renders the verdict.
pub fn check(policy: &Policy, request: &CheckRequest) -> Result<String> {
    let actions = PageActions::parse_list(&request.action)?;
    if actions.is_empty() {
        return Err(Error::policy("no action given"));
    }
    let requester = match &request.user {
        Some(name) => Requester::new(Identity::user(name.as_str())).with_role(Role::Authenticated),
        None => Requester::anonymous(),
    }
    .with_roles(request.roles.iter().map(|r| Role::named(r.as_str())));

    let capability = PagePermission::new(request.page.as_str(), actions);
    let verdict = policy.evaluator.explain(&requester, &capability);
    tracing::debug!(page = %request.page, verdict = %verdict, "checked request");

    if request.json {
        Ok(serde_json::to_string_pretty(&verdict)?)
    } else {
        Ok(verdict.to_string())
    }
}

/// Reports parse diagnostics, unresolved principals and unknown group
/// members.
pub fn lint(policy: &Policy) -> LintReport {
    let mut text = String::new();
    let mut problems = 0;

    for (page, parsed) in &policy.pages {
        for diagnostic in &parsed.diagnostics {
            let _ = writeln!(text, "{page}: {diagnostic}");
            problems += 1;
        }
        for principal in parsed.rules.unresolved() {
            let _ = writeln!(text, "{page}: unresolved principal '{principal}'");
            problems += 1;
        }
    }
    for (group, member) in &policy.unknown_members {
        let _ = writeln!(text, "group {group}: unknown member '{member}'");
        problems += 1;
    }

    if problems == 0 {
        text.push_str("no problems found\n");
    }
    LintReport { text, problems }
}

/// Prints a page's rules in directive form.
pub fn show(policy: &Policy, page: &str) -> Result<String> {
    let parsed = policy
        .page(page)
        .ok_or_else(|| Error::policy(format!("no rules for page '{page}'")))?;
    Ok(parsed.rules.to_string())
}
