//! Directive parsing.
//!
//! Rule text is one directive per line:
//!
//! ```text
//! [{ALLOW view,edit Alice, Janne Jalkanen}]
//! DENY delete Editors
//! ```
//!
//! The `[{ }]` wrapper is optional and keywords are case-insensitive.
//! Actions are a comma-separated list with no spaces; everything after them
//! is a comma-separated list of principal names, which may contain spaces.
//! Each principal gets its own [`Rule`], in the order written.
//!
//! Parsing never fails. Problems become [`Diagnostic`]s: an unknown action
//! is reported and the remaining actions still apply, a malformed directive
//! is reported and contributes nothing.

use std::fmt;

use crate::identity::PrincipalResolver;
use crate::permission::{PageActions, PagePermission, Target};
use crate::rule::{Polarity, Rule};
use crate::rule_list::RuleList;

/// A problem found in rule text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number.
    pub line: usize,
    /// What went wrong.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// The outcome of parsing one block of rule text.
#[derive(Clone, Debug, Default)]
pub struct ParsedRules {
    /// Rules in authored order.
    pub rules: RuleList,
    /// Problems found along the way.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedRules {
    /// Whether parsing found no problems.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Parses every directive in `source` into rules bound to `target`.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_rules(target: &str, source: &str, resolver: &dyn PrincipalResolver) -> ParsedRules {
    let target = Target::parse(target);
    let mut parsed = ParsedRules::default();

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let mut report = |message: String| parsed.diagnostics.push(Diagnostic { line, message });
        match parse_directive(text, &target, resolver, &mut report) {
            Ok(rules) => {
                for rule in rules {
                    parsed.rules.push(rule);
                }
            }
            Err(message) => report(message),
        }
    }

    for principal in parsed.rules.unresolved() {
        tracing::warn!(
            resource = %target,
            principal = %principal,
            "rule names an unknown principal"
        );
    }
    tracing::debug!(
        resource = %target,
        rules = parsed.rules.len(),
        diagnostics = parsed.diagnostics.len(),
        "parsed rule text"
    );
    parsed
}

/// Parses a single directive. Recoverable problems go to `report`; an
/// `Err` means the directive produced no rules.
fn parse_directive(
    text: &str,
    target: &Target,
    resolver: &dyn PrincipalResolver,
    report: &mut dyn FnMut(String),
) -> Result<Vec<Rule>, String> {
    let body = unwrap_brackets(text)?;

    let (keyword, rest) = split_word(body);
    let polarity = match keyword.to_ascii_uppercase().as_str() {
        "ALLOW" => Polarity::Allow,
        "DENY" => Polarity::Deny,
        _ => return Err(format!("expected ALLOW or DENY, found '{keyword}'")),
    };

    let (action_list, principal_list) = split_word(rest);
    if action_list.is_empty() {
        return Err(format!("{polarity} directive has no actions"));
    }
    let mut actions = PageActions::empty();
    let tokens = action_list.split(',').map(str::trim);
    for token in tokens.filter(|t| !t.is_empty()) {
        match PageActions::parse(token) {
            Some(flag) => actions |= flag,
            None => report(format!("unknown action '{token}'")),
        }
    }
    if actions.is_empty() {
        return Err(format!("{polarity} directive has no known actions"));
    }

    let names: Vec<&str> = principal_list
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return Err(format!("{polarity} directive names no principals"));
    }

    let capabilities = PagePermission::new(target.clone(), actions).split();
    Ok(names
        .into_iter()
        .map(|name| {
            let mut rule = Rule::for_principal(resolver.resolve(name));
            if polarity == Polarity::Deny {
                rule.set_denial();
            }
            for capability in &capabilities {
                rule.add_capability(capability.clone());
            }
            rule
        })
        .collect())
}

fn unwrap_brackets(text: &str) -> Result<&str, String> {
    match (text.strip_prefix("[{"), text.ends_with("}]")) {
        (Some(inner), true) => Ok(inner.strip_suffix("}]").unwrap_or(inner).trim()),
        (Some(_), false) => Err("unterminated '[{' directive".to_string()),
        (None, _) => Ok(text),
    }
}

/// Splits off the first whitespace-delimited word.
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(at) => (&text[..at], text[at..].trim()),
        None => (text, ""),
    }
}
