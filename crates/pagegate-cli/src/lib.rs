//! # pagegate-cli
//!
//! Diagnostic CLI for Pagegate access control policies.
//!
//! This crate loads a TOML policy file and provides:
//! - Access checks with an explanation of the deciding rule
//! - Linting of rule text, unresolved principals and group members
//! - Rule list rendering in directive form

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod commands;
pub mod error;
pub mod policy;

pub use error::{Error, Result};
pub use policy::{Policy, PolicyFile};
