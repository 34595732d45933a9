//! Integration tests.

mod concurrency;
mod groups;
mod scenarios;
