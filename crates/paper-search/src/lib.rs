//! Search-term compiler and evaluator for conference paper lists.
//!
//! This crate parses free-text paper searches into typed predicate trees that
//! can be compiled into one bulk SQL query, evaluated in memory under a
//! viewer's permissions, or exported as condition documents for clients.

pub mod record;
pub mod search;
pub mod settings;
