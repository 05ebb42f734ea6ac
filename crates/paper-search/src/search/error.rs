//! Error types for the search compiler.

use std::path::PathBuf;

use thiserror::Error;

/// A specialized Result type for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors raised when constructing a [`CountMatcher`](super::CountMatcher)
/// from malformed text.
///
/// Free-text search words never surface these; the term parser turns them
/// into warnings. They propagate only from programmatic construction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatcherError {
    /// The comparison operator is not recognized.
    #[error("invalid comparison operator in '{text}'")]
    InvalidOperator {
        /// The offending matcher text.
        text: String,
    },

    /// The operand is missing or not an integer.
    #[error("invalid comparison operand in '{text}'")]
    InvalidOperand {
        /// The offending matcher text.
        text: String,
    },

    /// A closed range whose lower bound exceeds its upper bound.
    #[error("invalid range {low}..{high}")]
    InvalidRange {
        /// Lower bound.
        low: i64,
        /// Upper bound.
        high: i64,
    },
}

impl MatcherError {
    /// Creates an invalid operator error.
    pub fn invalid_operator(text: impl Into<String>) -> Self {
        MatcherError::InvalidOperator { text: text.into() }
    }

    /// Creates an invalid operand error.
    pub fn invalid_operand(text: impl Into<String>) -> Self {
        MatcherError::InvalidOperand { text: text.into() }
    }
}

/// Signal that a term has no SQL form.
///
/// This is not a user-facing error: the compiler reacts by fetching a superset
/// of rows and evaluating the term in memory.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("search term cannot be expressed in SQL")]
pub struct SqlUnrepresentable;

/// Errors that can occur while loading settings or executing a compiled search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A matcher could not be constructed.
    #[error(transparent)]
    Matcher(#[from] MatcherError),

    /// The row source failed to fetch candidate rows.
    #[error("row fetch failed: {message}")]
    RowSource {
        /// Description from the storage collaborator.
        message: String,
    },

    /// Failed to determine the settings directory.
    #[error("failed to determine settings directory: no valid home directory found")]
    NoConfigDir,

    /// I/O error while reading the settings file.
    #[error("failed to read settings file '{path}': {source}")]
    ReadSettings {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error while writing the settings file.
    #[error("failed to write settings file '{path}': {source}")]
    WriteSettings {
        /// The path that failed to write.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`SearchSettings`](crate::settings::SearchSettings).
    #[error("invalid settings file '{path}': {source}")]
    ParseSettings {
        /// The path of the malformed file.
        path: PathBuf,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// The settings declare a schema version this crate does not understand.
    #[error("unsupported settings version {found} (expected at most {supported})")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
        /// Highest supported version.
        supported: u32,
    },
}

impl SearchError {
    /// Creates a row source error.
    pub fn row_source(message: impl Into<String>) -> Self {
        SearchError::RowSource {
            message: message.into(),
        }
    }
}
