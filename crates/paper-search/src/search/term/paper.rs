//! Paper id and submission status search words.

use serde::{Deserialize, Serialize};

use crate::record::{PaperRecord, Viewer};
use crate::search::condition::ConditionNode;
use crate::search::context::SearchContext;
use crate::search::matcher::CountMatcher;
use crate::search::query_info::{SearchQueryInfo, PAPER_ID_COLUMN};
use crate::search::warnings::SearchWarnings;

use super::SearchTerm;

/// Matches papers by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperIdTerm {
    matcher: CountMatcher,
}

impl PaperIdTerm {
    pub(crate) const TRIVIAL_RIGHTS: bool = true;

    /// Creates a paper id term.
    pub fn new(matcher: CountMatcher) -> Self {
        Self { matcher }
    }

    /// Returns the id matcher.
    pub fn matcher(&self) -> &CountMatcher {
        &self.matcher
    }

    /// Returns true if `text` is a paper id or `a-b` id range.
    pub(crate) fn looks_like_id(text: &str) -> bool {
        let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        match text.split_once('-') {
            Some((low, high)) => digits(low) && digits(high),
            None => digits(text),
        }
    }

    /// Parses a paper id, an `a-b` range, or a matcher such as `>100`.
    pub fn parse(
        value: &str,
        _context: &SearchContext<'_>,
        warnings: &mut SearchWarnings,
    ) -> SearchTerm {
        let value = value.trim();
        let parsed = match value.split_once('-') {
            Some((low, high)) if Self::looks_like_id(value) => {
                CountMatcher::parse(&format!("{low}..{high}"))
            }
            _ => CountMatcher::parse(value),
        };
        match parsed {
            Ok(matcher) => Self::new(matcher).into(),
            Err(err) => {
                warnings.push(value, format!("Bad paper id search: {err}."));
                SearchTerm::False
            }
        }
    }

    pub(crate) fn declare_columns(&self, info: &mut SearchQueryInfo) {
        info.add_column(PAPER_ID_COLUMN);
    }

    pub(crate) fn sql_fragment(&self) -> String {
        self.matcher.sql_fragment(PAPER_ID_COLUMN)
    }

    pub(crate) fn evaluate(&self, record: &dyn PaperRecord, _viewer: &dyn Viewer) -> bool {
        self.matcher.matches(record.paper_id())
    }

    pub(crate) fn compile_condition(&self) -> ConditionNode {
        ConditionNode::PaperId {
            matcher: self.matcher,
        }
    }
}

/// A submission status tested by `is:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperStatus {
    /// Withdrawn by the authors.
    Withdrawn,
    /// Submitted for review.
    Submitted,
    /// Not withdrawn.
    Active,
}

impl PaperStatus {
    /// Decodes an `is:` keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_lowercase().as_str() {
            "withdrawn" => Some(PaperStatus::Withdrawn),
            "submitted" => Some(PaperStatus::Submitted),
            "active" | "unwithdrawn" => Some(PaperStatus::Active),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            PaperStatus::Withdrawn | PaperStatus::Active => "timeWithdrawn",
            PaperStatus::Submitted => "timeSubmitted",
        }
    }

    /// Tests the status against a record.
    pub fn holds_for(self, record: &dyn PaperRecord) -> bool {
        match self {
            PaperStatus::Withdrawn => record.is_withdrawn(),
            PaperStatus::Submitted => record.is_submitted(),
            PaperStatus::Active => !record.is_withdrawn(),
        }
    }
}

/// Matches papers in a submission status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTerm {
    status: PaperStatus,
}

impl StatusTerm {
    pub(crate) const TRIVIAL_RIGHTS: bool = true;

    /// Creates a status term.
    pub fn new(status: PaperStatus) -> Self {
        Self { status }
    }

    /// Returns the tested status.
    pub fn status(&self) -> PaperStatus {
        self.status
    }

    /// Parses the value of an `is:` word.
    pub fn parse(
        value: &str,
        _context: &SearchContext<'_>,
        warnings: &mut SearchWarnings,
    ) -> SearchTerm {
        match PaperStatus::from_keyword(value.trim()) {
            Some(status) => Self::new(status).into(),
            None => {
                warnings.push(value, format!("Unknown paper status \"{}\".", value.trim()));
                SearchTerm::False
            }
        }
    }

    pub(crate) fn declare_columns(&self, info: &mut SearchQueryInfo) {
        info.add_column(format!("Paper.{}", self.status.column()));
    }

    pub(crate) fn sql_fragment(&self) -> String {
        match self.status {
            PaperStatus::Withdrawn => "timeWithdrawn > 0".to_string(),
            PaperStatus::Submitted => "timeSubmitted > 0".to_string(),
            PaperStatus::Active => "timeWithdrawn <= 0".to_string(),
        }
    }

    pub(crate) fn evaluate(&self, record: &dyn PaperRecord, _viewer: &dyn Viewer) -> bool {
        self.status.holds_for(record)
    }

    pub(crate) fn compile_condition(&self) -> ConditionNode {
        ConditionNode::Status {
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_id() {
        assert!(PaperIdTerm::looks_like_id("12"));
        assert!(PaperIdTerm::looks_like_id("3-9"));
        assert!(!PaperIdTerm::looks_like_id("3-"));
        assert!(!PaperIdTerm::looks_like_id("-3"));
        assert!(!PaperIdTerm::looks_like_id("x12"));
    }

    #[test]
    fn test_status_keywords() {
        assert_eq!(PaperStatus::from_keyword("Withdrawn"), Some(PaperStatus::Withdrawn));
        assert_eq!(PaperStatus::from_keyword("active"), Some(PaperStatus::Active));
        assert_eq!(PaperStatus::from_keyword("lost"), None);
    }
}
