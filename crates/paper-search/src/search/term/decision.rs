//! `dec:` search words.

use crate::record::{PaperRecord, Viewer};
use crate::search::condition::ConditionNode;
use crate::search::context::{LabelMatch, SearchContext};
use crate::search::matcher::{CompareOp, CountMatcher};
use crate::search::query_info::SearchQueryInfo;
use crate::search::warnings::SearchWarnings;

use super::SearchTerm;

/// Column holding the decision outcome code.
pub(crate) const OUTCOME_COLUMN: &str = "outcome";

/// Matches papers whose decision outcome satisfies a matcher.
///
/// Decision labels map to integer codes (`accept` → 1, `reject` → -1, 0 for
/// undecided). Visibility is checked in memory; the SQL form compares the raw
/// column and relies on the caller narrowing the candidate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionTerm {
    matcher: CountMatcher,
}

impl DecisionTerm {
    pub(crate) const TRIVIAL_RIGHTS: bool = false;

    /// Creates a decision term from a matcher over outcome codes.
    pub fn new(matcher: CountMatcher) -> Self {
        Self { matcher }
    }

    /// Returns the outcome matcher.
    pub fn matcher(&self) -> &CountMatcher {
        &self.matcher
    }

    /// Parses the value of a `dec:` word.
    ///
    /// Accepts a decision label or unambiguous prefix, `yes`, `no`, `any`,
    /// `none`, or a numeric matcher such as `>0` or `-1..1`. Anything else
    /// records a warning and yields [`SearchTerm::False`].
    pub fn parse(
        value: &str,
        context: &SearchContext<'_>,
        warnings: &mut SearchWarnings,
    ) -> SearchTerm {
        let value = value.trim();
        let decisions = context.decisions();

        if let Some(code) = decisions.exact(value) {
            return Self::new(CountMatcher::equals(code)).into();
        }

        let keyword = match value.to_lowercase().as_str() {
            "yes" => Some(CountMatcher::new(CompareOp::Gt, 0)),
            "no" => Some(CountMatcher::new(CompareOp::Lt, 0)),
            "any" => Some(CountMatcher::new(CompareOp::Ne, 0)),
            "none" | "pending" | "unknown" | "undecided" => Some(CountMatcher::equals(0)),
            _ => None,
        };
        if let Some(matcher) = keyword {
            return Self::new(matcher).into();
        }

        match decisions.resolve(value) {
            LabelMatch::Unique(code) => return Self::new(CountMatcher::equals(code)).into(),
            LabelMatch::Ambiguous(names) => {
                warnings.push(
                    value,
                    format!(
                        "Decision \"{}\" is ambiguous (could be {}).",
                        value,
                        names.join(", ")
                    ),
                );
                return SearchTerm::False;
            }
            LabelMatch::NotFound => {}
        }

        if value.starts_with(|c: char| !c.is_alphabetic()) {
            return match CountMatcher::parse(value) {
                Ok(matcher) => Self::new(matcher).into(),
                Err(err) => {
                    warnings.push(value, format!("Bad decision search: {err}."));
                    SearchTerm::False
                }
            };
        }

        let message = match decisions.suggest(value) {
            Some(suggestion) => {
                format!("Unknown decision \"{value}\". Did you mean \"{suggestion}\"?")
            }
            None => format!("Unknown decision \"{value}\"."),
        };
        warnings.push(value, message);
        SearchTerm::False
    }

    pub(crate) fn declare_columns(&self, info: &mut SearchQueryInfo) {
        info.add_column("Paper.outcome");
    }

    pub(crate) fn sql_fragment(&self) -> String {
        self.matcher.sql_fragment(OUTCOME_COLUMN)
    }

    /// A hidden decision never matches.
    pub(crate) fn evaluate(&self, record: &dyn PaperRecord, viewer: &dyn Viewer) -> bool {
        viewer.can_view_decision(record) && self.matcher.matches(record.outcome())
    }

    pub(crate) fn compile_condition(&self) -> ConditionNode {
        ConditionNode::Decision {
            matcher: self.matcher,
        }
    }
}
