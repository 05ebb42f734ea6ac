//! Review-derived search words: `re:` counts and `round:` membership.

use crate::record::{PaperRecord, Viewer};
use crate::search::condition::ConditionNode;
use crate::search::context::{LabelMatch, SearchContext};
use crate::search::matcher::CountMatcher;
use crate::search::query_info::{Join, SearchQueryInfo};
use crate::search::warnings::SearchWarnings;

use super::SearchTerm;

/// Matches papers whose review count satisfies a matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewCountTerm {
    matcher: CountMatcher,
}

impl ReviewCountTerm {
    pub(crate) const TRIVIAL_RIGHTS: bool = false;

    /// Creates a review count term.
    pub fn new(matcher: CountMatcher) -> Self {
        Self { matcher }
    }

    /// Returns the count matcher.
    pub fn matcher(&self) -> &CountMatcher {
        &self.matcher
    }

    /// Parses the value of a `re:` word, e.g. `>=3` or `1..2`.
    pub fn parse(
        value: &str,
        _context: &SearchContext<'_>,
        warnings: &mut SearchWarnings,
    ) -> SearchTerm {
        match CountMatcher::parse(value) {
            Ok(matcher) => Self::new(matcher).into(),
            Err(err) => {
                warnings.push(value, format!("Bad review count search: {err}."));
                SearchTerm::False
            }
        }
    }

    /// Rows carry the round list; the count is its length.
    pub(crate) fn declare_columns(&self, info: &mut SearchQueryInfo) {
        info.add_join(Join::Reviews);
        info.add_column("PaperReviews.reviewCount");
        info.add_column("PaperReviews.reviewRounds");
    }

    pub(crate) fn sql_fragment(&self) -> String {
        self.matcher.sql_fragment(
            "(select count(*) from PaperReview where PaperReview.paperId = Paper.paperId)",
        )
    }

    pub(crate) fn evaluate(&self, record: &dyn PaperRecord, viewer: &dyn Viewer) -> bool {
        viewer.can_view_reviews(record) && self.matcher.matches(record.review_count())
    }

    pub(crate) fn compile_condition(&self) -> ConditionNode {
        ConditionNode::ReviewCount {
            matcher: self.matcher,
        }
    }
}

/// Matches papers with at least one review in a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTerm {
    round: i64,
}

impl RoundTerm {
    pub(crate) const TRIVIAL_RIGHTS: bool = false;

    /// Creates a round term from a round id.
    pub fn new(round: i64) -> Self {
        Self { round }
    }

    /// Returns the round id.
    pub fn round(&self) -> i64 {
        self.round
    }

    /// Parses the value of a `round:` word against the configured round names.
    pub fn parse(
        value: &str,
        context: &SearchContext<'_>,
        warnings: &mut SearchWarnings,
    ) -> SearchTerm {
        let value = value.trim();
        let rounds = context.rounds();
        match rounds.resolve(value) {
            LabelMatch::Unique(round) => Self::new(round).into(),
            LabelMatch::Ambiguous(names) => {
                warnings.push(
                    value,
                    format!(
                        "Review round \"{}\" is ambiguous (could be {}).",
                        value,
                        names.join(", ")
                    ),
                );
                SearchTerm::False
            }
            LabelMatch::NotFound => {
                let message = match rounds.suggest(value) {
                    Some(suggestion) => format!(
                        "Unknown review round \"{value}\". Did you mean \"{suggestion}\"?"
                    ),
                    None => format!("Unknown review round \"{value}\"."),
                };
                warnings.push(value, message);
                SearchTerm::False
            }
        }
    }

    pub(crate) fn declare_columns(&self, info: &mut SearchQueryInfo) {
        info.add_join(Join::Reviews);
        info.add_column("PaperReviews.reviewRounds");
    }

    pub(crate) fn sql_fragment(&self) -> String {
        format!(
            "exists (select * from PaperReview where PaperReview.paperId = Paper.paperId \
             and PaperReview.reviewRound = {})",
            self.round
        )
    }

    pub(crate) fn evaluate(&self, record: &dyn PaperRecord, viewer: &dyn Viewer) -> bool {
        viewer.can_view_reviews(record) && record.review_rounds().contains(&self.round)
    }

    pub(crate) fn compile_condition(&self) -> ConditionNode {
        ConditionNode::Round { round: self.round }
    }
}
