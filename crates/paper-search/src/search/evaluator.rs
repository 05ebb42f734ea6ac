//! In-memory evaluation of search terms against fetched papers.
//!
//! This module provides the [`SearchEvaluator`] for testing parsed search
//! terms against individual records on behalf of a viewer. Permission checks
//! happen only inside the leaves that read a restricted field, and a denied
//! check makes that leaf false rather than failing.
//!
//! # Example
//!
//! ```
//! use paper_search::record::{PaperRow, PaperViewer};
//! use paper_search::search::{CountMatcher, DecisionTerm, SearchEvaluator, SearchTerm};
//!
//! let term = SearchTerm::from(DecisionTerm::new(CountMatcher::equals(1)));
//! let viewer = PaperViewer::omniscient();
//! let evaluator = SearchEvaluator::new(&term, &viewer);
//!
//! let mut paper = PaperRow::new(1);
//! paper.outcome = 1;
//! assert!(evaluator.matches(&paper));
//! ```

use crate::record::{PaperRecord, Viewer};

use super::term::SearchTerm;

impl SearchTerm {
    /// Returns the authoritative truth value of this tree for one record.
    ///
    /// AND and OR short-circuit in child order.
    pub fn evaluate(&self, record: &dyn PaperRecord, viewer: &dyn Viewer) -> bool {
        match self {
            SearchTerm::True => true,
            SearchTerm::False => false,

            SearchTerm::Decision(term) => term.evaluate(record, viewer),
            SearchTerm::Topic(term) => term.evaluate(record, viewer),
            SearchTerm::Tag(term) => term.evaluate(record, viewer),
            SearchTerm::Text(term) => term.evaluate(record, viewer),
            SearchTerm::ReviewCount(term) => term.evaluate(record, viewer),
            SearchTerm::Round(term) => term.evaluate(record, viewer),
            SearchTerm::PaperId(term) => term.evaluate(record, viewer),
            SearchTerm::Status(term) => term.evaluate(record, viewer),

            SearchTerm::And(children) => children.iter().all(|c| c.evaluate(record, viewer)),
            SearchTerm::Or(children) => children.iter().any(|c| c.evaluate(record, viewer)),
            SearchTerm::Not(inner) => !inner.evaluate(record, viewer),
        }
    }
}

/// Evaluates a search term against records for one viewer.
///
/// The evaluator borrows a parsed [`SearchTerm`] and a [`Viewer`], then can
/// test whether records match.
pub struct SearchEvaluator<'a> {
    term: &'a SearchTerm,
    viewer: &'a dyn Viewer,
}

impl<'a> SearchEvaluator<'a> {
    /// Creates a new evaluator.
    ///
    /// # Arguments
    ///
    /// * `term` - The parsed search to evaluate
    /// * `viewer` - The identity whose permissions apply
    pub fn new(term: &'a SearchTerm, viewer: &'a dyn Viewer) -> Self {
        Self { term, viewer }
    }

    /// Returns true if the record matches the search.
    pub fn matches(&self, record: &dyn PaperRecord) -> bool {
        self.term.evaluate(record, self.viewer)
    }

    /// Filters a slice of records, returning only those that match.
    pub fn filter_records<'b, R: PaperRecord>(&self, records: &'b [R]) -> Vec<&'b R> {
        records.iter().filter(|r| self.matches(*r)).collect()
    }
}

impl std::fmt::Debug for SearchEvaluator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEvaluator")
            .field("term", self.term)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{PaperRow, PaperViewer};
    use crate::search::{CountMatcher, DecisionTerm, TopicSet, TopicTerm};

    fn accepted() -> SearchTerm {
        DecisionTerm::new(CountMatcher::equals(1)).into()
    }

    fn has_topics() -> SearchTerm {
        TopicTerm::new(TopicSet::Any, false).into()
    }

    #[test]
    fn test_filter_records() {
        let mut papers: Vec<PaperRow> = (1..=4).map(PaperRow::new).collect();
        papers[0].outcome = 1;
        papers[2].outcome = 1;
        papers[3].outcome = -1;

        let term = accepted();
        let viewer = PaperViewer::omniscient();
        let evaluator = SearchEvaluator::new(&term, &viewer);

        let ids: Vec<i64> = evaluator
            .filter_records(&papers)
            .iter()
            .map(|p| p.paper_id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_hidden_decision_is_false_not_error() {
        let mut paper = PaperRow::new(1);
        paper.outcome = 1;
        let viewer = PaperViewer::omniscient().with_conflict(1);

        assert!(!accepted().evaluate(&paper, &viewer));
        assert!(SearchTerm::negate(accepted()).evaluate(&paper, &viewer));
    }

    #[test]
    fn test_and_or_short_circuit_results() {
        let mut paper = PaperRow::new(1);
        paper.outcome = 1;
        let viewer = PaperViewer::omniscient();

        let and = SearchTerm::And(vec![accepted(), has_topics()]);
        let or = SearchTerm::Or(vec![accepted(), has_topics()]);
        assert!(!and.evaluate(&paper, &viewer));
        assert!(or.evaluate(&paper, &viewer));
    }

    #[test]
    fn test_empty_combinators() {
        let paper = PaperRow::new(1);
        let viewer = PaperViewer::omniscient();
        assert!(SearchTerm::And(vec![]).evaluate(&paper, &viewer));
        assert!(!SearchTerm::Or(vec![]).evaluate(&paper, &viewer));
    }
}
