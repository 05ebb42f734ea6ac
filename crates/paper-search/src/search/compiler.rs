//! Compiles a term tree into one bulk query plus an in-memory filter.
//!
//! [`SearchCompiler::compile`] declares every column the tree reads, tries to
//! render the whole tree as SQL, and picks a [`Strategy`] from the outcome.
//! [`CompiledSearch::execute`] then runs the plan against a [`RowSource`]. The
//! rows it returns are always exactly those [`SearchTerm::evaluate`] accepts
//! for the viewer.

use crate::record::{PaperRecord, Viewer};

use super::condition::ConditionNode;
use super::context::SearchContext;
use super::error::SearchResult;
use super::parser::SearchParser;
use super::query_info::{RowQuery, SearchQueryInfo};
use super::term::SearchTerm;
use super::warnings::SearchWarnings;

/// Storage collaborator that runs the bulk row query.
pub trait RowSource {
    /// The record type produced for each row.
    type Row: PaperRecord;

    /// Fetches every row selected by `query`, with its declared columns.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::RowSource`](super::SearchError::RowSource) if the
    /// storage layer fails.
    fn fetch(&self, query: &RowQuery) -> SearchResult<Vec<Self::Row>>;
}

/// How a compiled search narrows rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// The WHERE clause is the whole filter.
    SqlExact,
    /// The WHERE clause selects a superset; each row is then evaluated.
    SqlPrefilter,
    /// No WHERE clause; every candidate row is evaluated.
    InMemory,
}

impl Strategy {
    /// Returns true if fetched rows still need in-memory evaluation.
    pub fn needs_evaluation(self) -> bool {
        !matches!(self, Strategy::SqlExact)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::SqlExact => "sql-exact",
            Strategy::SqlPrefilter => "sql-prefilter",
            Strategy::InMemory => "in-memory",
        };
        f.write_str(name)
    }
}

/// Builds execution plans from term trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchCompiler;

impl SearchCompiler {
    /// Compiles `term` into a bulk query and strategy.
    pub fn compile(term: SearchTerm) -> CompiledSearch {
        let mut info = SearchQueryInfo::new();
        term.declare_columns(&mut info);

        let (strategy, where_clause) = match term.sql_fragment() {
            Ok(sql) if term.trivial_rights() => (Strategy::SqlExact, Some(sql)),
            Ok(sql) => (Strategy::SqlPrefilter, Some(sql)),
            Err(_) => (Strategy::InMemory, None),
        };
        tracing::debug!(
            %strategy,
            kind = term.kind(),
            columns = info.columns().len(),
            joins = info.joins().len(),
            "compiled search"
        );

        CompiledSearch {
            query: info.into_query(where_clause),
            strategy,
            term,
        }
    }
}

/// A term tree with its bulk query and strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSearch {
    term: SearchTerm,
    query: RowQuery,
    strategy: Strategy,
}

impl CompiledSearch {
    /// Returns the compiled term tree.
    pub fn term(&self) -> &SearchTerm {
        &self.term
    }

    /// Returns the bulk query.
    pub fn query(&self) -> &RowQuery {
        &self.query
    }

    /// Returns the chosen strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Returns the WHERE clause, if the tree has a SQL form.
    pub fn where_clause(&self) -> Option<&str> {
        self.query.where_clause.as_deref()
    }

    /// Exports the term tree as a condition document.
    pub fn condition(&self) -> ConditionNode {
        self.term.compile_condition()
    }

    /// Fetches rows from `source` and keeps those that match for `viewer`.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`RowSource::fetch`].
    pub fn execute<S: RowSource>(&self, source: &S, viewer: &dyn Viewer) -> SearchResult<Vec<S::Row>> {
        let rows = source.fetch(&self.query)?;
        let candidates = rows.len();

        let matched: Vec<S::Row> = if self.strategy.needs_evaluation() {
            rows.into_iter()
                .filter(|row| self.term.evaluate(row, viewer))
                .collect()
        } else {
            rows
        };

        tracing::debug!(
            strategy = %self.strategy,
            candidates,
            matched = matched.len(),
            "executed search"
        );
        Ok(matched)
    }
}

/// A parsed search expression and the warnings it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Search {
    term: SearchTerm,
    warnings: SearchWarnings,
}

impl Search {
    /// Parses a whole search expression.
    ///
    /// Never fails; problems are reported through [`Search::warnings`].
    ///
    /// # Example
    ///
    /// ```
    /// use paper_search::search::{LabelTable, Search, SearchContext, Strategy, TopicTable};
    ///
    /// let topics = TopicTable::new([(1, "Security")]);
    /// let decisions = LabelTable::new([("accept", 1), ("reject", -1)]);
    /// let rounds = LabelTable::new(Vec::<(String, i64)>::new());
    /// let context = SearchContext::new(&topics, &decisions, &rounds);
    ///
    /// let search = Search::parse("topic:sec -withdrawn:yes", &context);
    /// assert_eq!(search.warnings().len(), 1);
    ///
    /// let compiled = search.compile();
    /// assert_eq!(compiled.strategy(), Strategy::SqlExact);
    /// ```
    pub fn parse(text: &str, context: &SearchContext<'_>) -> Self {
        let mut warnings = SearchWarnings::new();
        let term = SearchParser::parse(text, context, &mut warnings);
        Self { term, warnings }
    }

    /// Returns the parsed term tree.
    pub fn term(&self) -> &SearchTerm {
        &self.term
    }

    /// Returns the warnings recorded while parsing.
    pub fn warnings(&self) -> &SearchWarnings {
        &self.warnings
    }

    /// Splits into the term tree and the warnings.
    pub fn into_parts(self) -> (SearchTerm, SearchWarnings) {
        (self.term, self.warnings)
    }

    /// Compiles the term tree, discarding the warnings.
    pub fn compile(self) -> CompiledSearch {
        SearchCompiler::compile(self.term)
    }
}
