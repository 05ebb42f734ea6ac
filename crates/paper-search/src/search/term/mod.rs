//! The search term tree.
//!
//! [`SearchTerm`] is a closed union of leaf predicates and boolean
//! combinators. Every operation (column declaration, SQL rendering, in-memory
//! evaluation, condition export) is an exhaustive match over it, so a new leaf
//! kind cannot be added without handling it everywhere.

mod decision;
mod paper;
mod review;
mod tag;
mod text;
mod topic;

pub use decision::DecisionTerm;
pub use paper::{PaperIdTerm, PaperStatus, StatusTerm};
pub use review::{ReviewCountTerm, RoundTerm};
pub use tag::TagTerm;
pub use text::{TextField, TextTerm};
pub(crate) use text::contains_ignore_ascii_case;
pub use topic::{TopicSet, TopicTerm};

use super::error::SqlUnrepresentable;
use super::query_info::SearchQueryInfo;

/// Result of rendering a term as SQL.
pub type SqlResult = Result<String, SqlUnrepresentable>;

/// A node of a parsed search.
///
/// Trees are immutable once built; every operation takes `&self` and recurses
/// once per nesting level. Parsed trees nest at most
/// [`SearchContext::max_depth`](super::SearchContext::max_depth) levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    // ==================== Constants ====================
    /// Matches every paper.
    True,

    /// Matches no paper. Also the fallback for unrecognized search words.
    False,

    // ==================== Leaf Predicates ====================
    /// Decision outcome comparison.
    Decision(DecisionTerm),

    /// Topic membership.
    Topic(TopicTerm),

    /// Tag presence and value.
    Tag(TagTerm),

    /// Substring search on a text field.
    Text(TextTerm),

    /// Review count comparison.
    ReviewCount(ReviewCountTerm),

    /// Presence of a review in a round.
    Round(RoundTerm),

    /// Paper id comparison.
    PaperId(PaperIdTerm),

    /// Submission status.
    Status(StatusTerm),

    // ==================== Boolean Operators ====================
    /// Logical AND of any number of terms; empty means true.
    And(Vec<SearchTerm>),

    /// Logical OR of any number of terms; empty means false.
    Or(Vec<SearchTerm>),

    /// Logical NOT of a term.
    Not(Box<SearchTerm>),
}

impl SearchTerm {
    /// Creates a NOT term.
    ///
    /// # Example
    ///
    /// ```
    /// use paper_search::search::SearchTerm;
    ///
    /// let term = SearchTerm::negate(SearchTerm::True);
    /// assert!(matches!(term, SearchTerm::Not(_)));
    /// ```
    pub fn negate(inner: SearchTerm) -> Self {
        SearchTerm::Not(Box::new(inner))
    }

    /// Conjoins terms, flattening nested ANDs and folding constants.
    ///
    /// An empty conjunction is [`SearchTerm::True`].
    ///
    /// # Example
    ///
    /// ```
    /// use paper_search::search::SearchTerm;
    ///
    /// assert_eq!(SearchTerm::and_all(vec![]), SearchTerm::True);
    /// assert_eq!(
    ///     SearchTerm::and_all(vec![SearchTerm::True, SearchTerm::False]),
    ///     SearchTerm::False
    /// );
    /// ```
    pub fn and_all(terms: Vec<SearchTerm>) -> Self {
        let mut children = Vec::with_capacity(terms.len());
        for term in terms {
            match term {
                SearchTerm::True => {}
                SearchTerm::False => return SearchTerm::False,
                SearchTerm::And(nested) => children.extend(nested),
                other => children.push(other),
            }
        }
        match children.len() {
            0 => SearchTerm::True,
            1 => children.remove(0),
            _ => SearchTerm::And(children),
        }
    }

    /// Disjoins terms, flattening nested ORs and folding constants.
    ///
    /// An empty disjunction is [`SearchTerm::False`].
    pub fn or_any(terms: Vec<SearchTerm>) -> Self {
        let mut children = Vec::with_capacity(terms.len());
        for term in terms {
            match term {
                SearchTerm::False => {}
                SearchTerm::True => return SearchTerm::True,
                SearchTerm::Or(nested) => children.extend(nested),
                other => children.push(other),
            }
        }
        match children.len() {
            0 => SearchTerm::False,
            1 => children.remove(0),
            _ => SearchTerm::Or(children),
        }
    }

    /// Returns the stable identifier of this node's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchTerm::True => "true",
            SearchTerm::False => "false",
            SearchTerm::Decision(_) => "dec",
            SearchTerm::Topic(_) => "topic",
            SearchTerm::Tag(_) => "tag",
            SearchTerm::Text(_) => "text",
            SearchTerm::ReviewCount(_) => "revcount",
            SearchTerm::Round(_) => "round",
            SearchTerm::PaperId(_) => "pid",
            SearchTerm::Status(_) => "status",
            SearchTerm::And(_) => "and",
            SearchTerm::Or(_) => "or",
            SearchTerm::Not(_) => "not",
        }
    }

    /// Returns the ordered children; empty for leaves.
    pub fn children(&self) -> &[SearchTerm] {
        match self {
            SearchTerm::And(children) | SearchTerm::Or(children) => children,
            SearchTerm::Not(inner) => std::slice::from_ref(inner.as_ref()),
            _ => &[],
        }
    }

    /// Registers every column and join this subtree reads.
    ///
    /// Combinators visit all children, including those evaluation would
    /// short-circuit past.
    pub fn declare_columns(&self, info: &mut SearchQueryInfo) {
        match self {
            SearchTerm::True | SearchTerm::False => {}
            SearchTerm::Decision(term) => term.declare_columns(info),
            SearchTerm::Topic(term) => term.declare_columns(info),
            SearchTerm::Tag(term) => term.declare_columns(info),
            SearchTerm::Text(term) => term.declare_columns(info),
            SearchTerm::ReviewCount(term) => term.declare_columns(info),
            SearchTerm::Round(term) => term.declare_columns(info),
            SearchTerm::PaperId(term) => term.declare_columns(info),
            SearchTerm::Status(term) => term.declare_columns(info),
            SearchTerm::And(children) | SearchTerm::Or(children) => {
                for child in children {
                    child.declare_columns(info);
                }
            }
            SearchTerm::Not(inner) => inner.declare_columns(info),
        }
    }

    /// Returns true if this subtree's truth value never depends on the viewer.
    pub fn trivial_rights(&self) -> bool {
        match self {
            SearchTerm::True | SearchTerm::False => true,
            SearchTerm::Decision(_) => DecisionTerm::TRIVIAL_RIGHTS,
            SearchTerm::Topic(_) => TopicTerm::TRIVIAL_RIGHTS,
            SearchTerm::Tag(_) => TagTerm::TRIVIAL_RIGHTS,
            SearchTerm::Text(term) => term.trivial_rights(),
            SearchTerm::ReviewCount(_) => ReviewCountTerm::TRIVIAL_RIGHTS,
            SearchTerm::Round(_) => RoundTerm::TRIVIAL_RIGHTS,
            SearchTerm::PaperId(_) => PaperIdTerm::TRIVIAL_RIGHTS,
            SearchTerm::Status(_) => StatusTerm::TRIVIAL_RIGHTS,
            SearchTerm::And(children) | SearchTerm::Or(children) => {
                children.iter().all(SearchTerm::trivial_rights)
            }
            SearchTerm::Not(inner) => inner.trivial_rights(),
        }
    }

    /// Renders this subtree as a SQL boolean expression.
    ///
    /// For viewer-independent subtrees the result selects exactly the rows
    /// [`evaluate`](Self::evaluate) accepts. For permission-sensitive subtrees
    /// it selects a superset, which the caller narrows per row.
    ///
    /// # Errors
    ///
    /// Returns [`SqlUnrepresentable`] if any part of an AND/OR has no SQL form,
    /// or if a NOT wraps a permission-sensitive subtree.
    pub fn sql_fragment(&self) -> SqlResult {
        match self {
            SearchTerm::True => Ok("true".to_string()),
            SearchTerm::False => Ok("false".to_string()),
            SearchTerm::Decision(term) => Ok(term.sql_fragment()),
            SearchTerm::Topic(term) => Ok(term.sql_fragment()),
            SearchTerm::Tag(term) => Ok(term.sql_fragment()),
            SearchTerm::Text(term) => Ok(term.sql_fragment()),
            SearchTerm::ReviewCount(term) => Ok(term.sql_fragment()),
            SearchTerm::Round(term) => Ok(term.sql_fragment()),
            SearchTerm::PaperId(term) => Ok(term.sql_fragment()),
            SearchTerm::Status(term) => Ok(term.sql_fragment()),
            SearchTerm::And(children) => join_sql(children, " and ", "true"),
            SearchTerm::Or(children) => join_sql(children, " or ", "false"),
            SearchTerm::Not(inner) => {
                if !inner.trivial_rights() {
                    return Err(SqlUnrepresentable);
                }
                Ok(format!("not ({})", inner.sql_fragment()?))
            }
        }
    }
}

fn join_sql(children: &[SearchTerm], separator: &str, empty: &str) -> SqlResult {
    if children.is_empty() {
        return Ok(empty.to_string());
    }
    let parts = children
        .iter()
        .map(SearchTerm::sql_fragment)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("({})", parts.join(separator)))
}

impl From<DecisionTerm> for SearchTerm {
    fn from(term: DecisionTerm) -> Self {
        SearchTerm::Decision(term)
    }
}

impl From<TopicTerm> for SearchTerm {
    fn from(term: TopicTerm) -> Self {
        SearchTerm::Topic(term)
    }
}

impl From<TagTerm> for SearchTerm {
    fn from(term: TagTerm) -> Self {
        SearchTerm::Tag(term)
    }
}

impl From<TextTerm> for SearchTerm {
    fn from(term: TextTerm) -> Self {
        SearchTerm::Text(term)
    }
}

impl From<ReviewCountTerm> for SearchTerm {
    fn from(term: ReviewCountTerm) -> Self {
        SearchTerm::ReviewCount(term)
    }
}

impl From<RoundTerm> for SearchTerm {
    fn from(term: RoundTerm) -> Self {
        SearchTerm::Round(term)
    }
}

impl From<PaperIdTerm> for SearchTerm {
    fn from(term: PaperIdTerm) -> Self {
        SearchTerm::PaperId(term)
    }
}

impl From<StatusTerm> for SearchTerm {
    fn from(term: StatusTerm) -> Self {
        SearchTerm::Status(term)
    }
}
