//! Column and join requirements collected while compiling a term tree.

use std::collections::BTreeSet;
use std::fmt;

/// Primary table every search query selects from.
pub const PAPER_TABLE: &str = "Paper";

/// Column that is always projected so rows can be identified.
pub const PAPER_ID_COLUMN: &str = "Paper.paperId";

/// A derived table joined onto `Paper` to expose per-paper aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Join {
    /// Comma-separated topic ids as `PaperTopics.topicIds`.
    Topics,
    /// Space-separated `tag#value` pairs as `PaperTags.paperTags`.
    Tags,
    /// Review count and comma-separated review rounds.
    Reviews,
}

impl Join {
    /// Returns the stable key naming this join.
    pub fn key(self) -> &'static str {
        match self {
            Join::Topics => "topics",
            Join::Tags => "tags",
            Join::Reviews => "reviews",
        }
    }

    /// Returns the SQL join clause.
    pub fn sql(self) -> &'static str {
        match self {
            Join::Topics => {
                "left join (select paperId, group_concat(topicId) as topicIds \
                 from PaperTopic group by paperId) as PaperTopics \
                 on (PaperTopics.paperId = Paper.paperId)"
            }
            Join::Tags => {
                "left join (select paperId, group_concat(tag || '#' || tagIndex, ' ') as paperTags \
                 from PaperTag group by paperId) as PaperTags \
                 on (PaperTags.paperId = Paper.paperId)"
            }
            Join::Reviews => {
                "left join (select paperId, count(*) as reviewCount, \
                 group_concat(reviewRound) as reviewRounds \
                 from PaperReview group by paperId) as PaperReviews \
                 on (PaperReviews.paperId = Paper.paperId)"
            }
        }
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Accumulates the columns and joins a compiled search needs.
///
/// Registration is idempotent and additive: a term tree's requirements only
/// grow during one compile pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQueryInfo {
    columns: BTreeSet<String>,
    joins: BTreeSet<Join>,
}

impl SearchQueryInfo {
    /// Creates an empty requirement set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a column requirement.
    pub fn add_column(&mut self, name: impl Into<String>) {
        self.columns.insert(name.into());
    }

    /// Registers a join requirement.
    pub fn add_join(&mut self, join: Join) {
        self.joins.insert(join);
    }

    /// Returns the registered columns.
    pub fn columns(&self) -> &BTreeSet<String> {
        &self.columns
    }

    /// Returns the registered joins.
    pub fn joins(&self) -> &BTreeSet<Join> {
        &self.joins
    }

    /// Returns true if `name` has been registered.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    /// Assembles the bulk fetch for these requirements.
    pub fn into_query(self, where_clause: Option<String>) -> RowQuery {
        RowQuery {
            columns: self.columns.into_iter().collect(),
            joins: self.joins.into_iter().collect(),
            where_clause,
        }
    }
}

/// A fully assembled bulk fetch handed to a [`RowSource`](super::RowSource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowQuery {
    /// Projected columns, excluding the implicit paper id.
    pub columns: Vec<String>,
    /// Joined derived tables.
    pub joins: Vec<Join>,
    /// Filter, or `None` to fetch every candidate row.
    pub where_clause: Option<String>,
}

impl RowQuery {
    /// Renders the query as one `select` statement.
    pub fn to_sql(&self) -> String {
        let mut sql = format!("select {PAPER_ID_COLUMN}");
        for column in self.columns.iter().filter(|c| *c != PAPER_ID_COLUMN) {
            sql.push_str(", ");
            sql.push_str(column);
        }
        sql.push_str(" from ");
        sql.push_str(PAPER_TABLE);
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join.sql());
        }
        if let Some(where_clause) = &self.where_clause {
            sql.push_str(" where ");
            sql.push_str(where_clause);
        }
        sql.push_str(" order by ");
        sql.push_str(PAPER_ID_COLUMN);
        sql
    }
}
