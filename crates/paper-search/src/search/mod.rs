//! Search expression parser, SQL compiler and evaluator for paper lists.
//!
//! This module turns a free-text search such as `dec:accept topic:net` into a
//! [`SearchTerm`] tree. The tree can be rendered as a SQL boolean fragment for
//! one bulk query, evaluated in memory against a record on behalf of a viewer,
//! or exported as a [`ConditionNode`] document for client-side re-filtering.
//!
//! # Supported Syntax
//!
//! ## Decisions
//! - `dec:accept`, `decision:rej` - decision label or unambiguous prefix
//! - `dec:yes`, `dec:no`, `dec:any`, `dec:none` - outcome sign
//! - `dec:>0`, `dec:-1..1` - raw outcome comparison
//!
//! ## Topics
//! - `topic:net` - papers with any topic `net` abbreviates
//! - `topic:net:none` - papers with none of them
//! - `topic:any`, `topic:none` - papers with some topic or no topic
//!
//! ## Tags
//! - `#award`, `tag:award` - papers with the tag
//! - `tag:order#>2`, `#rank<=3` - tag value comparison
//!
//! ## Text
//! - `ti:graph`, `ab:"neural network"`, `au:lee` - substring of one field
//! - `graph` - substring of title, abstract or authors
//!
//! ## Reviews and Papers
//! - `re:>=3` - review count
//! - `round:R2` - papers with a review in the round
//! - `#12`, `12`, `3-9`, `pid:>100` - paper ids
//! - `is:withdrawn`, `is:submitted`, `is:active` - submission status
//!
//! ## Boolean Operators
//! - `AND`, `&`, `&&`, or juxtaposition - AND
//! - `OR`, `|`, `||` - OR
//! - `NOT`, `!`, `-` - NOT
//! - `()` - Grouping
//!
//! # Example
//!
//! ```
//! use paper_search::record::{PaperRow, PaperViewer};
//! use paper_search::search::{LabelTable, Search, SearchContext, SearchEvaluator, TopicTable};
//!
//! let topics = TopicTable::new([(1, "Networking"), (2, "Security")]);
//! let decisions = LabelTable::new([("accept", 1), ("reject", -1)]);
//! let rounds = LabelTable::new([("R1", 1), ("R2", 2)]);
//! let context = SearchContext::new(&topics, &decisions, &rounds);
//!
//! let search = Search::parse("dec:accept topic:net", &context);
//! assert!(search.warnings().is_empty());
//!
//! let mut paper = PaperRow::new(7);
//! paper.outcome = 1;
//! paper.topics = vec![1];
//!
//! let viewer = PaperViewer::omniscient();
//! let evaluator = SearchEvaluator::new(search.term(), &viewer);
//! assert!(evaluator.matches(&paper));
//! ```

mod compiler;
mod condition;
mod context;
mod error;
mod evaluator;
mod lexer;
mod matcher;
mod parser;
mod query_info;
mod term;
mod warnings;

pub use compiler::{CompiledSearch, RowSource, Search, SearchCompiler, Strategy};
pub use condition::ConditionNode;
pub use context::{
    AbbreviationMatcher, LabelMatch, LabelTable, SearchContext, SqlQuoter, StandardQuoter, Topic,
    TopicTable, DEFAULT_MAX_DEPTH, DEFAULT_MAX_TERMS,
};
pub use error::{MatcherError, SearchError, SearchResult, SqlUnrepresentable};
pub use evaluator::SearchEvaluator;
pub use lexer::{Lexer, LexerError, LexerErrorKind, LexerResult, PositionedToken, SearchToken};
pub use matcher::{CompareOp, CountMatcher};
pub use parser::{parse_word, Keyword, SearchParser};
pub use query_info::{Join, RowQuery, SearchQueryInfo, PAPER_ID_COLUMN, PAPER_TABLE};
pub use term::{
    DecisionTerm, PaperIdTerm, PaperStatus, ReviewCountTerm, RoundTerm, SearchTerm, SqlResult,
    StatusTerm, TagTerm, TextField, TextTerm, TopicSet, TopicTerm,
};
pub use warnings::{SearchWarning, SearchWarnings};

#[cfg(test)]
mod tests;
