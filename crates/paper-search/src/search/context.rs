//! Lookup collaborators threaded through term parsing.
//!
//! A [`SearchContext`] bundles everything a search word may need to resolve:
//! decision and round label tables, the topic abbreviation matcher, and the
//! storage collaborator's string quoting. It is immutable and borrowed for the
//! length of one parse pass.

use strsim::levenshtein;

/// Maximum Levenshtein distance to consider a name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Default cap on the number of words in one search.
pub const DEFAULT_MAX_TERMS: usize = 256;

/// Default cap on nested groups and negations in one search.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Expands free text into the set of matching topic ids.
pub trait AbbreviationMatcher {
    /// Returns the ids of every topic `pattern` abbreviates, in ascending order.
    fn find_all(&self, pattern: &str) -> Vec<i64>;

    /// Returns a close name to offer when `pattern` matched nothing.
    fn suggest(&self, _pattern: &str) -> Option<String> {
        None
    }
}

/// Quotes string literals for the backing SQL dialect.
pub trait SqlQuoter {
    /// Returns `text` as a complete, escaped SQL string literal.
    fn quote(&self, text: &str) -> String;
}

/// ANSI quoting: single quotes with embedded quotes doubled.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardQuoter;

impl SqlQuoter for StandardQuoter {
    fn quote(&self, text: &str) -> String {
        format!("'{}'", text.replace('\'', "''"))
    }
}

static STANDARD_QUOTER: StandardQuoter = StandardQuoter;

/// Finds the best matching name from a list of candidates using Levenshtein distance.
///
/// Returns the best match if its edit distance is within the threshold,
/// otherwise returns `None`.
pub(crate) fn find_similar_name<'a>(
    query: &str,
    candidates: impl Iterator<Item = &'a str>,
) -> Option<String> {
    let query_lower = query.to_lowercase();

    let (best_match, best_distance) = candidates
        .filter(|name| !name.is_empty())
        .map(|name| {
            let distance = levenshtein(&query_lower, &name.to_lowercase());
            (name.to_string(), distance)
        })
        .min_by_key(|(_, d)| *d)?;

    if best_distance > 0 && best_distance <= MAX_SUGGESTION_DISTANCE {
        Some(best_match)
    } else {
        None
    }
}

/// Result of resolving a label name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelMatch<'a> {
    /// Exactly one code matches.
    Unique(i64),
    /// The name is a prefix of several labels with different codes.
    Ambiguous(Vec<&'a str>),
    /// No label matches.
    NotFound,
}

/// An ordered mapping from human labels to integer codes.
///
/// Used for decision outcomes (`accept` → 1) and review rounds (`R2` → 2).
/// Lookups are case-insensitive and accept unambiguous prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    entries: Vec<(String, i64)>,
}

impl LabelTable {
    /// Creates a table from `(label, code)` pairs.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, code)| (name.into(), code))
                .collect(),
        }
    }

    /// Returns true if the table has no labels.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates label names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the label for `code`, if any.
    pub fn name_of(&self, code: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(name, _)| name.as_str())
    }

    /// Returns the code of a label spelled exactly (ignoring case).
    pub fn exact(&self, name: &str) -> Option<i64> {
        let name_lower = name.to_lowercase();
        self.entries
            .iter()
            .find(|(label, _)| label.to_lowercase() == name_lower)
            .map(|(_, code)| *code)
    }

    /// Resolves `name` as an exact label or an unambiguous prefix.
    pub fn resolve(&self, name: &str) -> LabelMatch<'_> {
        if name.is_empty() {
            return LabelMatch::NotFound;
        }
        if let Some(code) = self.exact(name) {
            return LabelMatch::Unique(code);
        }

        let name_lower = name.to_lowercase();
        let candidates: Vec<(&str, i64)> = self
            .entries
            .iter()
            .filter(|(label, _)| label.to_lowercase().starts_with(&name_lower))
            .map(|(label, code)| (label.as_str(), *code))
            .collect();

        match candidates.as_slice() {
            [] => LabelMatch::NotFound,
            [(_, code), rest @ ..] if rest.iter().all(|(_, c)| c == code) => {
                LabelMatch::Unique(*code)
            }
            _ => LabelMatch::Ambiguous(candidates.iter().map(|(name, _)| *name).collect()),
        }
    }

    /// Returns a close label name for a failed lookup.
    pub fn suggest(&self, name: &str) -> Option<String> {
        find_similar_name(name, self.names())
    }
}

/// A named topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    /// Stable topic id.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// The configured topic list, searchable by abbreviation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicTable {
    topics: Vec<Topic>,
}

impl TopicTable {
    /// Creates a table from `(id, name)` pairs.
    pub fn new<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        Self {
            topics: topics
                .into_iter()
                .map(|(id, name)| Topic {
                    id,
                    name: name.into(),
                })
                .collect(),
        }
    }

    /// Returns the configured topics.
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Returns the name of the topic with `id`.
    pub fn name_of(&self, id: i64) -> Option<&str> {
        self.topics
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.as_str())
    }
}

/// Splits text into lowercase alphanumeric words.
fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl AbbreviationMatcher for TopicTable {
    /// An exact name wins outright. Otherwise a topic matches when every word
    /// of the pattern is a prefix of some word of its name.
    fn find_all(&self, pattern: &str) -> Vec<i64> {
        let pattern_lower = pattern.trim().to_lowercase();
        if pattern_lower.is_empty() {
            return Vec::new();
        }

        if let Some(topic) = self
            .topics
            .iter()
            .find(|t| t.name.to_lowercase() == pattern_lower)
        {
            return vec![topic.id];
        }

        let pattern_words = words(&pattern_lower);
        if pattern_words.is_empty() {
            return Vec::new();
        }

        let mut ids: Vec<i64> = self
            .topics
            .iter()
            .filter(|topic| {
                let name_words = words(&topic.name);
                pattern_words
                    .iter()
                    .all(|pw| name_words.iter().any(|nw| nw.starts_with(pw.as_str())))
            })
            .map(|topic| topic.id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn suggest(&self, pattern: &str) -> Option<String> {
        find_similar_name(pattern, self.topics.iter().map(|t| t.name.as_str()))
    }
}

/// Immutable lookups shared by every term parsed in one search.
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    topics: &'a dyn AbbreviationMatcher,
    decisions: &'a LabelTable,
    rounds: &'a LabelTable,
    quoter: &'a dyn SqlQuoter,
    max_terms: usize,
    max_depth: usize,
}

impl<'a> SearchContext<'a> {
    /// Creates a context with standard SQL quoting.
    ///
    /// # Arguments
    ///
    /// * `topics` - Resolves topic abbreviations to topic ids
    /// * `decisions` - Decision labels and their outcome codes
    /// * `rounds` - Review round names and their ids
    pub fn new(
        topics: &'a dyn AbbreviationMatcher,
        decisions: &'a LabelTable,
        rounds: &'a LabelTable,
    ) -> Self {
        Self {
            topics,
            decisions,
            rounds,
            quoter: &STANDARD_QUOTER,
            max_terms: DEFAULT_MAX_TERMS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Replaces the string quoting used in SQL fragments.
    pub fn with_quoter(mut self, quoter: &'a dyn SqlQuoter) -> Self {
        self.quoter = quoter;
        self
    }

    /// Caps the number of words one search may contain.
    pub fn with_max_terms(mut self, max_terms: usize) -> Self {
        self.max_terms = max_terms;
        self
    }

    /// Caps how deeply parentheses and negations may nest.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns the topic abbreviation matcher.
    pub fn topics(&self) -> &'a dyn AbbreviationMatcher {
        self.topics
    }

    /// Returns the decision label table.
    pub fn decisions(&self) -> &'a LabelTable {
        self.decisions
    }

    /// Returns the review round table.
    pub fn rounds(&self) -> &'a LabelTable {
        self.rounds
    }

    /// Returns the SQL string quoter.
    pub fn quoter(&self) -> &'a dyn SqlQuoter {
        self.quoter
    }

    /// Returns the maximum number of words in one search.
    pub fn max_terms(&self) -> usize {
        self.max_terms
    }

    /// Returns the maximum nesting depth of one search.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl std::fmt::Debug for SearchContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchContext")
            .field("decisions", self.decisions)
            .field("rounds", self.rounds)
            .field("max_terms", &self.max_terms)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}
