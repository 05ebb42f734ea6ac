//! `topic:` search words.

use std::collections::BTreeSet;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::record::{PaperRecord, Viewer};
use crate::search::condition::ConditionNode;
use crate::search::context::SearchContext;
use crate::search::query_info::{Join, SearchQueryInfo};
use crate::search::warnings::SearchWarnings;

use super::SearchTerm;

/// The topics a [`TopicTerm`] tests for.
///
/// Serializes as `"any"` or as an array of topic ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicSet {
    /// Any topic at all.
    Any,
    /// One of these topic ids.
    Ids(BTreeSet<i64>),
}

impl TopicSet {
    /// Returns true if `topics` intersects this set.
    pub fn intersects(&self, topics: &[i64]) -> bool {
        match self {
            TopicSet::Any => !topics.is_empty(),
            TopicSet::Ids(ids) => topics.iter().any(|t| ids.contains(t)),
        }
    }
}

impl Serialize for TopicSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TopicSet::Any => serializer.serialize_str("any"),
            TopicSet::Ids(ids) => ids.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TopicSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Keyword(String),
            Ids(BTreeSet<i64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Keyword(keyword) if keyword == "any" => Ok(TopicSet::Any),
            Repr::Keyword(keyword) => Err(de::Error::invalid_value(
                de::Unexpected::Str(&keyword),
                &"\"any\" or an array of topic ids",
            )),
            Repr::Ids(ids) => Ok(TopicSet::Ids(ids)),
        }
    }
}

/// Matches papers by topic membership.
///
/// A plain term requires the paper's topics to intersect the set; a negated
/// term requires them not to. `topic:none` is therefore a negated `Any`, and
/// is a different node from `topic:any`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicTerm {
    topics: TopicSet,
    negated: bool,
}

impl TopicTerm {
    pub(crate) const TRIVIAL_RIGHTS: bool = true;

    /// Creates a topic term.
    pub fn new(topics: TopicSet, negated: bool) -> Self {
        Self { topics, negated }
    }

    /// Returns the tested topic set.
    pub fn topics(&self) -> &TopicSet {
        &self.topics
    }

    /// Returns true if the paper must have none of the topics.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Parses the value of a `topic:` word.
    ///
    /// `any` and `none` test for any topic or no topic. Other text is expanded
    /// into topic ids by the context's abbreviation matcher, optionally followed
    /// by `:any` (has one of them) or `:none` (has none of them). Text that
    /// matches no topic records a warning and yields [`SearchTerm::False`].
    pub fn parse(
        value: &str,
        context: &SearchContext<'_>,
        warnings: &mut SearchWarnings,
    ) -> SearchTerm {
        let value = value.trim();
        match value.to_lowercase().as_str() {
            "any" => return Self::new(TopicSet::Any, false).into(),
            "none" => return Self::new(TopicSet::Any, true).into(),
            _ => {}
        }

        let (pattern, negated) = split_suffix(value);
        if pattern.is_empty() {
            warnings.push(value, "Topic search needs a topic name.");
            return SearchTerm::False;
        }

        let ids = context.topics().find_all(pattern);
        if ids.is_empty() {
            let message = match context.topics().suggest(pattern) {
                Some(suggestion) => {
                    format!("No topics match \"{pattern}\". Did you mean \"{suggestion}\"?")
                }
                None => format!("No topics match \"{pattern}\"."),
            };
            warnings.push(value, message);
            return SearchTerm::False;
        }

        Self::new(TopicSet::Ids(ids.into_iter().collect()), negated).into()
    }

    pub(crate) fn declare_columns(&self, info: &mut SearchQueryInfo) {
        info.add_join(Join::Topics);
        info.add_column("PaperTopics.topicIds");
    }

    pub(crate) fn sql_fragment(&self) -> String {
        let exists = match &self.topics {
            TopicSet::Ids(ids) if ids.is_empty() => {
                return if self.negated { "true" } else { "false" }.to_string();
            }
            TopicSet::Any => {
                "exists (select * from PaperTopic where PaperTopic.paperId = Paper.paperId)"
                    .to_string()
            }
            TopicSet::Ids(ids) => {
                let list = ids
                    .iter()
                    .map(i64::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                format!(
                    "exists (select * from PaperTopic where PaperTopic.paperId = Paper.paperId \
                     and PaperTopic.topicId in ({list}))"
                )
            }
        };
        if self.negated {
            format!("not {exists}")
        } else {
            exists
        }
    }

    /// Topic membership is visible to every viewer.
    pub(crate) fn evaluate(&self, record: &dyn PaperRecord, _viewer: &dyn Viewer) -> bool {
        self.topics.intersects(record.topic_ids()) != self.negated
    }

    pub(crate) fn compile_condition(&self) -> ConditionNode {
        ConditionNode::Topic {
            topics: self.topics.clone(),
            negated: self.negated,
        }
    }
}

/// Strips a trailing `:any` or `:none`, returning the pattern and negation.
fn split_suffix(value: &str) -> (&str, bool) {
    if let Some((pattern, suffix)) = value.rsplit_once(':') {
        match suffix.to_lowercase().as_str() {
            "any" => return (pattern.trim(), false),
            "none" => return (pattern.trim(), true),
            _ => {}
        }
    }
    (value, false)
}
