//! Serializable condition documents for client-side re-filtering.
//!
//! [`SearchTerm::compile_condition`] exports a term tree as a
//! [`ConditionNode`], which serializes to JSON of the form
//!
//! ```json
//! { "type": "and", "children": [
//!     { "type": "dec", "match": "=1" },
//!     { "type": "not", "children": [ { "type": "topic", "topics": [3], "negated": false } ] }
//! ] }
//! ```
//!
//! A client holding the (already redacted) record data can rebuild the same
//! boolean test from the document alone; [`ConditionNode::matches`] is the
//! reference implementation of that test.

use serde::{Deserialize, Serialize};

use crate::record::PaperRecord;

use super::matcher::CountMatcher;
use super::term::{contains_ignore_ascii_case, PaperStatus, SearchTerm, TextField, TopicSet};

/// One node of a condition document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionNode {
    /// Always true.
    True,

    /// Always false.
    False,

    /// Decision outcome comparison.
    #[serde(rename = "dec")]
    Decision {
        /// Outcome matcher.
        #[serde(rename = "match")]
        matcher: CountMatcher,
    },

    /// Topic membership.
    Topic {
        /// Tested topics.
        topics: TopicSet,
        /// True if the paper must have none of the topics.
        negated: bool,
    },

    /// Tag presence and optional value.
    Tag {
        /// Tag name.
        tag: String,
        /// Value matcher, or `null` for presence only.
        #[serde(rename = "match")]
        matcher: Option<CountMatcher>,
    },

    /// Substring search.
    Text {
        /// Searched field.
        field: TextField,
        /// Searched phrase.
        text: String,
    },

    /// Review count comparison.
    #[serde(rename = "revcount")]
    ReviewCount {
        /// Count matcher.
        #[serde(rename = "match")]
        matcher: CountMatcher,
    },

    /// Review round membership.
    Round {
        /// Round id.
        round: i64,
    },

    /// Paper id comparison.
    #[serde(rename = "pid")]
    PaperId {
        /// Id matcher.
        #[serde(rename = "match")]
        matcher: CountMatcher,
    },

    /// Submission status.
    Status {
        /// Tested status.
        status: PaperStatus,
    },

    /// Negation. Documents with any other number of children are rejected.
    Not {
        /// The negated node.
        children: Box<[ConditionNode; 1]>,
    },

    /// Conjunction.
    And {
        /// Conjuncts, in order.
        children: Vec<ConditionNode>,
    },

    /// Disjunction.
    Or {
        /// Disjuncts, in order.
        children: Vec<ConditionNode>,
    },
}

impl ConditionNode {
    /// Returns the `type` tag of this node.
    pub fn kind(&self) -> &'static str {
        match self {
            ConditionNode::True => "true",
            ConditionNode::False => "false",
            ConditionNode::Decision { .. } => "dec",
            ConditionNode::Topic { .. } => "topic",
            ConditionNode::Tag { .. } => "tag",
            ConditionNode::Text { .. } => "text",
            ConditionNode::ReviewCount { .. } => "revcount",
            ConditionNode::Round { .. } => "round",
            ConditionNode::PaperId { .. } => "pid",
            ConditionNode::Status { .. } => "status",
            ConditionNode::Not { .. } => "not",
            ConditionNode::And { .. } => "and",
            ConditionNode::Or { .. } => "or",
        }
    }

    /// Returns the child nodes; empty for leaves.
    pub fn children(&self) -> &[ConditionNode] {
        match self {
            ConditionNode::Not { children } => children.as_slice(),
            ConditionNode::And { children } | ConditionNode::Or { children } => children,
            _ => &[],
        }
    }

    /// Tests a record the viewer has already been given.
    ///
    /// Fields the viewer may not see are expected to be absent from the
    /// client's copy of the record, so no permission checks happen here.
    pub fn matches(&self, record: &dyn PaperRecord) -> bool {
        match self {
            ConditionNode::True => true,
            ConditionNode::False => false,
            ConditionNode::Decision { matcher } => matcher.matches(record.outcome()),
            ConditionNode::Topic { topics, negated } => {
                topics.intersects(record.topic_ids()) != *negated
            }
            ConditionNode::Tag { tag, matcher } => record
                .tag_value(tag)
                .is_some_and(|v| matcher.map_or(true, |m| m.matches(v))),
            ConditionNode::Text { field, text } => {
                contains_ignore_ascii_case(field.read(record), text)
            }
            ConditionNode::ReviewCount { matcher } => matcher.matches(record.review_count()),
            ConditionNode::Round { round } => record.review_rounds().contains(round),
            ConditionNode::PaperId { matcher } => matcher.matches(record.paper_id()),
            ConditionNode::Status { status } => status.holds_for(record),
            ConditionNode::Not { children } => {
                let [inner] = &**children;
                !inner.matches(record)
            }
            ConditionNode::And { children } => children.iter().all(|c| c.matches(record)),
            ConditionNode::Or { children } => children.iter().any(|c| c.matches(record)),
        }
    }

    /// Serializes the document to JSON.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl SearchTerm {
    /// Exports this tree as a condition document.
    pub fn compile_condition(&self) -> ConditionNode {
        match self {
            SearchTerm::True => ConditionNode::True,
            SearchTerm::False => ConditionNode::False,
            SearchTerm::Decision(term) => term.compile_condition(),
            SearchTerm::Topic(term) => term.compile_condition(),
            SearchTerm::Tag(term) => term.compile_condition(),
            SearchTerm::Text(term) => term.compile_condition(),
            SearchTerm::ReviewCount(term) => term.compile_condition(),
            SearchTerm::Round(term) => term.compile_condition(),
            SearchTerm::PaperId(term) => term.compile_condition(),
            SearchTerm::Status(term) => term.compile_condition(),
            SearchTerm::And(children) => ConditionNode::And {
                children: children.iter().map(SearchTerm::compile_condition).collect(),
            },
            SearchTerm::Or(children) => ConditionNode::Or {
                children: children.iter().map(SearchTerm::compile_condition).collect(),
            },
            SearchTerm::Not(inner) => ConditionNode::Not {
                children: Box::new([inner.compile_condition()]),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::record::PaperRow;
    use crate::search::term::{DecisionTerm, TagTerm, TopicTerm};

    #[test]
    fn test_leaf_documents() {
        let dec = SearchTerm::from(DecisionTerm::new(CountMatcher::equals(1)));
        assert_eq!(
            dec.compile_condition().to_json().unwrap(),
            json!({"type": "dec", "match": "=1"})
        );

        let any = SearchTerm::from(TopicTerm::new(TopicSet::Any, true));
        assert_eq!(
            any.compile_condition().to_json().unwrap(),
            json!({"type": "topic", "topics": "any", "negated": true})
        );

        let tag = SearchTerm::from(TagTerm::new("award", None));
        assert_eq!(
            tag.compile_condition().to_json().unwrap(),
            json!({"type": "tag", "tag": "award", "match": null})
        );
    }

    #[test]
    fn test_document_deserializes() {
        let doc: ConditionNode = serde_json::from_value(json!({
            "type": "or",
            "children": [
                {"type": "topic", "topics": [2, 1], "negated": false},
                {"type": "not", "children": [{"type": "false"}]}
            ]
        }))
        .unwrap();

        assert_eq!(doc.kind(), "or");
        assert_eq!(doc.children().len(), 2);
        assert_eq!(
            doc.children()[0],
            ConditionNode::Topic {
                topics: TopicSet::Ids([1, 2].into_iter().collect()),
                negated: false,
            }
        );
    }

    #[test]
    fn test_not_document_shape() {
        let not = SearchTerm::negate(SearchTerm::True).compile_condition();
        assert_eq!(
            not.to_json().unwrap(),
            json!({"type": "not", "children": [{"type": "true"}]})
        );
        assert!(!not.matches(&PaperRow::new(1)));
    }

    #[test]
    fn test_not_requires_one_child() {
        for children in [json!([]), json!([{"type": "true"}, {"type": "false"}])] {
            let doc = serde_json::from_value::<ConditionNode>(json!({
                "type": "not", "children": children
            }));
            assert!(doc.is_err(), "accepted not with children {children}");
        }

        let doc: ConditionNode = serde_json::from_value(json!({
            "type": "not", "children": [{"type": "false"}]
        }))
        .unwrap();
        assert_eq!(doc.children(), &[ConditionNode::False]);
        assert!(doc.matches(&PaperRow::new(1)));
    }

    #[test]
    fn test_topic_keyword_rejects_other_strings() {
        let err = serde_json::from_value::<ConditionNode>(json!({
            "type": "topic", "topics": "some", "negated": false
        }));
        assert!(err.is_err());
    }
}
