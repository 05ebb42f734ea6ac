//! Record and viewer interfaces consumed by the evaluator.
//!
//! Rows are owned by the storage layer and only read here. [`PaperRow`] is a
//! plain deserializable row for callers that fetch into memory.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Read access to one fetched paper.
pub trait PaperRecord {
    /// The paper id.
    fn paper_id(&self) -> i64;

    /// The decision outcome code; 0 means undecided.
    fn outcome(&self) -> i64;

    /// Ids of the paper's topics.
    fn topic_ids(&self) -> &[i64];

    /// The value of `tag` on this paper, or `None` if untagged.
    fn tag_value(&self, tag: &str) -> Option<i64>;

    /// The title.
    fn title(&self) -> &str;

    /// The abstract.
    fn abstract_text(&self) -> &str;

    /// Author information as free text.
    fn authors(&self) -> &str;

    /// True if the paper was withdrawn.
    fn is_withdrawn(&self) -> bool;

    /// True if the paper was submitted.
    fn is_submitted(&self) -> bool;

    /// Number of reviews.
    fn review_count(&self) -> i64;

    /// Round ids of the paper's reviews.
    fn review_rounds(&self) -> &[i64];
}

/// Permission checks for the identity running a search.
pub trait Viewer {
    /// Whether the decision on `paper` is visible.
    fn can_view_decision(&self, paper: &dyn PaperRecord) -> bool;

    /// Whether the authors of `paper` are visible.
    fn can_view_authors(&self, paper: &dyn PaperRecord) -> bool;

    /// Whether `tag` on `paper` is visible.
    fn can_view_tag(&self, paper: &dyn PaperRecord, tag: &str) -> bool;

    /// Whether the reviews of `paper` (including their count and rounds) are visible.
    fn can_view_reviews(&self, paper: &dyn PaperRecord) -> bool;
}

/// A tag with its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperTag {
    /// Tag name.
    pub tag: String,
    /// Tag value (order index).
    #[serde(default)]
    pub value: i64,
}

/// An in-memory paper row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRow {
    /// Paper id.
    pub paper_id: i64,

    /// Decision outcome code.
    #[serde(default)]
    pub outcome: i64,

    /// Topic ids.
    #[serde(default)]
    pub topics: Vec<i64>,

    /// Tags and their values.
    #[serde(default)]
    pub tags: Vec<PaperTag>,

    /// Title.
    #[serde(default)]
    pub title: String,

    /// Abstract.
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,

    /// Author information.
    #[serde(default)]
    pub authors: String,

    /// Submission timestamp; positive once submitted.
    #[serde(default)]
    pub time_submitted: i64,

    /// Withdrawal timestamp; positive once withdrawn.
    #[serde(default)]
    pub time_withdrawn: i64,

    /// Round id of each review.
    #[serde(default)]
    pub review_rounds: Vec<i64>,
}

impl PaperRow {
    /// Creates an undecided, untagged, topicless row.
    pub fn new(paper_id: i64) -> Self {
        Self {
            paper_id,
            ..Self::default()
        }
    }
}

impl PaperRecord for PaperRow {
    fn paper_id(&self) -> i64 {
        self.paper_id
    }

    fn outcome(&self) -> i64 {
        self.outcome
    }

    fn topic_ids(&self) -> &[i64] {
        &self.topics
    }

    fn tag_value(&self, tag: &str) -> Option<i64> {
        self.tags.iter().find(|t| t.tag == tag).map(|t| t.value)
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn abstract_text(&self) -> &str {
        &self.abstract_text
    }

    fn authors(&self) -> &str {
        &self.authors
    }

    fn is_withdrawn(&self) -> bool {
        self.time_withdrawn > 0
    }

    fn is_submitted(&self) -> bool {
        self.time_submitted > 0
    }

    fn review_count(&self) -> i64 {
        self.review_rounds.len() as i64
    }

    fn review_rounds(&self) -> &[i64] {
        &self.review_rounds
    }
}

/// A viewer described by visibility flags and a conflict list.
///
/// Conflicted papers hide their decision, reviews and tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperViewer {
    decisions_visible: bool,
    authors_visible: bool,
    conflicts: BTreeSet<i64>,
}

impl PaperViewer {
    /// A viewer that can see everything (e.g. an unconflicted chair).
    pub fn omniscient() -> Self {
        Self {
            decisions_visible: true,
            authors_visible: true,
            conflicts: BTreeSet::new(),
        }
    }

    /// A blind-review committee member before decisions are released.
    pub fn committee_member() -> Self {
        Self {
            decisions_visible: false,
            authors_visible: false,
            conflicts: BTreeSet::new(),
        }
    }

    /// Sets whether decisions are visible on unconflicted papers.
    pub fn with_decisions_visible(mut self, visible: bool) -> Self {
        self.decisions_visible = visible;
        self
    }

    /// Sets whether authors are visible.
    pub fn with_authors_visible(mut self, visible: bool) -> Self {
        self.authors_visible = visible;
        self
    }

    /// Marks the viewer as conflicted with `paper_id`.
    pub fn with_conflict(mut self, paper_id: i64) -> Self {
        self.conflicts.insert(paper_id);
        self
    }

    fn is_conflicted(&self, paper: &dyn PaperRecord) -> bool {
        self.conflicts.contains(&paper.paper_id())
    }
}

impl Viewer for PaperViewer {
    fn can_view_decision(&self, paper: &dyn PaperRecord) -> bool {
        self.decisions_visible && !self.is_conflicted(paper)
    }

    fn can_view_authors(&self, _paper: &dyn PaperRecord) -> bool {
        self.authors_visible
    }

    fn can_view_tag(&self, paper: &dyn PaperRecord, _tag: &str) -> bool {
        !self.is_conflicted(paper)
    }

    fn can_view_reviews(&self, paper: &dyn PaperRecord) -> bool {
        !self.is_conflicted(paper)
    }
}
