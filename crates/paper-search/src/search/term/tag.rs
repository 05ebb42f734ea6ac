//! `#tag` and `tag:` search words.

use crate::record::{PaperRecord, Viewer};
use crate::search::condition::ConditionNode;
use crate::search::context::{SearchContext, SqlQuoter, StandardQuoter};
use crate::search::matcher::CountMatcher;
use crate::search::query_info::{Join, SearchQueryInfo};
use crate::search::warnings::SearchWarnings;

use super::SearchTerm;

/// Characters that start a value comparison after a tag name.
const VALUE_START: &[char] = &['#', '=', '!', '<', '>', '≠', '≤', '≥'];

/// Returns true if `name` is a syntactically valid tag.
fn is_valid_tag(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '~' | ':' | '.'))
}

/// Matches papers carrying a tag, optionally with a value comparison.
///
/// The tag name is a string literal; it is quoted once at construction by the
/// storage collaborator's [`SqlQuoter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTerm {
    tag: String,
    value: Option<CountMatcher>,
    quoted_tag: String,
}

impl TagTerm {
    pub(crate) const TRIVIAL_RIGHTS: bool = false;

    /// Creates a tag term with standard SQL quoting.
    pub fn new(tag: impl Into<String>, value: Option<CountMatcher>) -> Self {
        Self::with_quoter(tag, value, &StandardQuoter)
    }

    /// Creates a tag term whose SQL literal is produced by `quoter`.
    pub fn with_quoter(
        tag: impl Into<String>,
        value: Option<CountMatcher>,
        quoter: &dyn SqlQuoter,
    ) -> Self {
        let tag = tag.into();
        let quoted_tag = quoter.quote(&tag);
        Self {
            tag,
            value,
            quoted_tag,
        }
    }

    /// Returns the tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the value matcher, if any.
    pub fn value(&self) -> Option<&CountMatcher> {
        self.value.as_ref()
    }

    /// Parses a tag word such as `award`, `order#>2`, or `rank<=3`.
    pub fn parse(
        value: &str,
        context: &SearchContext<'_>,
        warnings: &mut SearchWarnings,
    ) -> SearchTerm {
        let value = value.trim();
        let (name, matcher_text) = match value.find(VALUE_START) {
            Some(i) if value[i..].starts_with('#') => (&value[..i], Some(&value[i + 1..])),
            Some(i) => (&value[..i], Some(&value[i..])),
            None => (value, None),
        };

        if !is_valid_tag(name) {
            warnings.push(value, format!("Invalid tag \"{name}\"."));
            return SearchTerm::False;
        }

        let matcher = match matcher_text.map(CountMatcher::parse).transpose() {
            Ok(matcher) => matcher,
            Err(err) => {
                warnings.push(value, format!("Bad tag value search: {err}."));
                return SearchTerm::False;
            }
        };

        Self::with_quoter(name, matcher, context.quoter()).into()
    }

    pub(crate) fn declare_columns(&self, info: &mut SearchQueryInfo) {
        info.add_join(Join::Tags);
        info.add_column("PaperTags.paperTags");
    }

    pub(crate) fn sql_fragment(&self) -> String {
        let value_clause = self
            .value
            .map(|m| format!(" and {}", m.sql_fragment("PaperTag.tagIndex")))
            .unwrap_or_default();
        format!(
            "exists (select * from PaperTag where PaperTag.paperId = Paper.paperId \
             and PaperTag.tag = {}{value_clause})",
            self.quoted_tag
        )
    }

    /// A hidden tag counts as absent.
    pub(crate) fn evaluate(&self, record: &dyn PaperRecord, viewer: &dyn Viewer) -> bool {
        if !viewer.can_view_tag(record, &self.tag) {
            return false;
        }
        record
            .tag_value(&self.tag)
            .is_some_and(|v| self.value.map_or(true, |m| m.matches(v)))
    }

    pub(crate) fn compile_condition(&self) -> ConditionNode {
        ConditionNode::Tag {
            tag: self.tag.clone(),
            matcher: self.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tag_names() {
        assert!(is_valid_tag("award"));
        assert!(is_valid_tag("~mine"));
        assert!(is_valid_tag("pc:discuss"));
        assert!(!is_valid_tag(""));
        assert!(!is_valid_tag("bad'tag"));
    }

    #[test]
    fn test_sql_quotes_tag_literal() {
        let term = TagTerm::new("o'k", None);
        assert_eq!(
            term.sql_fragment(),
            "exists (select * from PaperTag where PaperTag.paperId = Paper.paperId \
             and PaperTag.tag = 'o''k')"
        );
    }
}
