//! Title, abstract and author text search.

use serde::{Deserialize, Serialize};

use crate::record::{PaperRecord, Viewer};
use crate::search::condition::ConditionNode;
use crate::search::context::{SearchContext, SqlQuoter, StandardQuoter};
use crate::search::query_info::SearchQueryInfo;
use crate::search::warnings::SearchWarnings;

use super::SearchTerm;

/// A searchable text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    /// The paper title.
    Title,
    /// The abstract.
    Abstract,
    /// Author information.
    Authors,
}

impl TextField {
    /// Returns the `Paper` column holding this field.
    pub fn column(self) -> &'static str {
        match self {
            TextField::Title => "title",
            TextField::Abstract => "abstract",
            TextField::Authors => "authorInformation",
        }
    }

    /// Reads this field from a record.
    pub fn read(self, record: &dyn PaperRecord) -> &str {
        match self {
            TextField::Title => record.title(),
            TextField::Abstract => record.abstract_text(),
            TextField::Authors => record.authors(),
        }
    }
}

/// Escapes `LIKE` wildcards with a backslash.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// ASCII case-insensitive substring test, the in-memory twin of SQL `LIKE '%text%'`.
pub(crate) fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// Matches papers whose text field contains a phrase (ASCII case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTerm {
    field: TextField,
    text: String,
    quoted_pattern: String,
    quoted_escape: String,
    quoted_empty: String,
}

impl TextTerm {
    /// Creates a text term with standard SQL quoting.
    pub fn new(field: TextField, text: impl Into<String>) -> Self {
        Self::with_quoter(field, text, &StandardQuoter)
    }

    /// Creates a text term whose SQL literals are produced by `quoter`.
    pub fn with_quoter(field: TextField, text: impl Into<String>, quoter: &dyn SqlQuoter) -> Self {
        let text = text.into();
        let quoted_pattern = quoter.quote(&format!("%{}%", escape_like(&text)));
        let quoted_escape = quoter.quote("\\");
        let quoted_empty = quoter.quote("");
        Self {
            field,
            text,
            quoted_pattern,
            quoted_escape,
            quoted_empty,
        }
    }

    /// Returns the searched field.
    pub fn field(&self) -> TextField {
        self.field
    }

    /// Returns the searched phrase.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parses the value of a `ti:`, `ab:` or `au:` word.
    pub fn parse(
        field: TextField,
        value: &str,
        context: &SearchContext<'_>,
        warnings: &mut SearchWarnings,
    ) -> SearchTerm {
        let value = value.trim();
        if value.is_empty() {
            warnings.push(value, "Text search needs some text.");
            return SearchTerm::False;
        }
        Self::with_quoter(field, value, context.quoter()).into()
    }

    /// Parses a bare word, which searches title, abstract and authors.
    pub fn parse_any_field(
        value: &str,
        context: &SearchContext<'_>,
        warnings: &mut SearchWarnings,
    ) -> SearchTerm {
        SearchTerm::or_any(
            [TextField::Title, TextField::Abstract, TextField::Authors]
                .into_iter()
                .map(|field| Self::parse(field, value, context, warnings))
                .collect(),
        )
    }

    /// Author lists may be hidden by blind review.
    pub(crate) fn trivial_rights(&self) -> bool {
        self.field != TextField::Authors
    }

    pub(crate) fn declare_columns(&self, info: &mut SearchQueryInfo) {
        info.add_column(format!("Paper.{}", self.field.column()));
    }

    /// A NULL column reads as empty text, as it does in memory.
    pub(crate) fn sql_fragment(&self) -> String {
        format!(
            "coalesce({}, {}) like {} escape {}",
            self.field.column(),
            self.quoted_empty,
            self.quoted_pattern,
            self.quoted_escape
        )
    }

    pub(crate) fn evaluate(&self, record: &dyn PaperRecord, viewer: &dyn Viewer) -> bool {
        if self.field == TextField::Authors && !viewer.can_view_authors(record) {
            return false;
        }
        contains_ignore_ascii_case(self.field.read(record), &self.text)
    }

    pub(crate) fn compile_condition(&self) -> ConditionNode {
        ConditionNode::Text {
            field: self.field,
            text: self.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_sql_fragment_escapes_wildcards() {
        let term = TextTerm::new(TextField::Title, "100%");
        assert_eq!(
            term.sql_fragment(),
            "coalesce(title, '') like '%100\\%%' escape '\\'"
        );
    }

    #[test]
    fn test_contains_ignore_ascii_case() {
        assert!(contains_ignore_ascii_case("Deep Learning", "LEARN"));
        assert!(!contains_ignore_ascii_case("Deep Learning", "learned"));
    }
}
