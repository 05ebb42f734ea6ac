//! Non-fatal diagnostics collected while parsing a search.

use std::fmt;

/// One parse problem that did not stop compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchWarning {
    /// Human-readable description.
    pub message: String,
    /// The search text that caused the warning.
    pub source_text: String,
}

impl fmt::Display for SearchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Append-only collector for [`SearchWarning`]s.
///
/// Owned by the caller of one parse pass and read once parsing completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchWarnings {
    items: Vec<SearchWarning>,
}

impl SearchWarnings {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning about `source_text`.
    pub fn push(&mut self, source_text: impl Into<String>, message: impl Into<String>) {
        let warning = SearchWarning {
            message: message.into(),
            source_text: source_text.into(),
        };
        tracing::debug!(source = %warning.source_text, "search warning: {}", warning.message);
        self.items.push(warning);
    }

    /// Returns the number of recorded warnings.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates warnings in the order they were recorded.
    pub fn iter(&self) -> std::slice::Iter<'_, SearchWarning> {
        self.items.iter()
    }

    /// Returns the warning messages in order.
    pub fn messages(&self) -> Vec<&str> {
        self.items.iter().map(|w| w.message.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a SearchWarnings {
    type Item = &'a SearchWarning;
    type IntoIter = std::slice::Iter<'a, SearchWarning>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for SearchWarnings {
    type Item = SearchWarning;
    type IntoIter = std::vec::IntoIter<SearchWarning>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_preserve_order() {
        let mut warnings = SearchWarnings::new();
        assert!(warnings.is_empty());

        warnings.push("dec:maybe", "Unknown decision “maybe”.");
        warnings.push("round:R9", "Unknown review round “R9”.");

        assert_eq!(warnings.len(), 2);
        assert_eq!(
            warnings.messages(),
            vec!["Unknown decision “maybe”.", "Unknown review round “R9”."]
        );
        let first = warnings.iter().next().unwrap();
        assert_eq!(first.source_text, "dec:maybe");
        assert_eq!(first.to_string(), "Unknown decision “maybe”.");
    }
}
