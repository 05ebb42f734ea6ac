//! Search settings: decision labels, review rounds, topics and limits.
//!
//! Settings live in a TOML file found through [`settings_path`]:
//!
//! 1. `PAPER_SEARCH_CONFIG`, if set, names the file directly.
//! 2. Otherwise `$XDG_CONFIG_HOME/paper-search/search.toml`.
//! 3. Otherwise `~/.config/paper-search/search.toml`.
//!
//! A missing file yields [`SearchSettings::default`].

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::search::{
    LabelTable, SearchContext, SearchError, SearchResult, TopicTable, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_TERMS,
};

/// Environment variable naming the settings file.
pub const SETTINGS_ENV_VAR: &str = "PAPER_SEARCH_CONFIG";

/// Current settings schema version.
pub const SETTINGS_VERSION: u32 = 1;

const SETTINGS_DIR_NAME: &str = "paper-search";
const SETTINGS_FILE_NAME: &str = "search.toml";

/// Settings file written by [`write_default_settings`].
pub const DEFAULT_SETTINGS: &str = r#"# paper-search settings

# Settings schema version (do not modify)
version = 1

# Decision labels and their outcome codes.
# Positive codes are accepting decisions, negative codes rejecting ones.
[decisions]
accept = 1
reject = -1

# Review round names and their ids.
[rounds]
# R1 = 1
# R2 = 2

# Conference topics.
# [[topics]]
# id = 1
# name = "Networking"

[limits]
# max_terms = 256
# max_depth = 64
"#;

/// Settings file structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Settings schema version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Decision label → outcome code.
    #[serde(default = "default_decisions")]
    pub decisions: BTreeMap<String, i64>,

    /// Review round name → round id.
    #[serde(default)]
    pub rounds: BTreeMap<String, i64>,

    /// Conference topics.
    #[serde(default)]
    pub topics: Vec<TopicSetting>,

    /// Search limits.
    #[serde(default)]
    pub limits: SearchLimits,
}

/// One configured topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSetting {
    /// Topic id.
    pub id: i64,
    /// Display name, matched by abbreviations.
    pub name: String,
}

/// Limits applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Maximum number of words in one search.
    #[serde(default = "default_max_terms")]
    pub max_terms: usize,

    /// Maximum nesting of parentheses and negations.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_terms: DEFAULT_MAX_TERMS,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_max_terms() -> usize {
    DEFAULT_MAX_TERMS
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_decisions() -> BTreeMap<String, i64> {
    BTreeMap::from([("accept".to_string(), 1), ("reject".to_string(), -1)])
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            decisions: default_decisions(),
            rounds: BTreeMap::new(),
            topics: Vec::new(),
            limits: SearchLimits::default(),
        }
    }
}

impl SearchSettings {
    /// Loads settings from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if no settings directory can be determined, or if
    /// the file exists but cannot be read or parsed.
    pub fn load() -> SearchResult<Self> {
        Self::load_from(&settings_path()?)
    }

    /// Loads settings from `path`, or defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// declares a newer schema version.
    pub fn load_from(path: &Path) -> SearchResult<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| SearchError::ReadSettings {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml(&content).map_err(|source| SearchError::ParseSettings {
            path: path.to_path_buf(),
            source,
        })?;

        if settings.version > SETTINGS_VERSION {
            return Err(SearchError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_VERSION,
            });
        }
        tracing::debug!(
            path = %path.display(),
            decisions = settings.decisions.len(),
            rounds = settings.rounds.len(),
            topics = settings.topics.len(),
            "loaded search settings"
        );
        Ok(settings)
    }

    /// Parses settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Builds the decision label table.
    pub fn decision_table(&self) -> LabelTable {
        LabelTable::new(self.decisions.iter().map(|(name, code)| (name.as_str(), *code)))
    }

    /// Builds the review round table.
    pub fn round_table(&self) -> LabelTable {
        LabelTable::new(self.rounds.iter().map(|(name, id)| (name.as_str(), *id)))
    }

    /// Builds the topic table.
    pub fn topic_table(&self) -> TopicTable {
        TopicTable::new(self.topics.iter().map(|t| (t.id, t.name.as_str())))
    }
}

/// Tables built from [`SearchSettings`] that a [`SearchContext`] borrows.
#[derive(Debug, Clone)]
pub struct SearchTables {
    /// Topic abbreviations.
    pub topics: TopicTable,
    /// Decision labels.
    pub decisions: LabelTable,
    /// Review rounds.
    pub rounds: LabelTable,
    /// Word limit.
    pub max_terms: usize,
    /// Nesting limit.
    pub max_depth: usize,
}

impl SearchTables {
    /// Builds every lookup table from settings.
    pub fn new(settings: &SearchSettings) -> Self {
        Self {
            topics: settings.topic_table(),
            decisions: settings.decision_table(),
            rounds: settings.round_table(),
            max_terms: settings.limits.max_terms,
            max_depth: settings.limits.max_depth,
        }
    }

    /// Returns a context borrowing these tables.
    pub fn context(&self) -> SearchContext<'_> {
        SearchContext::new(&self.topics, &self.decisions, &self.rounds)
            .with_max_terms(self.max_terms)
            .with_max_depth(self.max_depth)
    }
}

/// Gets the settings directory.
fn settings_dir() -> SearchResult<PathBuf> {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join(SETTINGS_DIR_NAME));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join(SETTINGS_DIR_NAME))
        .ok_or(SearchError::NoConfigDir)
}

/// Gets the settings file path.
///
/// # Errors
///
/// Returns [`SearchError::NoConfigDir`] if neither `PAPER_SEARCH_CONFIG` nor a
/// home directory is available.
pub fn settings_path() -> SearchResult<PathBuf> {
    if let Ok(path) = env::var(SETTINGS_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    Ok(settings_dir()?.join(SETTINGS_FILE_NAME))
}

/// Writes [`DEFAULT_SETTINGS`] to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`SearchError::WriteSettings`] if the directory or file cannot be written.
pub fn write_default_settings(path: &Path) -> SearchResult<()> {
    let io_error = |source| SearchError::WriteSettings {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, DEFAULT_SETTINGS).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{AbbreviationMatcher, LabelMatch};

    #[test]
    fn test_default_settings() {
        let settings = SearchSettings::default();
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.decisions.get("accept"), Some(&1));
        assert_eq!(settings.decisions.get("reject"), Some(&-1));
        assert!(settings.topics.is_empty());
        assert_eq!(settings.limits.max_terms, DEFAULT_MAX_TERMS);
    }

    #[test]
    fn test_default_settings_text_parses_to_defaults() {
        let settings = SearchSettings::from_toml(DEFAULT_SETTINGS).unwrap();
        assert_eq!(settings, SearchSettings::default());
    }

    #[test]
    fn test_parse_full_settings() {
        let settings = SearchSettings::from_toml(
            r#"
            version = 1

            [decisions]
            "accept as poster" = 2
            accept = 1
            reject = -1

            [rounds]
            R1 = 1
            R2 = 2

            [[topics]]
            id = 4
            name = "Networking"

            [[topics]]
            id = 5
            name = "Network security"

            [limits]
            max_terms = 10
            "#,
        )
        .unwrap();

        assert_eq!(settings.decisions.len(), 3);
        assert_eq!(settings.limits.max_terms, 10);

        let decisions = settings.decision_table();
        assert_eq!(decisions.exact("Accept as poster"), Some(2));

        let rounds = settings.round_table();
        assert_eq!(rounds.resolve("r2"), LabelMatch::Unique(2));

        let topics = settings.topic_table();
        assert_eq!(topics.find_all("net"), vec![4, 5]);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let settings = SearchSettings::from_toml("[rounds]\nR1 = 1\n").unwrap();
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert_eq!(settings.decisions, default_decisions());
        assert_eq!(settings.limits.max_terms, DEFAULT_MAX_TERMS);
        assert_eq!(settings.limits.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_invalid_settings_fail_to_parse() {
        assert!(SearchSettings::from_toml("decisions = 3").is_err());
        assert!(SearchSettings::from_toml("[[topics]]\nname = \"x\"").is_err());
    }

    #[test]
    fn test_tables_build_context() {
        let mut settings = SearchSettings::default();
        settings.limits.max_terms = 3;
        settings.limits.max_depth = 5;
        let tables = SearchTables::new(&settings);
        let context = tables.context();
        assert_eq!(context.max_terms(), 3);
        assert_eq!(context.max_depth(), 5);
        assert_eq!(context.decisions().exact("reject"), Some(-1));
    }
}
