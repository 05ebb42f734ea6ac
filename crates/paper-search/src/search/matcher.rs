//! Integer comparison matchers shared by SQL rendering and in-memory tests.
//!
//! A [`CountMatcher`] is the small value object behind every numeric search
//! word (`re:>2`, `dec:-1..1`, `pid:12`). The same matcher renders a SQL
//! comparison and tests an in-memory integer, and the two must always agree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::MatcherError;

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Decodes operator text. An empty string means `=`.
    fn from_text(text: &str) -> Option<Self> {
        match text {
            "" | "=" | "==" => Some(CompareOp::Eq),
            "!=" | "<>" | "≠" => Some(CompareOp::Ne),
            "<" => Some(CompareOp::Lt),
            "<=" | "≤" => Some(CompareOp::Le),
            ">" => Some(CompareOp::Gt),
            ">=" | "≥" => Some(CompareOp::Ge),
            _ => None,
        }
    }

    /// Returns the SQL spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Applies the operator as `lhs <op> rhs`.
    pub fn test(self, lhs: i64, rhs: i64) -> bool {
        match self {
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated integer comparison: an operator with an operand, or a closed
/// interval.
///
/// Serializes as its canonical text (`"=1"`, `">=2"`, `"1..3"`).
///
/// # Example
///
/// ```
/// use paper_search::search::CountMatcher;
///
/// let m = CountMatcher::parse(">=2").unwrap();
/// assert_eq!(m.sql_fragment("reviewCount"), "reviewCount >= 2");
/// assert!(m.matches(3));
/// assert!(!m.matches(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CountMatcher {
    /// `value <op> operand`
    Compare {
        /// The comparison operator.
        op: CompareOp,
        /// The right-hand operand.
        operand: i64,
    },
    /// `low <= value <= high`
    Range {
        /// Inclusive lower bound.
        low: i64,
        /// Inclusive upper bound.
        high: i64,
    },
}

impl CountMatcher {
    /// Creates a comparison matcher.
    pub fn new(op: CompareOp, operand: i64) -> Self {
        CountMatcher::Compare { op, operand }
    }

    /// Creates an `= operand` matcher.
    pub fn equals(operand: i64) -> Self {
        Self::new(CompareOp::Eq, operand)
    }

    /// Creates a closed interval matcher.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidRange`] if `low > high`.
    pub fn range(low: i64, high: i64) -> Result<Self, MatcherError> {
        if low > high {
            return Err(MatcherError::InvalidRange { low, high });
        }
        Ok(CountMatcher::Range { low, high })
    }

    /// Parses matcher text such as `3`, `>2`, `!= 0`, `<=-1` or `1..4`.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidOperator`] for unrecognized operator text,
    /// [`MatcherError::InvalidOperand`] for a missing or non-integer operand,
    /// and [`MatcherError::InvalidRange`] for an inverted interval.
    pub fn parse(text: &str) -> Result<Self, MatcherError> {
        let trimmed = text.trim();

        if let Some((low, high)) = trimmed.split_once("..") {
            let low = parse_operand(low, text)?;
            let high = parse_operand(high, text)?;
            return Self::range(low, high);
        }

        // The operator is the leading run of punctuation; signs belong to the operand.
        let op_end = trimmed
            .char_indices()
            .find(|&(_, c)| c.is_alphanumeric() || c.is_whitespace() || c == '-' || c == '+')
            .map_or(trimmed.len(), |(i, _)| i);
        let (op_text, operand) = trimmed.split_at(op_end);

        let op = CompareOp::from_text(op_text)
            .ok_or_else(|| MatcherError::invalid_operator(text))?;
        let operand = parse_operand(operand, text)?;
        Ok(Self::new(op, operand))
    }

    /// Renders the matcher as a SQL boolean expression over `column`.
    pub fn sql_fragment(&self, column: &str) -> String {
        match *self {
            CountMatcher::Compare { op, operand } => format!("{column} {op} {operand}"),
            CountMatcher::Range { low, high } => {
                format!("({column} >= {low} and {column} <= {high})")
            }
        }
    }

    /// Returns true if `value` satisfies the matcher.
    pub fn matches(&self, value: i64) -> bool {
        match *self {
            CountMatcher::Compare { op, operand } => op.test(value, operand),
            CountMatcher::Range { low, high } => low <= value && value <= high,
        }
    }
}

fn parse_operand(operand: &str, text: &str) -> Result<i64, MatcherError> {
    operand
        .trim()
        .parse::<i64>()
        .map_err(|_| MatcherError::invalid_operand(text))
}

impl fmt::Display for CountMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CountMatcher::Compare { op, operand } => write!(f, "{op}{operand}"),
            CountMatcher::Range { low, high } => write!(f, "{low}..{high}"),
        }
    }
}

impl FromStr for CountMatcher {
    type Err = MatcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CountMatcher {
    type Error = MatcherError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CountMatcher> for String {
    fn from(value: CountMatcher) -> Self {
        value.to_string()
    }
}
