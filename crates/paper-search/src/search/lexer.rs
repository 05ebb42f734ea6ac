//! Lexer (tokenizer) for search expressions.

use std::iter::Peekable;
use std::str::Chars;

/// Kinds of problems found during lexical analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerErrorKind {
    /// A quoted phrase was not closed before the end of input.
    UnterminatedQuote,
    /// A `-` with nothing to negate.
    StrayDash,
}

/// Error encountered during lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    /// What went wrong.
    pub kind: LexerErrorKind,
    /// The position (0-indexed byte offset) where the error occurred.
    pub position: usize,
}

impl std::fmt::Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            LexerErrorKind::UnterminatedQuote => {
                write!(f, "Missing closing quote for phrase at position {}.", self.position)
            }
            LexerErrorKind::StrayDash => {
                write!(f, "Ignoring \"-\" with no search term at position {}.", self.position)
            }
        }
    }
}

impl std::error::Error for LexerError {}

/// Result of tokenizing a search expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerResult {
    /// The tokens successfully parsed, with their positions.
    pub tokens: Vec<PositionedToken>,
    /// Any problems encountered; tokenizing always continues past them.
    pub errors: Vec<LexerError>,
}

/// A token with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken {
    /// The token.
    pub token: SearchToken,
    /// The byte position where the token starts (0-indexed).
    pub position: usize,
}

/// A token in a search expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchToken {
    // ==================== Words ====================
    /// A search word, possibly `keyword:value`. Quotes inside it are removed.
    Word(String),

    /// A standalone quoted phrase, always searched as text.
    Phrase(String),

    // ==================== Operators ====================
    /// `AND`, `&` or `&&`.
    And,

    /// `OR`, `|` or `||`.
    Or,

    /// `NOT`, `!` or a leading `-`.
    Not,

    /// Opening parenthesis `(`.
    OpenParen,

    /// Closing parenthesis `)`.
    CloseParen,
}

impl SearchToken {
    /// Returns true if this token can begin a unary expression.
    pub fn starts_term(&self) -> bool {
        matches!(
            self,
            SearchToken::Word(_) | SearchToken::Phrase(_) | SearchToken::Not | SearchToken::OpenParen
        )
    }
}

/// Lexer for tokenizing search expressions.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// Current byte position in the input string.
    position: usize,
    /// Errors encountered during tokenization.
    errors: Vec<LexerError>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
            errors: Vec::new(),
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    /// Consumes and returns the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if let Some(ch) = c {
            self.position += ch.len_utf8();
        }
        c
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.peek() {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Returns true if `c` ends a word.
    fn is_word_boundary(c: char) -> bool {
        c.is_whitespace() || c == '(' || c == ')'
    }

    /// Appends a quoted run (opening quote already consumed) to `out`.
    fn read_quoted_into(&mut self, quote_start: usize, out: &mut String) {
        while let Some(c) = self.next_char() {
            match c {
                '"' => return,
                '\\' => {
                    if let Some(escaped) = self.next_char() {
                        out.push(escaped);
                    }
                }
                _ => out.push(c),
            }
        }
        self.errors.push(LexerError {
            kind: LexerErrorKind::UnterminatedQuote,
            position: quote_start,
        });
    }

    /// Reads a word up to whitespace or a parenthesis, unquoting quoted runs.
    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(&c) = self.peek() {
            if Self::is_word_boundary(c) {
                break;
            }
            let start = self.position;
            self.next_char();
            if c == '"' {
                self.read_quoted_into(start, &mut word);
            } else {
                word.push(c);
            }
        }
        word
    }

    /// Consumes one more `c` if it follows (for `&&` and `||`).
    fn eat_double(&mut self, c: char) {
        if self.peek() == Some(&c) {
            self.next_char();
        }
    }

    /// Returns the next token with its position, or None if at end of input.
    pub fn next_token(&mut self) -> Option<PositionedToken> {
        self.skip_whitespace();

        let c = *self.peek()?;
        let token_start = self.position;

        let token = match c {
            '(' => {
                self.next_char();
                SearchToken::OpenParen
            }
            ')' => {
                self.next_char();
                SearchToken::CloseParen
            }
            '&' => {
                self.next_char();
                self.eat_double('&');
                SearchToken::And
            }
            '|' => {
                self.next_char();
                self.eat_double('|');
                SearchToken::Or
            }
            '!' => {
                self.next_char();
                SearchToken::Not
            }
            '-' => {
                self.next_char();
                match self.peek() {
                    Some(&next) if !next.is_whitespace() && next != ')' => SearchToken::Not,
                    _ => {
                        self.errors.push(LexerError {
                            kind: LexerErrorKind::StrayDash,
                            position: token_start,
                        });
                        return self.next_token();
                    }
                }
            }
            '"' => {
                self.next_char();
                let mut phrase = String::new();
                self.read_quoted_into(token_start, &mut phrase);
                SearchToken::Phrase(phrase)
            }
            _ => {
                let word = self.read_word();
                match word.as_str() {
                    "AND" => SearchToken::And,
                    "OR" => SearchToken::Or,
                    "NOT" => SearchToken::Not,
                    _ => SearchToken::Word(word),
                }
            }
        };

        Some(PositionedToken {
            token,
            position: token_start,
        })
    }

    /// Collects all tokens into a vector (without positions).
    #[cfg(test)]
    pub fn tokenize(self) -> Vec<SearchToken> {
        self.tokenize_with_errors()
            .tokens
            .into_iter()
            .map(|pt| pt.token)
            .collect()
    }

    /// Collects all tokens and any errors encountered.
    pub fn tokenize_with_errors(mut self) -> LexerResult {
        let mut tokens = Vec::new();
        while let Some(positioned_token) = self.next_token() {
            tokens.push(positioned_token);
        }
        LexerResult {
            tokens,
            errors: self.errors,
        }
    }
}
