//! Recursive descent parser for search expressions.

use super::context::{find_similar_name, SearchContext};
use super::lexer::{Lexer, PositionedToken, SearchToken};
use super::term::{
    DecisionTerm, PaperIdTerm, ReviewCountTerm, RoundTerm, SearchTerm, StatusTerm, TagTerm,
    TextField, TextTerm, TopicTerm,
};
use super::warnings::SearchWarnings;

/// The keyword before the `:` in a `keyword:value` word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `dec:`, `decision:`
    Decision,
    /// `topic:`
    Topic,
    /// `tag:`
    Tag,
    /// `ti:`, `title:`
    Title,
    /// `ab:`, `abstract:`
    Abstract,
    /// `au:`, `author:`, `authors:`
    Authors,
    /// `re:`, `reviews:`
    Reviews,
    /// `round:`
    Round,
    /// `pid:`
    PaperId,
    /// `is:`
    Is,
}

impl Keyword {
    const NAMES: &'static [(&'static str, Keyword)] = &[
        ("dec", Keyword::Decision),
        ("decision", Keyword::Decision),
        ("topic", Keyword::Topic),
        ("tag", Keyword::Tag),
        ("ti", Keyword::Title),
        ("title", Keyword::Title),
        ("ab", Keyword::Abstract),
        ("abstract", Keyword::Abstract),
        ("au", Keyword::Authors),
        ("author", Keyword::Authors),
        ("authors", Keyword::Authors),
        ("re", Keyword::Reviews),
        ("reviews", Keyword::Reviews),
        ("round", Keyword::Round),
        ("pid", Keyword::PaperId),
        ("is", Keyword::Is),
    ];

    /// Looks up a keyword by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, keyword)| *keyword)
    }

    /// Builds the leaf term for `value`.
    fn parse_value(
        self,
        value: &str,
        context: &SearchContext<'_>,
        warnings: &mut SearchWarnings,
    ) -> SearchTerm {
        match self {
            Keyword::Decision => DecisionTerm::parse(value, context, warnings),
            Keyword::Topic => TopicTerm::parse(value, context, warnings),
            Keyword::Tag => TagTerm::parse(value, context, warnings),
            Keyword::Title => TextTerm::parse(TextField::Title, value, context, warnings),
            Keyword::Abstract => TextTerm::parse(TextField::Abstract, value, context, warnings),
            Keyword::Authors => TextTerm::parse(TextField::Authors, value, context, warnings),
            Keyword::Reviews => ReviewCountTerm::parse(value, context, warnings),
            Keyword::Round => RoundTerm::parse(value, context, warnings),
            Keyword::PaperId => PaperIdTerm::parse(value, context, warnings),
            Keyword::Is => StatusTerm::parse(value, context, warnings),
        }
    }
}

/// Parses one search word into a leaf term.
///
/// * `#12`, `12`, `3-9` - paper ids
/// * `#name` - tag
/// * `keyword:value` - the keyword's leaf kind
/// * anything else - text in title, abstract or authors
pub fn parse_word(
    word: &str,
    context: &SearchContext<'_>,
    warnings: &mut SearchWarnings,
) -> SearchTerm {
    if let Some(rest) = word.strip_prefix('#') {
        if PaperIdTerm::looks_like_id(rest) {
            return PaperIdTerm::parse(rest, context, warnings);
        }
        return TagTerm::parse(rest, context, warnings);
    }

    if PaperIdTerm::looks_like_id(word) {
        return PaperIdTerm::parse(word, context, warnings);
    }

    if let Some((name, value)) = word.split_once(':') {
        if let Some(keyword) = Keyword::from_name(name) {
            return keyword.parse_value(value, context, warnings);
        }
        if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic()) {
            let suggestion =
                find_similar_name(name, Keyword::NAMES.iter().map(|(n, _)| *n));
            let message = match suggestion {
                Some(s) => format!("Unknown search keyword \"{name}:\". Did you mean \"{s}:\"?"),
                None => format!("Unknown search keyword \"{name}:\"."),
            };
            warnings.push(word, message);
            return SearchTerm::False;
        }
    }

    TextTerm::parse_any_field(word, context, warnings)
}

/// Parser for search expressions.
///
/// This parser implements a recursive descent parser over the token stream
/// produced by the [`Lexer`]. It never fails: grammar problems are recorded as
/// warnings and parsing continues with the rest of the input.
///
/// # Grammar
///
/// ```text
/// expression ::= or_expr
/// or_expr    ::= and_expr (("OR" | "|" | "||") and_expr)*
/// and_expr   ::= unary (("AND" | "&" | "&&")? unary)*
/// unary      ::= ("NOT" | "!" | "-") unary | primary
/// primary    ::= "(" expression ")" | word | phrase
/// ```
///
/// # Operator Precedence (highest to lowest)
///
/// 1. NOT - unary
/// 2. AND - explicit or by juxtaposition
/// 3. OR
///
/// # Example
///
/// ```
/// use paper_search::search::{LabelTable, SearchContext, SearchParser, SearchTerm, SearchWarnings, TopicTable};
///
/// let topics = TopicTable::new([(1, "Networking")]);
/// let decisions = LabelTable::new([("accept", 1), ("reject", -1)]);
/// let rounds = LabelTable::new([("R1", 1)]);
/// let context = SearchContext::new(&topics, &decisions, &rounds);
///
/// let mut warnings = SearchWarnings::new();
/// let term = SearchParser::parse("dec:accept topic:net", &context, &mut warnings);
/// assert!(matches!(term, SearchTerm::And(_)));
/// assert!(warnings.is_empty());
/// ```
pub struct SearchParser<'a, 'w> {
    input: &'a str,
    tokens: Vec<PositionedToken>,
    position: usize,
    context: &'a SearchContext<'a>,
    warnings: &'w mut SearchWarnings,
    depth: usize,
    depth_exceeded: bool,
}

impl<'a, 'w> SearchParser<'a, 'w> {
    /// Parses a search expression into a term tree.
    ///
    /// An empty expression matches everything.
    pub fn parse(
        input: &'a str,
        context: &'a SearchContext<'a>,
        warnings: &'w mut SearchWarnings,
    ) -> SearchTerm {
        let lexed = Lexer::new(input).tokenize_with_errors();
        for error in &lexed.errors {
            warnings.push(input, error.to_string());
        }

        let mut parser = Self {
            input,
            tokens: lexed.tokens,
            position: 0,
            context,
            warnings,
            depth: 0,
            depth_exceeded: false,
        };
        parser.truncate();
        parser.parse_expression()
    }

    /// Drops every token after the `max_terms`-th word.
    fn truncate(&mut self) {
        let max_terms = self.context.max_terms();
        let cut = self
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| matches!(t.token, SearchToken::Word(_) | SearchToken::Phrase(_)))
            .nth(max_terms)
            .map(|(i, _)| i);
        if let Some(cut) = cut {
            self.tokens.truncate(cut);
            self.warnings.push(
                self.input,
                format!("Search too long; only the first {max_terms} terms were used."),
            );
        }
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&SearchToken> {
        self.tokens.get(self.position).map(|t| &t.token)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<SearchToken> {
        let token = self.tokens.get(self.position).map(|t| t.token.clone());
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Checks if the current token matches the expected token type.
    fn check(&self, expected: &SearchToken) -> bool {
        self.peek() == Some(expected)
    }

    /// Returns true if the current token can start a term.
    fn at_term(&self) -> bool {
        self.peek().is_some_and(SearchToken::starts_term)
    }

    /// Parses the whole input, skipping unmatched `)`.
    fn parse_expression(&mut self) -> SearchTerm {
        let mut parts = Vec::new();
        loop {
            if let Some(term) = self.parse_or_expr() {
                parts.push(term);
            }
            match self.advance() {
                None => break,
                Some(_) => self.warn("Ignoring unmatched \")\"."),
            }
        }
        SearchTerm::and_all(parts)
    }

    /// Parses OR expressions. Returns None if nothing was parsed.
    fn parse_or_expr(&mut self) -> Option<SearchTerm> {
        let mut alternatives = Vec::new();
        let mut after_or = false;

        loop {
            let term = self.parse_and_expr();
            let at_or = self.check(&SearchToken::Or);
            let parsed = term.is_some();
            match term {
                Some(term) => alternatives.push(term),
                None if after_or || at_or => self.warn("Ignoring \"OR\" with no search term."),
                None => {}
            }
            if !at_or {
                break;
            }
            self.advance();
            after_or = parsed;
        }

        match alternatives.len() {
            0 => None,
            1 => alternatives.pop(),
            _ => Some(SearchTerm::or_any(alternatives)),
        }
    }

    /// Parses AND expressions, including juxtaposed terms.
    fn parse_and_expr(&mut self) -> Option<SearchTerm> {
        let mut terms = Vec::new();

        loop {
            if self.check(&SearchToken::And) {
                self.advance();
                if terms.is_empty() || !self.at_term() {
                    self.warn("Ignoring \"AND\" with no search term.");
                }
                continue;
            }
            if !self.at_term() {
                break;
            }
            if let Some(term) = self.parse_unary_expr() {
                terms.push(term);
            }
        }

        match terms.len() {
            0 => None,
            1 => terms.pop(),
            _ => Some(SearchTerm::and_all(terms)),
        }
    }

    /// Parses unary expressions: `NOT unary | primary`.
    fn parse_unary_expr(&mut self) -> Option<SearchTerm> {
        if self.check(&SearchToken::Not) {
            self.advance();
            if !self.at_term() {
                self.warn("Ignoring \"NOT\" with no search term.");
                return None;
            }
            if self.depth >= self.context.max_depth() {
                self.skip_nested_operand();
                return Some(SearchTerm::False);
            }
            self.depth += 1;
            let inner = self.parse_unary_expr();
            self.depth -= 1;
            return inner.map(SearchTerm::negate);
        }

        self.parse_primary()
    }

    /// Parses a parenthesized group, a word or a phrase.
    fn parse_primary(&mut self) -> Option<SearchTerm> {
        match self.advance()? {
            SearchToken::OpenParen => {
                if self.depth >= self.context.max_depth() {
                    self.warn_too_deep();
                    self.skip_group();
                    return Some(SearchTerm::False);
                }
                self.depth += 1;
                let inner = self.parse_or_expr();
                self.depth -= 1;
                if self.check(&SearchToken::CloseParen) {
                    self.advance();
                } else {
                    self.warn("Missing \")\".");
                }
                Some(inner.unwrap_or(SearchTerm::True))
            }
            SearchToken::Word(word) => Some(parse_word(&word, self.context, self.warnings)),
            SearchToken::Phrase(text) => {
                Some(TextTerm::parse_any_field(&text, self.context, self.warnings))
            }
            SearchToken::Not | SearchToken::And | SearchToken::Or | SearchToken::CloseParen => None,
        }
    }

    /// Skips the operand of a negation nested past the depth limit.
    fn skip_nested_operand(&mut self) {
        self.warn_too_deep();
        while self.check(&SearchToken::Not) {
            self.advance();
        }
        if self.check(&SearchToken::OpenParen) {
            self.advance();
            self.skip_group();
        } else if self.at_term() {
            self.advance();
        }
    }

    /// Skips tokens through the `)` closing an already consumed `(`.
    fn skip_group(&mut self) {
        let mut open = 1usize;
        while let Some(token) = self.advance() {
            match token {
                SearchToken::OpenParen => open += 1,
                SearchToken::CloseParen => {
                    open -= 1;
                    if open == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    /// Warns once per search that nesting passed the depth limit.
    fn warn_too_deep(&mut self) {
        if self.depth_exceeded {
            return;
        }
        self.depth_exceeded = true;
        let max_depth = self.context.max_depth();
        self.warn(&format!(
            "Search nested too deeply; terms below depth {max_depth} were ignored."
        ));
    }

    /// Records a grammar warning about the token just consumed.
    fn warn(&mut self, message: &str) {
        let input = self.input;
        let source = self
            .tokens
            .get(self.position.saturating_sub(1))
            .map_or(input, |t| &input[t.position..]);
        self.warnings.push(source, message);
    }
}
