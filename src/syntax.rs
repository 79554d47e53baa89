//! Token model and the tokenizer contract
//!
//! The engine never highlights anything itself - a host-side tokenizer (e.g.
//! a tree-sitter pipeline) implements `TokenSource`. Tokens only bias where
//! lines break; they never alter rendered text.

/// Token categories (universal across languages)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Function,
    Type,
    String,
    Number,
    Comment,
    Constant,
    Operator,
    Punctuation,
    Variable,
    Whitespace,
    Text,
}

/// One token of a logical line. Tokens for a line concatenate to exactly that
/// line's text, in left-to-right order.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Token length in columns (chars).
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The tokenizer capability the host provides.
pub trait TokenSource {
    /// Tokenize one logical line. The concatenated token texts must equal
    /// `line_text`.
    fn tokenize(&self, line_text: &str) -> Vec<Token>;
}

/// Fallback tokenizer: the whole line is a single text token. Hosts without
/// a highlighter get whitespace/punctuation break heuristics only.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTokens;

impl TokenSource for PlainTokens {
    fn tokenize(&self, line_text: &str) -> Vec<Token> {
        if line_text.is_empty() {
            return Vec::new();
        }
        vec![Token::new(TokenKind::Text, line_text)]
    }
}

/// Cumulative column offsets of token edges: `[0, t0, t0+t1, ...]`. The wrap
/// engine treats these as candidate break columns.
pub fn token_boundaries(tokens: &[Token]) -> Vec<usize> {
    let mut bounds = Vec::with_capacity(tokens.len() + 1);
    let mut col = 0;
    bounds.push(col);
    for token in tokens {
        col += token.len();
        bounds.push(col);
    }
    bounds
}
