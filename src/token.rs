use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category assigned to a lexical unit by the classifier.
///
/// The wildcard is not a category: it only appears through merging and is
/// modelled by [`Token::Wildcard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    #[serde(rename = "NUM")]
    Number,
    #[serde(rename = "EMAIL")]
    Email,
    #[serde(rename = "IP")]
    Ip,
    #[serde(rename = "URL")]
    Url,
    #[serde(rename = "PATH")]
    Path,
    #[serde(rename = "UUID")]
    Uuid,
    #[serde(rename = "SPACE")]
    Whitespace,
}

impl TokenType {
    pub const ALL: [TokenType; 7] = [
        TokenType::Number,
        TokenType::Email,
        TokenType::Ip,
        TokenType::Url,
        TokenType::Path,
        TokenType::Uuid,
        TokenType::Whitespace,
    ];

    /// Canonical marker name, also accepted by the classifier as an
    /// already-tagged sentinel word.
    pub fn name(self) -> &'static str {
        match self {
            TokenType::Number => "NUM",
            TokenType::Email => "EMAIL",
            TokenType::Ip => "IP",
            TokenType::Url => "URL",
            TokenType::Path => "PATH",
            TokenType::Uuid => "UUID",
            TokenType::Whitespace => "SPACE",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One unit of a tokenized line or of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Token {
    /// Untyped word or punctuation.
    Literal(String),
    /// Classified unit. `text` is the original word until the pattern is abstracted.
    Typed {
        kind: TokenType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// "Any value appeared here".
    Wildcard,
}

impl Token {
    pub fn literal(text: impl Into<String>) -> Self {
        Token::Literal(text.into())
    }

    pub fn typed(kind: TokenType, text: impl Into<String>) -> Self {
        Token::Typed { kind, text: Some(text.into()) }
    }

    pub fn marker(kind: TokenType) -> Self {
        Token::Typed { kind, text: None }
    }

    pub fn kind(&self) -> Option<TokenType> {
        match self {
            Token::Typed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Literal text, or the original text of a typed token that has not been abstracted.
    pub fn text(&self) -> Option<&str> {
        match self {
            Token::Literal(t) => Some(t),
            Token::Typed { text, .. } => text.as_deref(),
            Token::Wildcard => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Token::Wildcard)
    }

    /// True once the token carries either text or a type, never both.
    pub fn is_abstract(&self) -> bool {
        !matches!(self, Token::Typed { text: Some(_), .. })
    }
}
