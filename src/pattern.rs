use crate::token::{Token, TokenType};
use itertools::Itertools;

pub const WILDCARD_GLYPH: &str = "*";

/// Drops the original text of typed tokens so every token is text or type, never both.
pub fn abstract_pattern(tokens: &mut [Token]) {
    for token in tokens.iter_mut() {
        if let Token::Typed { text, .. } = token {
            *text = None;
        }
    }
}

pub fn abstracted(tokens: &[Token]) -> Vec<Token> {
    let mut out = tokens.to_vec();
    abstract_pattern(&mut out);
    out
}

/// Collapses every run of consecutive wildcards into a single wildcard.
pub fn compress_pattern(tokens: &[Token]) -> Vec<Token> {
    tokens
        .iter()
        .cloned()
        .coalesce(|prev, next| {
            if prev.is_wildcard() && next.is_wildcard() {
                Ok(prev)
            } else {
                Err((prev, next))
            }
        })
        .collect()
}

pub fn render_token(token: &Token) -> String {
    match token {
        Token::Literal(text) => text.clone(),
        Token::Typed { kind: TokenType::Whitespace, .. } => " ".to_string(),
        Token::Typed { kind, .. } => format!("<{kind}>"),
        Token::Wildcard => WILDCARD_GLYPH.to_string(),
    }
}

/// Human-readable form: literals verbatim, one space per whitespace run,
/// `*` for wildcards and `<NUM>`-style markers for other types.
pub fn render_pattern(tokens: &[Token]) -> String {
    tokens.iter().map(render_token).collect()
}

/// Hex MD5 digest; used for dedup keys and pattern ids.
pub fn content_hash(content: &str) -> String {
    format!("{:x}", md5::compute(content.as_bytes()))
}

/// Content-derived id of a pattern: the digest of the serialized abstracted
/// (uncompressed) token sequence.
pub fn pattern_id(tokens: &[Token]) -> Result<String, serde_json::Error> {
    let serialized = serde_json::to_string(&abstracted(tokens))?;
    Ok(content_hash(&serialized))
}
