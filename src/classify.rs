use crate::token::TokenType;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$").unwrap()
});

static RE_IPV4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)$").unwrap()
});

static RE_IPV4_MASK: Lazy<Regex> = Lazy::new(|| {
    // CIDR form: 10.0.0.0/8
    Regex::new(r"^(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)/(?:3[0-2]|[12]?\d)$").unwrap()
});

static RE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    // Decimal with optional sign, fraction and exponent, or a hex literal
    Regex::new(r"^(?:[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?|0[xX][0-9a-fA-F]+)$").unwrap()
});

static RE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:[a-zA-Z][a-zA-Z0-9+.-]*://|www\.)[^\s"'<>]+$"#).unwrap()
});

static RE_UUID_V4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-4[0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$").unwrap()
});

static RE_HEROKU_API_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}$").unwrap()
});

pub fn is_email(word: &str) -> bool {
    RE_EMAIL.is_match(word)
}

pub fn is_ip(word: &str) -> bool {
    RE_IPV4.is_match(word)
}

pub fn is_ip_with_mask(word: &str) -> bool {
    RE_IPV4_MASK.is_match(word)
}

pub fn is_number(word: &str) -> bool {
    RE_NUMBER.is_match(word)
}

pub fn is_url(word: &str) -> bool {
    RE_URL.is_match(word)
}

pub fn is_uuid(word: &str) -> bool {
    RE_UUID_V4.is_match(word) || RE_HEROKU_API_KEY.is_match(word)
}

pub fn is_whitespace(unit: &str) -> bool {
    !unit.is_empty() && unit.chars().all(char::is_whitespace)
}

/// Assigns at most one [`TokenType`] to a single non-whitespace word.
pub trait TokenClassifier {
    fn classify(&self, word: &str) -> Option<TokenType>;
}

/// Regex-backed classifier. First match wins:
/// sentinel, email, ip (incl. CIDR), number, url, path sentinel, uuid.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl TokenClassifier for DefaultClassifier {
    fn classify(&self, word: &str) -> Option<TokenType> {
        if word == TokenType::Email.name() || is_email(word) {
            return Some(TokenType::Email);
        }
        if word == TokenType::Ip.name() || is_ip(word) || is_ip_with_mask(word) {
            return Some(TokenType::Ip);
        }
        if word == TokenType::Number.name() || is_number(word) {
            return Some(TokenType::Number);
        }
        if word == TokenType::Url.name() || is_url(word) {
            return Some(TokenType::Url);
        }
        if word == TokenType::Path.name() || word == "_PATH_" {
            return Some(TokenType::Path);
        }
        if word == TokenType::Uuid.name() || is_uuid(word) {
            return Some(TokenType::Uuid);
        }
        None
    }
}
