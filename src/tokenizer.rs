use crate::classify::{self, DefaultClassifier, TokenClassifier};
use crate::token::{Token, TokenType};

const LEADING_PUNCT: &[char] = &['(', '[', '{', '<', '"', '\'', '`'];
const TRAILING_PUNCT: &[char] = &[',', '.', ':', ';', '!', '?', ')', ']', '}', '>', '"', '\'', '`'];

/// Tokenizes with the default regex classifier.
pub fn tokenize(text: &str) -> Vec<Token> {
    tokenize_with(text, &DefaultClassifier)
}

/// Splits `text` into whitespace runs, punctuation and words, keeping every
/// delimiter. Each whitespace run becomes one `SPACE` token; each word is
/// classified by `classifier` and falls back to a literal.
///
/// Rendered markers (`<NUM>`, `<IP>`, ...) are read back as typed tokens, so
/// tokenizing a rendered pattern keeps its types.
pub fn tokenize_with(text: &str, classifier: &dyn TokenClassifier) -> Vec<Token> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;
    for (i, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                push_unit(&text[start..i], classifier, &mut out);
                start = i;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if in_space.is_some() {
        push_unit(&text[start..], classifier, &mut out);
    }
    out
}

/// `<NAME>` at the start of `word` for any non-whitespace type; returns the
/// type and the byte length of the marker.
fn rendered_marker(word: &str) -> Option<(TokenType, usize)> {
    let inner = word.strip_prefix('<')?;
    let end = inner.find('>')?;
    let kind = TokenType::ALL
        .into_iter()
        .filter(|k| *k != TokenType::Whitespace)
        .find(|k| k.name() == &inner[..end])?;
    Some((kind, end + 2))
}

fn push_unit(unit: &str, classifier: &dyn TokenClassifier, out: &mut Vec<Token>) {
    if classify::is_whitespace(unit) {
        out.push(Token::typed(TokenType::Whitespace, unit));
        return;
    }
    let mut core = unit;
    loop {
        if let Some((kind, len)) = rendered_marker(core) {
            let rest = &core[len..];
            if rest.chars().all(|c| TRAILING_PUNCT.contains(&c)) {
                out.push(Token::typed(kind, &core[..len]));
                out.extend(rest.chars().map(|c| Token::literal(c.to_string())));
                return;
            }
        }
        match core.chars().next().filter(|c| LEADING_PUNCT.contains(c)) {
            Some(c) => {
                out.push(Token::literal(c.to_string()));
                core = &core[c.len_utf8()..];
            }
            None => break,
        }
    }
    let mut trailing = Vec::new();
    while let Some(c) = core.chars().next_back().filter(|c| TRAILING_PUNCT.contains(c)) {
        trailing.push(c);
        core = &core[..core.len() - c.len_utf8()];
    }
    if !core.is_empty() {
        out.push(classify_word(core, classifier));
    }
    out.extend(trailing.into_iter().rev().map(|c| Token::literal(c.to_string())));
}

fn classify_word(word: &str, classifier: &dyn TokenClassifier) -> Token {
    match classifier.classify(word) {
        Some(kind) => Token::typed(kind, word),
        None => Token::literal(word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::render_pattern;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text().unwrap_or("")).collect()
    }

    #[test]
    fn keeps_whitespace_and_splits_punctuation() {
        let tokens = tokenize("Ports: 3000, 5000 are in use.");
        assert_eq!(
            texts(&tokens),
            vec!["Ports", ":", " ", "3000", ",", " ", "5000", " ", "are", " ", "in", " ", "use", "."]
        );
        assert_eq!(tokens[2].kind(), Some(TokenType::Whitespace));
        assert_eq!(tokens[3].kind(), Some(TokenType::Number));
        assert_eq!(tokens[0], Token::literal("Ports"));
    }

    #[test]
    fn whitespace_run_is_one_token() {
        let tokens = tokenize("a \t  b");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1], Token::typed(TokenType::Whitespace, " \t  "));
    }

    #[test]
    fn brackets_are_peeled_around_typed_words() {
        let tokens = tokenize("(from 10.0.0.1) <ops@example.com>");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind()).collect();
        assert_eq!(texts(&tokens), vec!["(", "from", " ", "10.0.0.1", ")", " ", "<", "ops@example.com", ">"]);
        assert_eq!(kinds[3], Some(TokenType::Ip));
        assert_eq!(kinds[7], Some(TokenType::Email));
    }

    #[test]
    fn rendered_markers_read_back_as_types() {
        let tokens = tokenize("job <NUM> failed on (<IP>), code <NUM>.");
        assert_eq!(tokens[2], Token::typed(TokenType::Number, "<NUM>"));
        assert_eq!(tokens[8], Token::literal("("));
        assert_eq!(tokens[9], Token::typed(TokenType::Ip, "<IP>"));
        assert_eq!(tokens[10], Token::literal(")"));
        assert_eq!(tokens[11], Token::literal(","));
        assert_eq!(tokens[15], Token::typed(TokenType::Number, "<NUM>"));
        assert_eq!(tokens[16], Token::literal("."));
        assert_eq!(render_pattern(&tokens), "job <NUM> failed on (<IP>), code <NUM>.");
        // unknown names and trailing text stay ordinary words
        assert_eq!(texts(&tokenize("<FOO>")), vec!["<", "FOO", ">"]);
        assert_eq!(texts(&tokenize("<NUM>x")), vec!["<", "NUM>x"]);
        assert_eq!(texts(&tokenize("<SPACE>")), vec!["<", "SPACE", ">"]);
    }

    #[test]
    fn punctuation_only_chunk() {
        let tokens = tokenize("...");
        assert_eq!(texts(&tokens), vec![".", ".", "."]);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn custom_classifier_is_used() {
        struct Nothing;
        impl TokenClassifier for Nothing {
            fn classify(&self, _word: &str) -> Option<TokenType> {
                None
            }
        }
        let tokens = tokenize_with("port 3000", &Nothing);
        assert_eq!(tokens[2], Token::literal("3000"));
    }
}
