use logcluster::align::{align, similarity, SimilarityNormalization};
use logcluster::pattern::{abstract_pattern, abstracted, compress_pattern, pattern_id, render_pattern};
use logcluster::{tokenize, Token, TokenType};

#[test]
fn tokenizes_typed_units() {
    let tokens = tokenize("GET https://example.com/a from 10.0.0.1 by ops@example.com took 1.5e3 id 3fa85f64-5717-4562-b3fc-2c963f66afa6");
    let kinds: Vec<TokenType> = tokens.iter().filter_map(Token::kind).filter(|k| *k != TokenType::Whitespace).collect();
    assert_eq!(
        kinds,
        vec![TokenType::Url, TokenType::Ip, TokenType::Email, TokenType::Number, TokenType::Uuid]
    );
    assert_eq!(tokens[0], Token::literal("GET"));
}

#[test]
fn rendering_round_trips_plain_text() {
    let line = "worker alpha started (pid 812)";
    let rendered = render_pattern(&tokenize(line));
    assert_eq!(rendered, "worker alpha started (pid <NUM>)");
}

#[test]
fn compression_is_idempotent_and_keeps_literals() {
    let tokens = vec![
        Token::Wildcard,
        Token::Wildcard,
        Token::literal("a"),
        Token::Wildcard,
        Token::literal("b"),
        Token::Wildcard,
        Token::Wildcard,
        Token::Wildcard,
    ];
    let once = compress_pattern(&tokens);
    assert_eq!(once, vec![Token::Wildcard, Token::literal("a"), Token::Wildcard, Token::literal("b"), Token::Wildcard]);
    assert_eq!(compress_pattern(&once), once);
    assert!(once.windows(2).all(|w| !(w[0].is_wildcard() && w[1].is_wildcard())));
}

#[test]
fn abstraction_drops_text_of_typed_tokens_only() {
    let mut tokens = tokenize("sent 12 bytes");
    abstract_pattern(&mut tokens);
    assert_eq!(
        tokens,
        vec![
            Token::literal("sent"),
            Token::marker(TokenType::Whitespace),
            Token::marker(TokenType::Number),
            Token::marker(TokenType::Whitespace),
            Token::literal("bytes"),
        ]
    );
    assert_eq!(abstracted(&tokens), tokens);
}

#[test]
fn pattern_id_depends_on_abstracted_structure() {
    let a = tokenize("sent 12 bytes");
    let b = tokenize("sent 99   bytes");
    assert_eq!(pattern_id(&a).unwrap(), pattern_id(&b).unwrap());
    let c = tokenize("sent twelve bytes");
    assert_ne!(pattern_id(&a).unwrap(), pattern_id(&c).unwrap());
}

#[test]
fn merge_of_identical_sequences_is_the_sequence() {
    let a = tokenize("cache miss for key session:991");
    assert_eq!(align(&a, &a).merge(), a);
}

#[test]
fn merge_length_is_bounded() {
    let a = tokenize("user alice logged in from 10.0.0.1");
    let b = tokenize("connection to db-01 timed out after 30 seconds");
    let al = align(&a, &b);
    let merged = al.merge();
    assert!(merged.len() >= a.len().max(b.len()));
    assert!(merged.len() <= a.len() + b.len());
    assert_eq!(merged.len(), a.len() + b.len() - al.common_len());
}

#[test]
fn stemmed_literals_align() {
    let a = tokenize("closing 3 connections");
    let b = tokenize("closing 7 connection");
    assert_eq!(similarity(&a, &b, SimilarityNormalization::LongerLength), 1.0);
}
