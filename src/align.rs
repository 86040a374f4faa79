use crate::stemming;
use crate::token::Token;
use serde::{Deserialize, Serialize};

/// How the common-subsequence length is turned into a score in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityNormalization {
    /// `lcs / max(|a|, |b|)`
    #[default]
    LongerLength,
    /// `2 * lcs / (|a| + |b|)`
    Dice,
}

impl SimilarityNormalization {
    pub fn score(self, common: usize, left_len: usize, right_len: usize) -> f64 {
        if left_len == 0 && right_len == 0 {
            return 1.0;
        }
        match self {
            SimilarityNormalization::LongerLength => common as f64 / left_len.max(right_len) as f64,
            SimilarityNormalization::Dice => (2 * common) as f64 / (left_len + right_len) as f64,
        }
    }
}

/// Token equality used for alignment. Checked in order:
/// equal or same-root literals, same type, then wildcard on either side.
pub fn tokens_match(a: &Token, b: &Token) -> bool {
    match (a, b) {
        (Token::Literal(x), Token::Literal(y)) => x == y || stemming::same_root(x, y),
        (Token::Typed { kind: ka, .. }, Token::Typed { kind: kb, .. }) => ka == kb,
        (Token::Wildcard, _) | (_, Token::Wildcard) => true,
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOp<'a> {
    Matched(&'a Token, &'a Token),
    LeftOnly(&'a Token),
    RightOnly(&'a Token),
}

impl DiffOp<'_> {
    pub fn is_matched(&self) -> bool {
        matches!(self, DiffOp::Matched(..))
    }
}

/// Longest-common-subsequence alignment of two token sequences.
#[derive(Debug, Clone)]
pub struct Alignment<'a> {
    ops: Vec<DiffOp<'a>>,
    common: usize,
    left_len: usize,
    right_len: usize,
}

impl<'a> Alignment<'a> {
    pub fn ops(&self) -> &[DiffOp<'a>] {
        &self.ops
    }

    pub fn common_len(&self) -> usize {
        self.common
    }

    pub fn similarity(&self, normalization: SimilarityNormalization) -> f64 {
        normalization.score(self.common, self.left_len, self.right_len)
    }

    /// Builds the generalized pattern: matched positions keep the shared token
    /// (a wildcard stays a wildcard), every gap becomes a wildcard.
    pub fn merge(&self) -> Vec<Token> {
        self.ops
            .iter()
            .map(|op| match op {
                DiffOp::Matched(a, b) if !a.is_wildcard() && !b.is_wildcard() => (*a).clone(),
                _ => Token::Wildcard,
            })
            .collect()
    }
}

// (matched tokens, matched tokens where neither side is a wildcard)
type Score = (usize, usize);

fn add_match(score: Score, concrete: bool) -> Score {
    (score.0 + 1, score.1 + usize::from(concrete))
}

/// Aligns `left` against `right`.
///
/// Among subsequences of maximal length the one with the most concrete
/// (non-wildcard) matches wins, so a wildcard does not swallow a token that a
/// literal could pair with. Remaining ties go to the earliest match; on a gap
/// the left token is dropped first.
pub fn align<'a>(left: &'a [Token], right: &'a [Token]) -> Alignment<'a> {
    let n = left.len();
    let m = right.len();
    let width = m + 1;

    let mut eq = vec![false; n * m];
    // best[i * width + j] = best score of left[i..] against right[j..]
    let mut best: Vec<Score> = vec![(0, 0); (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            let hit = tokens_match(&left[i], &right[j]);
            eq[i * m + j] = hit;
            let skip = best[(i + 1) * width + j].max(best[i * width + j + 1]);
            best[i * width + j] = if hit {
                let concrete = !left[i].is_wildcard() && !right[j].is_wildcard();
                skip.max(add_match(best[(i + 1) * width + j + 1], concrete))
            } else {
                skip
            };
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        let here = best[i * width + j];
        let concrete = !left[i].is_wildcard() && !right[j].is_wildcard();
        if eq[i * m + j] && here == add_match(best[(i + 1) * width + j + 1], concrete) {
            ops.push(DiffOp::Matched(&left[i], &right[j]));
            i += 1;
            j += 1;
        } else if best[(i + 1) * width + j] >= best[i * width + j + 1] {
            ops.push(DiffOp::LeftOnly(&left[i]));
            i += 1;
        } else {
            ops.push(DiffOp::RightOnly(&right[j]));
            j += 1;
        }
    }
    ops.extend(left[i..].iter().map(DiffOp::LeftOnly));
    ops.extend(right[j..].iter().map(DiffOp::RightOnly));

    Alignment { ops, common: best[0].0, left_len: n, right_len: m }
}

pub fn similarity(left: &[Token], right: &[Token], normalization: SimilarityNormalization) -> f64 {
    align(left, right).similarity(normalization)
}
