use crate::pattern::content_hash;
use crate::token::Token;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// One input line. `raw` is carried through untouched for the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord<R = ()> {
    pub content: String,
    pub raw: R,
}

impl LogRecord<()> {
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into(), raw: () }
    }
}

impl<R> LogRecord<R> {
    pub fn with_raw(content: impl Into<String>, raw: R) -> Self {
        Self { content: content.into(), raw }
    }
}

/// All records sharing one trimmed content.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterGroup {
    pub representative_index: usize,
    pub member_indexes: Vec<usize>,
    pub representative_content: String,
    /// Filled in once by the clustering engine.
    pub representative_tokens: Option<Vec<Token>>,
}

/// Groups records by the hash of their trimmed content, in first-seen order.
pub fn deduplicate<R>(records: &[LogRecord<R>]) -> Vec<ClusterGroup> {
    let mut groups: Vec<ClusterGroup> = Vec::new();
    let mut by_hash: AHashMap<String, usize> = AHashMap::new();
    for (index, record) in records.iter().enumerate() {
        let trimmed = record.content.trim();
        let slot = *by_hash.entry(content_hash(trimmed)).or_insert_with(|| {
            groups.push(ClusterGroup {
                representative_index: index,
                member_indexes: Vec::new(),
                representative_content: trimmed.to_string(),
                representative_tokens: None,
            });
            groups.len() - 1
        });
        groups[slot].member_indexes.push(index);
    }
    groups
}
