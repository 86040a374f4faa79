pub mod token;
pub mod classify;
pub mod tokenizer;
pub mod stemming;
pub mod align;
pub mod pattern;
pub mod dedup;
pub mod cluster;
pub mod report;

pub use align::SimilarityNormalization;
pub use cluster::{
    cluster_batch, cluster_incremental, cluster_incremental_from, deduplicate_and_cluster_batch, ClusterError,
    ClusterOpts, ClusterView, GroupOrder, DEFAULT_MIN_SIMILARITY,
};
pub use dedup::LogRecord;
pub use pattern::render_pattern;
pub use token::{Token, TokenType};
pub use tokenizer::tokenize;
