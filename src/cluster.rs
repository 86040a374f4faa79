use crate::align::{align, SimilarityNormalization};
use crate::dedup::{deduplicate, ClusterGroup, LogRecord};
use crate::pattern::{abstract_pattern, compress_pattern, pattern_id, render_pattern};
use crate::token::Token;
use crate::tokenizer::tokenize;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MIN_SIMILARITY: f64 = 0.6;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("similarity threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("pattern serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Order in which deduplicated groups are fed to the batch clusterer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrder {
    /// First-seen order of the input.
    Input,
    /// Random permutation so that adjacency of similar lines in the source
    /// does not decide which line seeds a cluster. `None` seeds from OS entropy.
    Shuffled { seed: Option<u64> },
}

impl Default for GroupOrder {
    fn default() -> Self {
        GroupOrder::Shuffled { seed: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterOpts {
    pub min_similarity: f64,
    pub normalization: SimilarityNormalization,
    pub order: GroupOrder,
}

impl Default for ClusterOpts {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            normalization: SimilarityNormalization::default(),
            order: GroupOrder::default(),
        }
    }
}

impl ClusterOpts {
    pub fn with_min_similarity(min_similarity: f64) -> Self {
        Self { min_similarity, ..Default::default() }
    }

    fn validate(&self) -> Result<(), ClusterError> {
        if (0.0..=1.0).contains(&self.min_similarity) {
            Ok(())
        } else {
            Err(ClusterError::InvalidThreshold(self.min_similarity))
        }
    }
}

/// Externally exposed cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterView {
    /// Abstracted, uncompressed pattern; incremental clustering aligns against it.
    pub pattern: Vec<Token>,
    /// Rendering of the compressed pattern.
    pub pattern_string: String,
    pub pattern_id: String,
    pub member_indexes: Vec<usize>,
    pub count: usize,
}

impl ClusterView {
    pub fn from_pattern(mut pattern: Vec<Token>, member_indexes: Vec<usize>) -> Result<Self, ClusterError> {
        abstract_pattern(&mut pattern);
        let pattern_string = render_pattern(&compress_pattern(&pattern));
        let pattern_id = pattern_id(&pattern)?;
        Ok(Self {
            count: member_indexes.len(),
            pattern,
            pattern_string,
            pattern_id,
            member_indexes,
        })
    }

    fn absorb(&mut self, index: usize, merged: Vec<Token>) -> Result<(), ClusterError> {
        self.member_indexes.push(index);
        self.count = self.member_indexes.len();
        self.pattern = merged;
        abstract_pattern(&mut self.pattern);
        self.pattern_string = render_pattern(&compress_pattern(&self.pattern));
        self.pattern_id = pattern_id(&self.pattern)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Cluster {
    member_indexes: Vec<usize>,
    pattern: Option<Vec<Token>>,
    representative_tokens: Option<Vec<Token>>,
    representative_content: String,
}

impl Cluster {
    fn from_group(group: ClusterGroup) -> Self {
        Self {
            member_indexes: group.member_indexes,
            pattern: None,
            representative_tokens: group.representative_tokens,
            representative_content: group.representative_content,
        }
    }

    /// The merged pattern once the cluster absorbed another group, else the
    /// representative's tokens.
    fn effective_pattern(&self, id: usize) -> Result<&[Token], ClusterError> {
        self.pattern
            .as_deref()
            .or(self.representative_tokens.as_deref())
            .ok_or_else(|| missing_pattern(id))
    }

    fn into_view(self, id: usize) -> Result<ClusterView, ClusterError> {
        let pattern = self.pattern.or(self.representative_tokens).ok_or_else(|| missing_pattern(id))?;
        ClusterView::from_pattern(pattern, self.member_indexes)
    }
}

fn missing_pattern(id: usize) -> ClusterError {
    ClusterError::InvariantViolation(format!("cluster {id} has neither a pattern nor representative tokens"))
}

/// Prefix rule that rescues near-misses: one content starts with the other.
/// Never applies to empty contents or single-token sequences.
fn is_contained(a: &str, b: &str, a_tokens: usize, b_tokens: usize) -> bool {
    !a.is_empty() && !b.is_empty() && a_tokens > 1 && b_tokens > 1 && (a.starts_with(b) || b.starts_with(a))
}

fn order_groups(groups: &mut [ClusterGroup], order: GroupOrder) {
    if let GroupOrder::Shuffled { seed } = order {
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        groups.shuffle(&mut rng);
    }
}

/// Batch clustering with the default options and the given threshold.
pub fn deduplicate_and_cluster_batch<R>(
    records: &[LogRecord<R>],
    min_similarity: f64,
) -> Result<Vec<ClusterView>, ClusterError> {
    cluster_batch(records, &ClusterOpts::with_min_similarity(min_similarity))
}

/// Clusters a fixed set of records.
///
/// Exact duplicates (after trimming) are collapsed first, the groups are
/// ordered per `opts.order`, then each group joins the first existing cluster
/// whose pattern it matches or seeds a new one.
pub fn cluster_batch<R>(records: &[LogRecord<R>], opts: &ClusterOpts) -> Result<Vec<ClusterView>, ClusterError> {
    opts.validate()?;
    let mut groups = deduplicate(records);
    tracing::debug!(records = records.len(), groups = groups.len(), "deduplicated records");
    order_groups(&mut groups, opts.order);
    for group in groups.iter_mut() {
        group.representative_tokens = Some(tokenize(&group.representative_content));
    }

    let clusters = cluster_groups(groups, opts)?;
    let views = clusters
        .into_iter()
        .enumerate()
        .map(|(id, cluster)| cluster.into_view(id))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!(records = records.len(), clusters = views.len(), "batch clustering finished");
    Ok(views)
}

fn cluster_groups(groups: Vec<ClusterGroup>, opts: &ClusterOpts) -> Result<Vec<Cluster>, ClusterError> {
    let mut groups = groups.into_iter();
    let Some(first) = groups.next() else {
        return Ok(Vec::new());
    };
    let mut clusters = vec![Cluster::from_group(first)];

    for group in groups {
        let tokens = group.representative_tokens.as_deref().ok_or_else(|| {
            ClusterError::InvariantViolation(format!(
                "group of record {} was not tokenized",
                group.representative_index
            ))
        })?;

        let mut accepted = None;
        for (id, cluster) in clusters.iter().enumerate() {
            let pattern = cluster.effective_pattern(id)?;
            let alignment = align(pattern, tokens);
            let score = alignment.similarity(opts.normalization);
            let contained = is_contained(
                &group.representative_content,
                &cluster.representative_content,
                tokens.len(),
                pattern.len(),
            );
            tracing::trace!(cluster = id, score, contained, "compared group {}", group.representative_index);
            if score >= opts.min_similarity || contained {
                accepted = Some((id, alignment.merge()));
                break;
            }
        }

        match accepted {
            Some((id, merged)) => {
                let cluster = &mut clusters[id];
                cluster.member_indexes.extend_from_slice(&group.member_indexes);
                cluster.pattern = Some(merged);
                tracing::debug!(cluster = id, members = cluster.member_indexes.len(), "group absorbed");
            }
            None => {
                tracing::debug!(cluster = clusters.len(), "new cluster from record {}", group.representative_index);
                clusters.push(Cluster::from_group(group));
            }
        }
    }
    Ok(clusters)
}

/// Folds `records` into `existing`; record `i` gets index `i`.
pub fn cluster_incremental<'a, R>(
    records: &[LogRecord<R>],
    existing: &'a mut Vec<ClusterView>,
    opts: &ClusterOpts,
) -> Result<&'a mut Vec<ClusterView>, ClusterError> {
    cluster_incremental_from(records, 0, existing, opts)
}

/// Folds `records` into `existing` one by one; record `i` gets index
/// `first_index + i`. Accepted records re-merge the cluster's pattern and
/// refresh its string and id; others append a new singleton cluster.
pub fn cluster_incremental_from<'a, R>(
    records: &[LogRecord<R>],
    first_index: usize,
    existing: &'a mut Vec<ClusterView>,
    opts: &ClusterOpts,
) -> Result<&'a mut Vec<ClusterView>, ClusterError> {
    opts.validate()?;
    let before = existing.len();
    for (offset, record) in records.iter().enumerate() {
        let index = first_index + offset;
        let content = record.content.trim();
        let tokens = tokenize(content);

        let mut accepted = None;
        for (id, view) in existing.iter().enumerate() {
            let alignment = align(&view.pattern, &tokens);
            let score = alignment.similarity(opts.normalization);
            let contained = is_contained(content, &view.pattern_string, tokens.len(), view.pattern.len());
            tracing::trace!(cluster = id, score, contained, "compared record {index}");
            if score >= opts.min_similarity || contained {
                accepted = Some((id, alignment.merge()));
                break;
            }
        }

        match accepted {
            Some((id, merged)) => existing[id].absorb(index, merged)?,
            None => {
                tracing::debug!(cluster = existing.len(), "new cluster from record {index}");
                existing.push(ClusterView::from_pattern(tokens, vec![index])?);
            }
        }
    }
    tracing::info!(
        records = records.len(),
        new_clusters = existing.len() - before,
        clusters = existing.len(),
        "incremental clustering finished"
    );
    Ok(existing)
}
