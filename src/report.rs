use crate::cluster::ClusterView;
use crate::dedup::LogRecord;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Read access to named fields of a record's opaque payload, used for breakdowns.
pub trait FieldSource {
    fn field(&self, key: &str) -> Option<String>;
}

impl FieldSource for () {
    fn field(&self, _key: &str) -> Option<String> {
        None
    }
}

impl FieldSource for Value {
    /// Dotted keys walk nested objects: `kubernetes.pod_name`.
    fn field(&self, key: &str) -> Option<String> {
        let pointer = format!("/{}", key.replace('.', "/"));
        match self.pointer(&pointer)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl FieldSource for BTreeMap<String, String> {
    fn field(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportOpts {
    /// Payload fields to break each pattern down by.
    pub breakdown_keys: Vec<String>,
    pub top: Option<usize>,
    /// Distinct member lines kept per pattern.
    pub examples: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_lines: usize,
    pub unique_patterns: usize,
    pub compression_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternReport {
    pub pattern: String,
    pub pattern_id: String,
    pub count: usize,
    pub percent: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub breakdowns: BTreeMap<String, BTreeMap<String, usize>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub summary: ReportSummary,
    pub patterns: Vec<PatternReport>,
}

/// Cluster a record belongs to, as stamped back onto the record by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAssignment {
    pub pattern_id: String,
    pub pattern: String,
    pub occurrences: usize,
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Builds a report sorted by count (desc), then pattern text.
pub fn build_report<R: FieldSource>(views: &[ClusterView], records: &[LogRecord<R>], opts: &ReportOpts) -> Report {
    let total = records.len();
    let mut patterns: Vec<PatternReport> = views
        .iter()
        .map(|view| {
            let members = || view.member_indexes.iter().filter_map(|&i| records.get(i));
            let mut breakdowns = BTreeMap::new();
            for key in &opts.breakdown_keys {
                let mut counts: BTreeMap<String, usize> = BTreeMap::new();
                for record in members() {
                    let value = record.raw.field(key).unwrap_or_else(|| "null".to_string());
                    *counts.entry(value).or_insert(0) += 1;
                }
                breakdowns.insert(key.clone(), counts);
            }
            let examples = members()
                .map(|r| r.content.trim().to_string())
                .unique()
                .take(opts.examples)
                .collect();
            PatternReport {
                pattern: view.pattern_string.clone(),
                pattern_id: view.pattern_id.clone(),
                count: view.count,
                percent: if total > 0 { round3(view.count as f64 * 100.0 / total as f64) } else { 0.0 },
                breakdowns,
                examples,
            }
        })
        .collect();
    patterns.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.pattern.cmp(&b.pattern)));
    let unique = patterns.len();
    if let Some(top) = opts.top {
        patterns.truncate(top);
    }
    Report {
        summary: ReportSummary {
            total_lines: total,
            unique_patterns: unique,
            compression_ratio: if unique > 0 { total as f64 / unique as f64 } else { 0.0 },
        },
        patterns,
    }
}

/// For every record index below `total`, the cluster that holds it.
pub fn assign_records(views: &[ClusterView], total: usize) -> Vec<Option<RecordAssignment>> {
    let mut out = vec![None; total];
    for view in views {
        for &index in &view.member_indexes {
            if let Some(slot) = out.get_mut(index) {
                *slot = Some(RecordAssignment {
                    pattern_id: view.pattern_id.clone(),
                    pattern: view.pattern_string.clone(),
                    occurrences: view.count,
                });
            }
        }
    }
    out
}

pub fn render_table(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# total={} patterns={}",
        report.summary.total_lines, report.summary.unique_patterns
    );
    let _ = writeln!(out, "{:<8} {:<9} {}", "Count", "Percent", "Pattern");
    for p in &report.patterns {
        let _ = writeln!(out, "{:<8} {:<9.3} {}", p.count, p.percent, p.pattern);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dotted_keys_walk_nested_objects() {
        let v = json!({"event": "boot", "ctx": {"code": 42, "ok": true}, "none": null});
        assert_eq!(v.field("event").as_deref(), Some("boot"));
        assert_eq!(v.field("ctx.code").as_deref(), Some("42"));
        assert_eq!(v.field("ctx.ok").as_deref(), Some("true"));
        assert_eq!(v.field("none"), None);
        assert_eq!(v.field("missing"), None);
    }

    #[test]
    fn rounding_keeps_three_decimals() {
        assert_eq!(round3(100.0 / 3.0), 33.333);
    }
}
