use anyhow::{bail, Context};
use clap::Parser;
use logcluster::report::{self, FieldSource, RecordAssignment, ReportOpts};
use logcluster::{ClusterOpts, ClusterView, GroupOrder, LogRecord, SimilarityNormalization};
use serde_json::{json, Value};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "logcluster", version, about = "Group log lines into generalized patterns")]
struct Cli {
    /// Input files (`-` for stdin). May be repeated.
    #[arg(required = false)]
    input: Vec<String>,

    /// Minimum similarity for a line to join an existing cluster (0..=1)
    #[arg(long = "min-similarity", default_value_t = logcluster::DEFAULT_MIN_SIMILARITY)]
    min_similarity: f64,
    /// Similarity normalization: longer | dice
    #[arg(long = "normalization", default_value = "longer")]
    normalization: String,
    /// Seed for the group shuffle (reproducible output)
    #[arg(long = "seed")]
    seed: Option<u64>,
    /// Cluster in input order instead of shuffling
    #[arg(long = "keep-order", default_value_t = false)]
    keep_order: bool,

    /// Treat lines as JSON objects and cluster the value of this key
    #[arg(long = "json-field")]
    json_field: Option<String>,
    /// JSON key to break each pattern down by. May be repeated.
    #[arg(long = "breakdown")]
    breakdown: Vec<String>,
    #[arg(long = "top")]
    top: Option<usize>,
    #[arg(long = "examples", default_value_t = 3)]
    examples: usize,
    /// Output format: json | table
    #[arg(long = "format", default_value = "json")]
    format: String,
    /// Print one JSON line per input record with its pattern id instead of the report
    #[arg(long = "assignments", default_value_t = false)]
    assignments: bool,

    /// Read stdin continuously, folding each line into the existing clusters.
    /// Cannot be combined with input files.
    #[arg(long = "follow", default_value_t = false)]
    follow: bool,
    /// Lines between summaries in follow mode
    #[arg(long = "interval", default_value_t = 1000)]
    interval: usize,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).with_writer(io::stderr).init();
}

fn cluster_opts(cli: &Cli) -> anyhow::Result<ClusterOpts> {
    let normalization = match cli.normalization.as_str() {
        "longer" => SimilarityNormalization::LongerLength,
        "dice" => SimilarityNormalization::Dice,
        other => bail!("unknown normalization `{other}` (expected longer | dice)"),
    };
    let order = if cli.keep_order { GroupOrder::Input } else { GroupOrder::Shuffled { seed: cli.seed } };
    Ok(ClusterOpts { min_similarity: cli.min_similarity, normalization, order })
}

fn to_record(line: String, json_field: Option<&str>) -> LogRecord<Value> {
    let Some(key) = json_field else {
        return LogRecord::with_raw(line, Value::Null);
    };
    match serde_json::from_str::<Value>(&line) {
        Ok(v @ Value::Object(_)) => match v.field(key) {
            Some(content) => LogRecord::with_raw(content, v),
            None => LogRecord::with_raw(line, v),
        },
        _ => LogRecord::with_raw(line, Value::Null),
    }
}

fn read_records(paths: &[String], json_field: Option<&str>) -> anyhow::Result<Vec<LogRecord<Value>>> {
    let mut out = Vec::new();
    for p in paths {
        if p == "-" {
            for line in io::stdin().lock().lines() {
                out.push(to_record(line.context("reading stdin")?, json_field));
            }
        } else {
            let f = File::open(p).with_context(|| format!("opening {p}"))?;
            for line in BufReader::new(f).lines() {
                out.push(to_record(line.with_context(|| format!("reading {p}"))?, json_field));
            }
        }
    }
    Ok(out)
}

fn report_opts(cli: &Cli) -> ReportOpts {
    ReportOpts { breakdown_keys: cli.breakdown.clone(), top: cli.top, examples: cli.examples }
}

fn assignment_line(index: usize, assignment: Option<&RecordAssignment>) -> Value {
    match assignment {
        Some(a) => json!({
            "index": index,
            "pattern_id": a.pattern_id,
            "pattern": a.pattern,
            "occurrences": a.occurrences,
        }),
        None => json!({"index": index, "pattern_id": null, "pattern": null, "occurrences": 0}),
    }
}

fn emit(cli: &Cli, views: &[ClusterView], records: &[LogRecord<Value>]) -> anyhow::Result<()> {
    if cli.assignments {
        for (index, assignment) in report::assign_records(views, records.len()).into_iter().enumerate() {
            println!("{}", assignment_line(index, assignment.as_ref()));
        }
        return Ok(());
    }
    let out = report::build_report(views, records, &report_opts(cli));
    if cli.format == "table" {
        print!("{}", report::render_table(&out));
    } else {
        println!("{}", serde_json::to_string_pretty(&out)?);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let opts = cluster_opts(&cli)?;

    if cli.follow {
        check_follow_inputs(&cli)?;
        return run_follow(&cli, &opts);
    }

    let input_files = if cli.input.is_empty() { vec!["-".to_string()] } else { cli.input.clone() };
    let records = read_records(&input_files, cli.json_field.as_deref())?;
    let views = logcluster::cluster_batch(&records, &opts)?;
    emit(&cli, &views, &records)
}

fn check_follow_inputs(cli: &Cli) -> anyhow::Result<()> {
    if cli.input.iter().any(|p| p != "-") {
        bail!("--follow reads stdin only; drop the input files or pipe them in");
    }
    Ok(())
}

fn run_follow(cli: &Cli, opts: &ClusterOpts) -> anyhow::Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    {
        let r = running.clone();
        let _ = ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
        });
    }
    let mut views: Vec<ClusterView> = Vec::new();
    let mut records: Vec<LogRecord<Value>> = Vec::new();
    let interval = cli.interval.max(1);
    for line in io::stdin().lock().lines() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let record = to_record(line.context("reading stdin")?, cli.json_field.as_deref());
        let index = records.len();
        logcluster::cluster_incremental_from(std::slice::from_ref(&record), index, &mut views, opts)?;
        records.push(record);
        if records.len() % interval == 0 {
            eprintln!("[follow] lines={} patterns={}", records.len(), views.len());
            emit(cli, &views, &records)?;
        }
    }
    emit(cli, &views, &records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_lines_carry_occurrences() {
        let assignment = RecordAssignment { pattern_id: "abc".into(), pattern: "disk * full".into(), occurrences: 2 };
        let line = assignment_line(4, Some(&assignment));
        assert_eq!(line["index"], 4);
        assert_eq!(line["pattern"], "disk * full");
        assert_eq!(line["occurrences"], 2);
        assert!(assignment_line(0, None)["pattern_id"].is_null());
    }

    #[test]
    fn follow_rejects_input_files() {
        let cli = Cli::try_parse_from(["logcluster", "--follow", "app.log"]).unwrap();
        let err = check_follow_inputs(&cli).unwrap_err();
        assert!(err.to_string().contains("stdin only"));
        let stdin = Cli::try_parse_from(["logcluster", "--follow", "-"]).unwrap();
        assert!(check_follow_inputs(&stdin).is_ok());
        let bare = Cli::try_parse_from(["logcluster", "--follow"]).unwrap();
        assert!(check_follow_inputs(&bare).is_ok());
    }

    #[test]
    fn json_field_becomes_content() {
        let rec = to_record(r#"{"msg":"boot ok","host":"a"}"#.to_string(), Some("msg"));
        assert_eq!(rec.content, "boot ok");
        assert_eq!(rec.raw["host"], "a");
        let plain = to_record("not json".to_string(), Some("msg"));
        assert_eq!(plain.content, "not json");
        assert!(plain.raw.is_null());
    }
}
