//! Output formatting for CLI command summaries.

use serde::{Deserialize, Serialize};

use crate::batch::BatchSummary;
use crate::cli::args::{DjmirArgs, OutputFormat};
use crate::error::Result;
use crate::index::CollectionStatistics;
use crate::scoring::TuningReport;

/// Summary of a `search` run.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchReport {
    pub output: String,
    pub tuning: Option<TuningReport>,
    pub batch: BatchSummary,
}

/// Summary of an `expand` run.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExpansionReport {
    pub output: String,
    pub queries: usize,
    pub rejected_lines: usize,
    pub vocabulary_terms: usize,
    pub vocabulary_concepts: usize,
}

/// Output of the `stats` command.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsReport {
    pub index: String,
    #[serde(flatten)]
    pub statistics: CollectionStatistics,
}

/// Output a result in the selected format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &DjmirArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result),
    }
}

fn output_human<T: Serialize>(message: &str, result: &T, args: &DjmirArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    for line in human_lines(&value, "") {
        println!("{line}");
    }
    Ok(())
}

fn output_json<T: Serialize>(result: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

/// Flatten nested objects into `parent.key: value` lines.
fn human_lines(value: &serde_json::Value, prefix: &str) -> Vec<String> {
    match value {
        serde_json::Value::Object(obj) => obj
            .iter()
            .flat_map(|(key, val)| {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                match val {
                    serde_json::Value::Object(_) => human_lines(val, &path),
                    _ => vec![format!("{path}: {}", format_value(val))],
                }
            })
            .collect(),
        _ => vec![format_value(value)],
    }
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "-".to_string(),
    }
}
