//! Output formatting for CLI commands.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::args::{OutputFormat, TesseraArgs};
use crate::error::Result;
use crate::index::IndexStats;
use crate::search::SearchResults;

/// Something a command prints.
pub trait Report: Serialize {
    /// Print the human-readable form to stdout.
    fn print_human(&self);
}

/// Result of index creation.
#[derive(Debug, Serialize)]
pub struct CreateReport {
    pub path: String,
    pub default_analyzer: String,
    pub types: Vec<String>,
}

/// Result of indexing documents.
#[derive(Debug, Serialize)]
pub struct PutReport {
    pub documents_indexed: usize,
    pub duration_ms: u64,
    pub docs_per_second: f64,
}

/// Result of deleting documents.
#[derive(Debug, Serialize)]
pub struct DeleteReport {
    pub deleted: Vec<String>,
    pub not_found: Vec<String>,
}

/// A fetched document.
#[derive(Debug, Serialize)]
pub struct DocumentReport {
    pub id: String,
    pub found: bool,
    pub fields: Map<String, Value>,
}

/// One executed query.
#[derive(Debug, Serialize)]
pub struct QueryReport {
    pub query: String,
    pub results: SearchResults,
}

/// Index statistics.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub path: String,
    #[serde(flatten)]
    pub stats: IndexStats,
}

/// All demo queries.
#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub indexed: usize,
    pub queries: Vec<QueryReport>,
}

impl Report for CreateReport {
    fn print_human(&self) {
        println!("Created index at {}", self.path);
        println!("Default analyzer: {}", self.default_analyzer);
        if !self.types.is_empty() {
            println!("Document types: {}", self.types.join(", "));
        }
    }
}

impl Report for PutReport {
    fn print_human(&self) {
        println!(
            "Indexed {} documents in {}ms ({:.1} docs/s)",
            self.documents_indexed, self.duration_ms, self.docs_per_second
        );
    }
}

impl Report for DeleteReport {
    fn print_human(&self) {
        for id in &self.deleted {
            println!("deleted {id}");
        }
        for id in &self.not_found {
            println!("not found {id}");
        }
    }
}

impl Report for DocumentReport {
    fn print_human(&self) {
        if !self.found {
            println!("Document {} not found", self.id);
            return;
        }
        println!("Document {}", self.id);
        println!("─────────────");
        for (name, value) in &self.fields {
            println!("{name}: {}", format_value(value));
        }
    }
}

impl Report for QueryReport {
    fn print_human(&self) {
        let results = &self.results;
        println!(
            "Query: {} got {} hits, max score {:.4} ({:.3}ms)",
            self.query,
            results.total_hits,
            results.max_score,
            results.took.as_secs_f64() * 1000.0
        );

        for (i, hit) in results.hits.iter().enumerate() {
            println!("  {}. {} (score {:.4})", i + 1, hit.id, hit.score);
            for (name, value) in &hit.fields {
                println!("       {name}: {value}");
            }
        }
    }
}

impl Report for StatsReport {
    fn print_human(&self) {
        println!("Index Statistics: {}", self.path);
        println!("════════════════");
        println!("Documents: {}", self.stats.documents);

        if !self.stats.fields.is_empty() {
            println!();
            println!("{:<24} {:>10} {:>10}", "Field", "Documents", "Terms");
            for field in &self.stats.fields {
                println!("{:<24} {:>10} {:>10}", field.name, field.documents, field.terms);
            }
        }
    }
}

impl Report for DemoReport {
    fn print_human(&self) {
        if self.indexed > 0 {
            println!("Indexed {} messages", self.indexed);
            println!();
        }
        for query in &self.queries {
            query.print_human();
            println!();
        }
    }
}

/// Output a report in the selected format.
pub fn output_result<T: Report>(report: &T, args: &TesseraArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            report.print_human();
            Ok(())
        }
        OutputFormat::Json => output_json(report, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &TesseraArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for human output.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
