//! Command line argument parsing for the tessera CLI using clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::IndexConfig;
use crate::query::Operator;

/// Tessera - an embeddable full-text search engine
#[derive(Parser, Debug, Clone)]
#[command(name = "tessera")]
#[command(about = "An embeddable full-text search engine")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct TesseraArgs {
    /// Verbosity level (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(flatten)]
    pub index: IndexOptions,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl TesseraArgs {
    /// Effective verbosity: 0 quiet, 1 normal, 2 verbose, 3+ debug.
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

/// Runtime options shared by every command that opens an index.
#[derive(Args, Debug, Clone)]
pub struct IndexOptions {
    /// Lock acquisition timeout in milliseconds
    #[arg(long, env = "TESSERA_LOCK_TIMEOUT_MS", default_value = "5000", global = true)]
    pub lock_timeout_ms: u64,

    /// Do not fsync the write-ahead log after every record
    #[arg(long, global = true)]
    pub no_sync: bool,

    /// WAL records between automatic snapshots (0 = only on close)
    #[arg(long, env = "TESSERA_CHECKPOINT_INTERVAL", global = true)]
    pub checkpoint_interval: Option<u64>,
}

impl IndexOptions {
    /// The index configuration these options describe.
    pub fn to_config(&self) -> IndexConfig {
        let mut config = IndexConfig::default()
            .with_lock_timeout(Duration::from_millis(self.lock_timeout_ms))
            .with_sync_writes(!self.no_sync);
        if let Some(interval) = self.checkpoint_interval {
            config = config.with_checkpoint_interval(interval);
        }
        config
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a new index
    Create(CreateArgs),

    /// Index documents from a JSON or JSON Lines file
    Put(PutArgs),

    /// Delete documents by ID
    Delete(DeleteArgs),

    /// Print the stored fields of a document
    Get(GetArgs),

    /// Search an index
    Search(SearchArgs),

    /// Show index statistics
    Stats(StatsArgs),

    /// Index the sample e-mails and run the sample queries
    Demo(DemoArgs),
}

/// Arguments for creating an index
#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// Index mapping file (JSON)
    #[arg(short, long, value_name = "MAPPING_FILE")]
    pub mapping: Option<PathBuf>,
}

/// Arguments for indexing documents
#[derive(Parser, Debug, Clone)]
pub struct PutArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// Document file: a JSON object, a JSON array of objects, or JSON Lines
    #[arg(value_name = "DOCUMENT_FILE")]
    pub document_file: PathBuf,

    /// Index mapping used if the index has to be created
    #[arg(short, long, value_name = "MAPPING_FILE")]
    pub mapping: Option<PathBuf>,

    /// Key holding the document ID in each object
    #[arg(long, default_value = "id")]
    pub id_field: String,

    /// Documents per batch
    #[arg(short, long, default_value = "1000")]
    pub batch_size: usize,
}

/// Arguments for deleting documents
#[derive(Parser, Debug, Clone)]
pub struct DeleteArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// Document IDs
    #[arg(value_name = "ID", required = true)]
    pub ids: Vec<String>,
}

/// Arguments for fetching a document
#[derive(Parser, Debug, Clone)]
pub struct GetArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// Document ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Fields to print (comma-separated, `*` for all)
    #[arg(long, value_delimiter = ',', default_value = "*")]
    pub fields: Vec<String>,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// Query text
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Field to search in (default: all fields)
    #[arg(long)]
    pub field: Option<String>,

    /// How the query text is interpreted
    #[arg(short = 'm', long, default_value = "match")]
    pub mode: SearchMode,

    /// Require all (and) or any (or) of the analyzed terms
    #[arg(long, default_value = "or")]
    pub operator: OperatorArg,

    /// Fields to return with each hit (comma-separated, `*` for all)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Maximum number of results to return
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Offset for pagination
    #[arg(short, long, default_value = "0")]
    pub offset: usize,

    /// Score multiplier
    #[arg(long, default_value = "1.0")]
    pub boost: f32,
}

/// Search modes available in the CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Analyze the query text with the field's analyzer
    Match,
    /// Look up the text as a single, unanalyzed term (needs --field)
    Term,
}

/// Match operator
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorArg {
    Or,
    And,
}

impl From<OperatorArg> for Operator {
    fn from(value: OperatorArg) -> Self {
        match value {
            OperatorArg::Or => Operator::Or,
            OperatorArg::And => Operator::And,
        }
    }
}

/// Arguments for index statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,
}

/// Arguments for the demo
#[derive(Parser, Debug, Clone)]
pub struct DemoArgs {
    /// Where to keep the demo index. Reused if it already exists.
    #[arg(value_name = "INDEX_PATH", default_value = "example.tessera")]
    pub index_path: PathBuf,

    /// Keep the index in memory instead
    #[arg(long, conflicts_with = "index_path")]
    pub in_memory: bool,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
