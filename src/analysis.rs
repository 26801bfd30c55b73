//! Text analysis module for Tessera.
//!
//! This module provides tokenization, token filtering and analysis
//! pipelines, plus the [`registry::AnalyzerRegistry`] that resolves
//! component names to instances once, at configuration time.
//!
//! ```text
//! Raw Text → Tokenizer → Filter 1 → ... → Filter N → Token Stream
//! ```

pub mod analyzer;
pub mod registry;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::Analyzer;
pub use registry::{AnalysisConfig, AnalyzerConfig, AnalyzerRegistry, TokenFilterConfig};
pub use token::{Token, TokenStream};
pub use token_filter::Filter;
pub use tokenizer::Tokenizer;
