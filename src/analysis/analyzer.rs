//! Analyzers that combine a tokenizer with a chain of token filters.
//!
//! - [`analyzer::Analyzer`] - the trait every analyzer implements
//! - [`pipeline::PipelineAnalyzer`] - custom tokenizer + filter chains
//! - [`standard::StandardAnalyzer`] - Unicode words, lowercased, English stop words removed
//! - [`simple::SimpleAnalyzer`] - Unicode words, lowercased
//! - [`keyword::KeywordAnalyzer`] - the whole value as one token

#[allow(clippy::module_inception)]
pub mod analyzer;
pub mod keyword;
pub mod pipeline;
pub mod simple;
pub mod standard;

pub use analyzer::Analyzer;
pub use keyword::KeywordAnalyzer;
pub use pipeline::PipelineAnalyzer;
pub use simple::SimpleAnalyzer;
pub use standard::StandardAnalyzer;
