//! Core analyzer trait definition.
//!
//! An analyzer is the complete text processing pipeline used at index time
//! and, for the same field, at query time:
//!
//! ```text
//! Raw Text → Analyzer → Token Stream → Index
//!             ↓
//!         Tokenizer
//!             ↓
//!         Filter 1 … Filter N
//! ```
//!
//! # Examples
//!
//! ```
//! use tessera::analysis::analyzer::Analyzer;
//! use tessera::analysis::analyzer::StandardAnalyzer;
//!
//! let analyzer = StandardAnalyzer::new();
//! let tokens: Vec<_> = analyzer.analyze("Hello World").unwrap().collect();
//!
//! assert_eq!(tokens[0].text, "hello");
//! assert_eq!(tokens[1].text, "world");
//! ```

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// Implementations must be pure and deterministic: the same text always
/// yields the same tokens.
pub trait Analyzer: Send + Sync + std::fmt::Debug {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name this analyzer is registered under.
    fn name(&self) -> &str;

    /// Analyze and collect into a vector, dropping tokens a filter marked
    /// as stopped.
    fn analyze_to_vec(&self, text: &str) -> Result<Vec<Token>> {
        Ok(self.analyze(text)?.filter(|t| !t.is_stopped()).collect())
    }
}
