//! Token filter implementations for token transformation.
//!
//! Filters transform the stream produced by a tokenizer. They run in the
//! order an analyzer lists them, and that order is significant: stemming
//! before lowercasing gives different terms than the reverse.
//!
//! # Available Filters
//!
//! - [`lowercase::LowercaseFilter`] - Converts tokens to lowercase
//! - [`stop::StopFilter`] - Removes stop words
//! - [`stem::StemFilter`] - Reduces words to their Porter stem
//! - [`ngram::NGramFilter`] - Expands each token into character n-grams
//!
//! # Examples
//!
//! ```
//! use tessera::analysis::token_filter::Filter;
//! use tessera::analysis::token_filter::lowercase::LowercaseFilter;
//! use tessera::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("Hello", 0), Token::new("WORLD", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "hello");
//! assert_eq!(filtered[1].text, "world");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod lowercase;
pub mod ngram;
pub mod stem;
pub mod stop;
