//! N-gram token filter implementation.
//!
//! Expands every token into its character n-grams of length `min..=max`.
//! The n-grams are emitted by start character first, then by length, and
//! all of them keep the parent token's position and offsets.
//!
//! # Examples
//!
//! ```
//! use tessera::analysis::token::Token;
//! use tessera::analysis::token_filter::Filter;
//! use tessera::analysis::token_filter::ngram::NGramFilter;
//!
//! let filter = NGramFilter::new(3, 4).unwrap();
//! let grams: Vec<String> = filter
//!     .filter(Box::new(vec![Token::new("index", 0)].into_iter()))
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//!
//! assert_eq!(grams, vec!["ind", "inde", "nde", "ndex", "dex"]);
//! ```

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::{Result, TesseraError};

/// A filter that replaces each token with its character n-grams.
///
/// Tokens shorter than `min` characters produce nothing.
#[derive(Clone, Debug)]
pub struct NGramFilter {
    /// Minimum n-gram size
    min_gram: usize,
    /// Maximum n-gram size
    max_gram: usize,
}

impl NGramFilter {
    /// Create a new n-gram filter.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `min_gram` is 0 or `max_gram` is
    /// less than `min_gram`.
    pub fn new(min_gram: usize, max_gram: usize) -> Result<Self> {
        if min_gram == 0 {
            return Err(TesseraError::configuration(
                "ngram min must be at least 1",
            ));
        }
        if max_gram < min_gram {
            return Err(TesseraError::configuration(format!(
                "ngram max ({max_gram}) must be >= min ({min_gram})"
            )));
        }
        Ok(NGramFilter { min_gram, max_gram })
    }

    /// Get the minimum n-gram size.
    pub fn min_gram(&self) -> usize {
        self.min_gram
    }

    /// Get the maximum n-gram size.
    pub fn max_gram(&self) -> usize {
        self.max_gram
    }

    fn expand(&self, token: &Token, out: &mut Vec<Token>) {
        let chars: Vec<char> = token.text.chars().collect();
        for start in 0..chars.len() {
            for size in self.min_gram..=self.max_gram {
                if start + size > chars.len() {
                    break;
                }
                let gram: String = chars[start..start + size].iter().collect();
                out.push(token.clone().with_text(gram));
            }
        }
    }
}

impl Filter for NGramFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let mut expanded = Vec::new();
        for token in tokens {
            if token.is_stopped() {
                expanded.push(token);
            } else {
                self.expand(&token, &mut expanded);
            }
        }
        Ok(Box::new(expanded.into_iter()))
    }

    fn name(&self) -> &'static str {
        "ngram"
    }
}
