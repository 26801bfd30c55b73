//! Lowercase filter implementation.

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// A filter that converts tokens to lowercase.
///
/// ASCII-only tokens take the cheap byte path; everything else goes
/// through Unicode-aware lowercasing. Stopped tokens pass through
/// unchanged, positions and offsets are preserved.
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    /// Create a new lowercase filter.
    pub fn new() -> Self {
        LowercaseFilter
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(|token| {
            if token.is_stopped() {
                token
            } else if token.text.is_ascii() {
                let lowered = token.text.to_ascii_lowercase();
                token.with_text(lowered)
            } else {
                let lowered = token.text.to_lowercase();
                token.with_text(lowered)
            }
        })))
    }

    fn name(&self) -> &'static str {
        "to_lower"
    }
}
