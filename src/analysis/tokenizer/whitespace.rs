//! Whitespace tokenizer implementation.

use super::Tokenizer;

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// A tokenizer that splits text on whitespace.
///
/// Punctuation stays attached to the surrounding word: `"hard?"` is a single
/// token.
#[derive(Clone, Debug, Default)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    /// Create a new whitespace tokenizer.
    pub fn new() -> Self {
        WhitespaceTokenizer
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut start: Option<usize> = None;

        for (idx, ch) in text.char_indices() {
            if ch.is_whitespace() {
                if let Some(begin) = start.take() {
                    let position = tokens.len();
                    tokens.push(Token::with_offsets(&text[begin..idx], position, begin, idx));
                }
            } else if start.is_none() {
                start = Some(idx);
            }
        }

        if let Some(begin) = start {
            let position = tokens.len();
            tokens.push(Token::with_offsets(
                &text[begin..],
                position,
                begin,
                text.len(),
            ));
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}
