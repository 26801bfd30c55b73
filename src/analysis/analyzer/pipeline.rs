//! Pipeline analyzer that combines tokenizers and filters.
//!
//! This is the building block for every analyzer, built-in or custom. The
//! tokenizer runs first, then each token filter in the order it was added.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use tessera::analysis::analyzer::Analyzer;
//! use tessera::analysis::analyzer::pipeline::PipelineAnalyzer;
//! use tessera::analysis::tokenizer::whitespace::WhitespaceTokenizer;
//! use tessera::analysis::token_filter::lowercase::LowercaseFilter;
//! use tessera::analysis::token_filter::stop::StopFilter;
//!
//! let analyzer = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
//!     .add_filter(Arc::new(LowercaseFilter::new()))
//!     .add_filter(Arc::new(StopFilter::from_words(vec!["the", "and"])))
//!     .with_name("my_custom_analyzer");
//!
//! let tokens: Vec<_> = analyzer.analyze("Hello THE world AND test").unwrap().collect();
//!
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[0].text, "hello");
//! assert_eq!(analyzer.name(), "my_custom_analyzer");
//! ```

use std::sync::Arc;

use crate::analysis::analyzer::analyzer::Analyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A configurable analyzer that combines a tokenizer with a chain of filters.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn Filter>>,
    name: String,
}

impl PipelineAnalyzer {
    /// Create a new pipeline analyzer with the given tokenizer.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            name: format!("pipeline_{}", tokenizer.name()),
            tokenizer,
            filters: Vec::new(),
        }
    }

    /// Add a filter to the end of the pipeline.
    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set a custom name for this analyzer.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Get the tokenizer used by this analyzer.
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Get the filters used by this analyzer, in application order.
    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = self.tokenizer.tokenize(text)?;

        for filter in &self.filters {
            tokens = filter.filter(tokens)?;
        }

        Ok(tokens)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineAnalyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;
    use crate::analysis::token_filter::lowercase::LowercaseFilter;
    use crate::analysis::token_filter::ngram::NGramFilter;
    use crate::analysis::token_filter::stem::StemFilter;
    use crate::analysis::token_filter::stop::StopFilter;
    use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;

    fn demo_ngram_analyzer() -> PipelineAnalyzer {
        PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_filter(Arc::new(StopFilter::new()))
            .add_filter(Arc::new(StemFilter::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(NGramFilter::new(3, 4).unwrap()))
            .with_name("ngram_analyzer")
    }

    #[test]
    fn test_pipeline_analyzer() {
        let analyzer = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(StopFilter::from_words(vec!["the", "and"])));

        let tokens: Vec<Token> = analyzer
            .analyze("Hello THE world AND test")
            .unwrap()
            .collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "hello");
        assert_eq!(tokens[1].text, "world");
        assert_eq!(tokens[2].text, "test");
        assert_eq!(tokens[2].position, 4);
    }

    #[test]
    fn test_filter_order_is_significant() {
        let stop_then_lower = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_filter(Arc::new(StopFilter::from_words(vec!["the"])))
            .add_filter(Arc::new(LowercaseFilter::new()));
        let lower_then_stop = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(StopFilter::from_words(vec!["the"])));

        assert_eq!(stop_then_lower.analyze_to_vec("The end").unwrap().len(), 2);
        assert_eq!(lower_then_stop.analyze_to_vec("The end").unwrap().len(), 1);
    }

    #[test]
    fn test_ngram_pipeline_is_deterministic() {
        let analyzer = demo_ngram_analyzer();
        let first = analyzer.analyze_to_vec("what watery indexes asdf bevel").unwrap();
        let second = analyzer.analyze_to_vec("what watery indexes asdf bevel").unwrap();

        assert_eq!(first, second);
        assert!(first.iter().any(|t| t.text == "wate"));
        assert!(first.iter().all(|t| t.text != "what"));
    }

    #[test]
    fn test_default_name_and_debug() {
        let analyzer = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()));
        assert_eq!(analyzer.name(), "pipeline_whitespace");
        assert!(format!("{analyzer:?}").contains("whitespace"));
    }
}
