//! Registry of named analysis components.
//!
//! Names are resolved once, when the registry is built from an
//! [`AnalysisConfig`]. An unknown tokenizer or filter name, a custom name
//! that shadows a built-in, or invalid n-gram bounds fail at registration
//! with a configuration error, never later at analysis time.
//!
//! # Built-in components
//!
//! | kind      | names                                                   |
//! |-----------|---------------------------------------------------------|
//! | tokenizer | `whitespace`, `unicode`, `single`                       |
//! | filter    | `to_lower` (`lowercase`), `stop_en`, `porter` (`stemmer_porter`) |
//! | analyzer  | `standard`, `simple`, `keyword`, `whitespace`           |
//!
//! # Examples
//!
//! ```
//! use tessera::analysis::registry::{
//!     AnalysisConfig, AnalyzerConfig, AnalyzerRegistry, TokenFilterConfig,
//! };
//!
//! let mut config = AnalysisConfig::default();
//! config.add_token_filter("ngram_filter", TokenFilterConfig::Ngram { min: 3, max: 4 });
//! config.add_analyzer(
//!     "ngram_analyzer",
//!     AnalyzerConfig::new("whitespace", ["stop_en", "porter", "to_lower", "ngram_filter"]),
//! );
//!
//! let registry = AnalyzerRegistry::from_config(&config).unwrap();
//! let terms: Vec<String> = registry
//!     .analyze("index", "ngram_analyzer")
//!     .unwrap()
//!     .into_iter()
//!     .map(|t| t.text)
//!     .collect();
//! assert_eq!(terms, vec!["ind", "inde", "nde", "ndex", "dex"]);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{
    Analyzer, KeywordAnalyzer, PipelineAnalyzer, SimpleAnalyzer, StandardAnalyzer,
};
use crate::analysis::token::Token;
use crate::analysis::token_filter::Filter;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::ngram::NGramFilter;
use crate::analysis::token_filter::stem::StemFilter;
use crate::analysis::token_filter::stop::StopFilter;
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;
use crate::analysis::tokenizer::whole::WholeTokenizer;
use crate::error::{Result, TesseraError};

/// Name of the analyzer used when nothing else is configured.
pub const FALLBACK_ANALYZER: &str = "standard";

/// Declaration of a custom token filter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenFilterConfig {
    /// Character n-grams of length `min..=max`.
    Ngram { min: usize, max: usize },
    /// Stop-word removal with a custom word list.
    Stop { words: Vec<String> },
    /// Lowercasing.
    Lowercase,
    /// Porter stemming.
    Porter,
}

impl TokenFilterConfig {
    fn build(&self) -> Result<Arc<dyn Filter>> {
        Ok(match self {
            TokenFilterConfig::Ngram { min, max } => Arc::new(NGramFilter::new(*min, *max)?),
            TokenFilterConfig::Stop { words } => Arc::new(StopFilter::from_words(words.clone())),
            TokenFilterConfig::Lowercase => Arc::new(LowercaseFilter::new()),
            TokenFilterConfig::Porter => Arc::new(StemFilter::new()),
        })
    }
}

/// Declaration of a custom analyzer: one tokenizer and an ordered list of
/// token filter names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub tokenizer: String,
    #[serde(default)]
    pub token_filters: Vec<String>,
}

impl AnalyzerConfig {
    /// Create an analyzer declaration.
    pub fn new<T, I, S>(tokenizer: T, token_filters: I) -> Self
    where
        T: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AnalyzerConfig {
            tokenizer: tokenizer.into(),
            token_filters: token_filters.into_iter().map(Into::into).collect(),
        }
    }
}

/// Custom analysis components declared in an index mapping.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub token_filters: BTreeMap<String, TokenFilterConfig>,
    #[serde(default)]
    pub analyzers: BTreeMap<String, AnalyzerConfig>,
}

impl AnalysisConfig {
    /// Declare a custom token filter.
    pub fn add_token_filter<S: Into<String>>(&mut self, name: S, config: TokenFilterConfig) {
        self.token_filters.insert(name.into(), config);
    }

    /// Declare a custom analyzer.
    pub fn add_analyzer<S: Into<String>>(&mut self, name: S, config: AnalyzerConfig) {
        self.analyzers.insert(name.into(), config);
    }
}

/// Named tokenizers, filters and analyzers, resolved once.
#[derive(Clone)]
pub struct AnalyzerRegistry {
    tokenizers: AHashMap<String, Arc<dyn Tokenizer>>,
    filters: AHashMap<String, Arc<dyn Filter>>,
    analyzers: AHashMap<String, Arc<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    /// Create a registry holding only the built-in components.
    pub fn new() -> Self {
        let mut tokenizers: AHashMap<String, Arc<dyn Tokenizer>> = AHashMap::new();
        let whitespace: Arc<dyn Tokenizer> = Arc::new(WhitespaceTokenizer::new());
        tokenizers.insert("whitespace".to_string(), Arc::clone(&whitespace));
        tokenizers.insert("unicode".to_string(), Arc::new(UnicodeWordTokenizer::new()));
        tokenizers.insert("single".to_string(), Arc::new(WholeTokenizer::new()));

        let mut filters: AHashMap<String, Arc<dyn Filter>> = AHashMap::new();
        let lowercase: Arc<dyn Filter> = Arc::new(LowercaseFilter::new());
        let porter: Arc<dyn Filter> = Arc::new(StemFilter::new());
        filters.insert("to_lower".to_string(), Arc::clone(&lowercase));
        filters.insert("lowercase".to_string(), lowercase);
        filters.insert("stop_en".to_string(), Arc::new(StopFilter::new()));
        filters.insert("porter".to_string(), Arc::clone(&porter));
        filters.insert("stemmer_porter".to_string(), porter);

        let mut analyzers: AHashMap<String, Arc<dyn Analyzer>> = AHashMap::new();
        analyzers.insert("standard".to_string(), Arc::new(StandardAnalyzer::new()));
        analyzers.insert("simple".to_string(), Arc::new(SimpleAnalyzer::new()));
        analyzers.insert("keyword".to_string(), Arc::new(KeywordAnalyzer::new()));
        analyzers.insert(
            "whitespace".to_string(),
            Arc::new(PipelineAnalyzer::new(whitespace).with_name("whitespace")),
        );

        AnalyzerRegistry {
            tokenizers,
            filters,
            analyzers,
        }
    }

    /// Build a registry from the built-ins plus the declared custom
    /// components. Filters are registered before analyzers so an analyzer
    /// may reference any declared filter.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        let mut registry = Self::new();
        for (name, filter) in &config.token_filters {
            registry.register_token_filter(name, filter)?;
        }
        for (name, analyzer) in &config.analyzers {
            registry.register_analyzer(name, analyzer)?;
        }
        Ok(registry)
    }

    /// Register a custom token filter under `name`.
    pub fn register_token_filter(&mut self, name: &str, config: &TokenFilterConfig) -> Result<()> {
        if self.filters.contains_key(name) {
            return Err(TesseraError::configuration(format!(
                "token filter '{name}' is already registered"
            )));
        }
        let filter = config
            .build()
            .map_err(|e| TesseraError::configuration(format!("token filter '{name}': {e}")))?;
        self.filters.insert(name.to_string(), filter);
        Ok(())
    }

    /// Register a custom analyzer under `name`, resolving its tokenizer and
    /// filters now.
    pub fn register_analyzer(&mut self, name: &str, config: &AnalyzerConfig) -> Result<()> {
        if self.analyzers.contains_key(name) {
            return Err(TesseraError::configuration(format!(
                "analyzer '{name}' is already registered"
            )));
        }

        let tokenizer = self.tokenizers.get(&config.tokenizer).ok_or_else(|| {
            TesseraError::configuration(format!(
                "analyzer '{name}': unknown tokenizer '{}'",
                config.tokenizer
            ))
        })?;

        let mut analyzer = PipelineAnalyzer::new(Arc::clone(tokenizer)).with_name(name);
        for filter_name in &config.token_filters {
            let filter = self.filters.get(filter_name).ok_or_else(|| {
                TesseraError::configuration(format!(
                    "analyzer '{name}': unknown token filter '{filter_name}'"
                ))
            })?;
            analyzer = analyzer.add_filter(Arc::clone(filter));
        }

        self.analyzers.insert(name.to_string(), Arc::new(analyzer));
        Ok(())
    }

    /// Look up an analyzer by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Analyzer>> {
        self.analyzers.get(name).cloned()
    }

    /// Look up an analyzer by name, failing with a configuration error.
    pub fn analyzer(&self, name: &str) -> Result<Arc<dyn Analyzer>> {
        self.get(name)
            .ok_or_else(|| TesseraError::configuration(format!("unknown analyzer '{name}'")))
    }

    /// The fallback analyzer.
    pub fn fallback(&self) -> Arc<dyn Analyzer> {
        match self.analyzers.get(FALLBACK_ANALYZER) {
            Some(analyzer) => Arc::clone(analyzer),
            None => Arc::new(StandardAnalyzer::new()),
        }
    }

    /// Whether an analyzer with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.analyzers.contains_key(name)
    }

    /// Analyze `text` with the named analyzer, dropping stopped tokens.
    pub fn analyze(&self, text: &str, analyzer_name: &str) -> Result<Vec<Token>> {
        self.analyzer(analyzer_name)?.analyze_to_vec(text)
    }

    /// Registered analyzer names, sorted.
    pub fn analyzer_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.analyzers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnalyzerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut filters: Vec<&String> = self.filters.keys().collect();
        filters.sort();
        f.debug_struct("AnalyzerRegistry")
            .field("analyzers", &self.analyzer_names())
            .field("filters", &filters)
            .finish()
    }
}
