//! Index-wide mapping and its resolved form.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::registry::{AnalysisConfig, AnalyzerRegistry, FALLBACK_ANALYZER};
use crate::error::{Result, TesseraError};
use crate::mapping::document_mapping::DocumentMapping;

/// Type name used for documents that carry no type.
pub const DEFAULT_TYPE: &str = "_default";

fn default_type() -> String {
    DEFAULT_TYPE.to_string()
}

/// Serializable mapping for a whole index.
///
/// # Examples
///
/// ```
/// use tessera::mapping::{DocumentMapping, FieldMapping, IndexMapping};
///
/// let mapping = IndexMapping::new()
///     .with_default_analyzer("simple")
///     .add_type_mapping(
///         "email",
///         DocumentMapping::new().add_field("From", FieldMapping::text().with_analyzer("keyword")),
///     );
///
/// assert_eq!(mapping.analyzer_name_for(Some("email"), "From"), "keyword");
/// assert_eq!(mapping.analyzer_name_for(Some("email"), "Body"), "simple");
/// assert_eq!(mapping.analyzer_name_for(None, "Body"), "simple");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_analyzer: Option<String>,

    /// Type assumed for documents without one.
    #[serde(default = "default_type")]
    pub default_type: String,

    #[serde(default)]
    pub type_mappings: BTreeMap<String, DocumentMapping>,

    /// Mapping for documents whose type has no entry in `type_mappings`.
    #[serde(default)]
    pub default_mapping: DocumentMapping,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl IndexMapping {
    pub fn new() -> Self {
        IndexMapping {
            default_analyzer: None,
            default_type: default_type(),
            type_mappings: BTreeMap::new(),
            default_mapping: DocumentMapping::new(),
            analysis: AnalysisConfig::default(),
        }
    }

    pub fn with_default_analyzer<S: Into<String>>(mut self, analyzer: S) -> Self {
        self.default_analyzer = Some(analyzer.into());
        self
    }

    pub fn with_default_type<S: Into<String>>(mut self, doc_type: S) -> Self {
        self.default_type = doc_type.into();
        self
    }

    pub fn with_default_mapping(mut self, mapping: DocumentMapping) -> Self {
        self.default_mapping = mapping;
        self
    }

    pub fn with_analysis(mut self, analysis: AnalysisConfig) -> Self {
        self.analysis = analysis;
        self
    }

    pub fn add_type_mapping<S: Into<String>>(mut self, doc_type: S, mapping: DocumentMapping) -> Self {
        self.type_mappings.insert(doc_type.into(), mapping);
        self
    }

    /// Parse a mapping from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| TesseraError::configuration(format!("invalid mapping JSON: {e}")))
    }

    /// The effective index-level default analyzer name.
    pub fn effective_default_analyzer(&self) -> &str {
        self.default_analyzer.as_deref().unwrap_or(FALLBACK_ANALYZER)
    }

    /// The document mapping that applies to a document of `doc_type`.
    pub fn document_mapping(&self, doc_type: Option<&str>) -> &DocumentMapping {
        let doc_type = doc_type.unwrap_or(&self.default_type);
        self.type_mappings
            .get(doc_type)
            .unwrap_or(&self.default_mapping)
    }

    fn analyzer_within<'a>(&'a self, mapping: &'a DocumentMapping, field: &str) -> &'a str {
        mapping
            .field(field)
            .and_then(|f| f.analyzer.as_deref())
            .or(mapping.default_analyzer.as_deref())
            .unwrap_or_else(|| self.effective_default_analyzer())
    }

    /// Analyzer name for a field of a document of `doc_type`.
    ///
    /// Field override, then type default, then index default, then
    /// the built-in fallback.
    pub fn analyzer_name_for(&self, doc_type: Option<&str>, field: &str) -> &str {
        self.analyzer_within(self.document_mapping(doc_type), field)
    }

    /// Analyzer name used to analyze query text aimed at `field` when the
    /// index holds no postings recording how the field was analyzed.
    ///
    /// The first type mapping (by type name) that declares the field wins,
    /// then the default mapping, then the index default.
    pub fn query_analyzer_name(&self, field: &str) -> &str {
        for mapping in self.type_mappings.values() {
            if mapping.field(field).is_some() {
                return self.analyzer_within(mapping, field);
            }
        }
        self.analyzer_within(&self.default_mapping, field)
    }

    /// Whether `field` of a `doc_type` document is handled at all, and
    /// with which options. `None` means the field is ignored.
    pub fn field_options(&self, doc_type: Option<&str>, field: &str) -> Option<FieldOptions<'_>> {
        let mapping = self.document_mapping(doc_type);
        if !mapping.enabled {
            return None;
        }
        let (store, index) = match mapping.field(field) {
            Some(declared) => (declared.store, declared.index),
            None if mapping.dynamic => (true, true),
            None => return None,
        };
        Some(FieldOptions {
            analyzer: self.analyzer_within(mapping, field),
            store,
            index,
        })
    }

    /// Every analyzer name the mapping refers to.
    pub fn referenced_analyzers(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        names.insert(self.effective_default_analyzer());
        for mapping in self.type_mappings.values().chain(std::iter::once(&self.default_mapping)) {
            if let Some(name) = mapping.default_analyzer.as_deref() {
                names.insert(name);
            }
            for field in mapping.fields.values() {
                if let Some(name) = field.analyzer.as_deref() {
                    names.insert(name);
                }
            }
        }
        names
    }

    /// Check that every referenced analyzer exists in `registry`.
    pub fn validate(&self, registry: &AnalyzerRegistry) -> Result<()> {
        if self.default_type.is_empty() {
            return Err(TesseraError::configuration("default type must not be empty"));
        }
        if let Some(name) = self.type_mappings.keys().find(|name| name.is_empty()) {
            return Err(TesseraError::configuration(format!(
                "type mapping name must not be empty (got '{name}')"
            )));
        }
        for name in self.referenced_analyzers() {
            if !registry.contains(name) {
                return Err(TesseraError::configuration(format!(
                    "mapping references unknown analyzer '{name}'"
                )));
            }
        }
        Ok(())
    }

    /// Check that `self`, requested by a caller, can be used against an
    /// index persisted with `persisted`.
    ///
    /// Additions are compatible. Changing the analysis of anything both
    /// mappings define is a conflict, since existing postings would no
    /// longer agree with query-time analysis.
    pub fn check_compatible(&self, persisted: &IndexMapping) -> Result<()> {
        if self == persisted {
            return Ok(());
        }
        let conflict = |what: String| {
            Err(TesseraError::configuration(format!(
                "mapping conflicts with persisted index: {what}"
            )))
        };

        if self.effective_default_analyzer() != persisted.effective_default_analyzer() {
            return conflict(format!(
                "default analyzer '{}' != '{}'",
                self.effective_default_analyzer(),
                persisted.effective_default_analyzer()
            ));
        }
        if self.default_type != persisted.default_type {
            return conflict(format!(
                "default type '{}' != '{}'",
                self.default_type, persisted.default_type
            ));
        }
        for (name, filter) in &self.analysis.token_filters {
            if let Some(old) = persisted.analysis.token_filters.get(name) {
                if old != filter {
                    return conflict(format!("token filter '{name}' redefined"));
                }
            }
        }
        for (name, analyzer) in &self.analysis.analyzers {
            if let Some(old) = persisted.analysis.analyzers.get(name) {
                if old != analyzer {
                    return conflict(format!("analyzer '{name}' redefined"));
                }
            }
        }

        let pairs = self
            .type_mappings
            .iter()
            .filter_map(|(name, mapping)| {
                persisted
                    .type_mappings
                    .get(name)
                    .map(|old| (name.as_str(), mapping, old))
            })
            .chain(std::iter::once((
                "default mapping",
                &self.default_mapping,
                &persisted.default_mapping,
            )));
        for (type_name, mapping, old) in pairs {
            for field in mapping.fields.keys() {
                if old.field(field).is_none() {
                    continue;
                }
                let new_analyzer = self.analyzer_within(mapping, field);
                let old_analyzer = persisted.analyzer_within(old, field);
                if new_analyzer != old_analyzer {
                    return conflict(format!(
                        "{type_name} field '{field}' analyzer '{new_analyzer}' != '{old_analyzer}'"
                    ));
                }
            }
        }
        Ok(())
    }

    /// `self` (the persisted mapping) extended with what `requested` adds:
    /// custom token filters and analyzers, type mappings, and field
    /// declarations under existing types.
    ///
    /// Settings both mappings define keep the persisted value. Run
    /// [`IndexMapping::check_compatible`] first so those never disagree on
    /// analysis.
    pub fn merge_additions(&self, requested: &IndexMapping) -> IndexMapping {
        let mut merged = self.clone();

        for (name, filter) in &requested.analysis.token_filters {
            merged
                .analysis
                .token_filters
                .entry(name.clone())
                .or_insert_with(|| filter.clone());
        }
        for (name, analyzer) in &requested.analysis.analyzers {
            merged
                .analysis
                .analyzers
                .entry(name.clone())
                .or_insert_with(|| analyzer.clone());
        }

        for (type_name, mapping) in &requested.type_mappings {
            match merged.type_mappings.get_mut(type_name) {
                Some(existing) => add_missing_fields(existing, mapping),
                None => {
                    merged.type_mappings.insert(type_name.clone(), mapping.clone());
                }
            }
        }
        add_missing_fields(&mut merged.default_mapping, &requested.default_mapping);

        merged
    }
}

fn add_missing_fields(target: &mut DocumentMapping, source: &DocumentMapping) {
    for (name, field) in &source.fields {
        target
            .fields
            .entry(name.clone())
            .or_insert_with(|| field.clone());
    }
}

impl Default for IndexMapping {
    fn default() -> Self {
        Self::new()
    }
}

/// Options for a field as seen through the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOptions<'a> {
    pub analyzer: &'a str,
    pub store: bool,
    pub index: bool,
}

/// A field's options with its analyzer already looked up.
#[derive(Debug, Clone)]
pub struct ResolvedField<'a> {
    /// Registered name of `analyzer`.
    pub analyzer_name: &'a str,
    pub analyzer: Arc<dyn Analyzer>,
    pub store: bool,
    pub index: bool,
}

/// A validated mapping paired with the registry built from it.
///
/// Built once when an index is created or opened; after that every lookup
/// is infallible.
#[derive(Debug, Clone)]
pub struct ResolvedMapping {
    mapping: IndexMapping,
    registry: AnalyzerRegistry,
}

impl ResolvedMapping {
    /// Build the registry for `mapping` and validate the mapping against it.
    pub fn new(mapping: IndexMapping) -> Result<Self> {
        let registry = AnalyzerRegistry::from_config(&mapping.analysis)?;
        mapping.validate(&registry)?;
        Ok(ResolvedMapping { mapping, registry })
    }

    pub fn mapping(&self) -> &IndexMapping {
        &self.mapping
    }

    pub fn registry(&self) -> &AnalyzerRegistry {
        &self.registry
    }

    fn lookup(&self, name: &str) -> Arc<dyn Analyzer> {
        self.registry
            .get(name)
            .unwrap_or_else(|| self.registry.fallback())
    }

    /// The analyzer for `field` of a `doc_type` document.
    pub fn resolve_analyzer(&self, doc_type: Option<&str>, field: &str) -> Arc<dyn Analyzer> {
        self.lookup(self.mapping.analyzer_name_for(doc_type, field))
    }

    /// The analyzer for query text aimed at `field`.
    pub fn query_analyzer(&self, field: &str) -> Arc<dyn Analyzer> {
        self.lookup(self.mapping.query_analyzer_name(field))
    }

    /// Field options with the analyzer resolved; `None` if the field is
    /// ignored for this document type.
    pub fn resolve_field(&self, doc_type: Option<&str>, field: &str) -> Option<ResolvedField<'_>> {
        self.mapping
            .field_options(doc_type, field)
            .map(|options| ResolvedField {
                analyzer_name: options.analyzer,
                analyzer: self.lookup(options.analyzer),
                store: options.store,
                index: options.index,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::registry::{AnalyzerConfig, TokenFilterConfig};
    use crate::mapping::field::FieldMapping;

    fn demo_mapping() -> IndexMapping {
        let mut analysis = AnalysisConfig::default();
        analysis.add_token_filter("ngram_filter", TokenFilterConfig::Ngram { min: 3, max: 4 });
        analysis.add_analyzer(
            "ngram_analyzer",
            AnalyzerConfig::new("whitespace", ["stop_en", "porter", "to_lower", "ngram_filter"]),
        );
        IndexMapping::new()
            .with_analysis(analysis)
            .with_default_analyzer("ngram_analyzer")
    }

    #[test]
    fn test_resolution_order() {
        let mapping = IndexMapping::new()
            .with_default_analyzer("simple")
            .add_type_mapping(
                "email",
                DocumentMapping::new()
                    .with_default_analyzer("whitespace")
                    .add_field("From", FieldMapping::text().with_analyzer("keyword")),
            );

        assert_eq!(mapping.analyzer_name_for(Some("email"), "From"), "keyword");
        assert_eq!(mapping.analyzer_name_for(Some("email"), "Body"), "whitespace");
        assert_eq!(mapping.analyzer_name_for(Some("other"), "Body"), "simple");
        assert_eq!(IndexMapping::new().analyzer_name_for(None, "Body"), "standard");
    }

    #[test]
    fn test_query_resolution_prefers_first_declaring_type() {
        let mapping = IndexMapping::new()
            .add_type_mapping(
                "b",
                DocumentMapping::new().add_field("f", FieldMapping::text().with_analyzer("simple")),
            )
            .add_type_mapping(
                "a",
                DocumentMapping::new().add_field("f", FieldMapping::text().with_analyzer("keyword")),
            );

        assert_eq!(mapping.query_analyzer_name("f"), "keyword");
        assert_eq!(mapping.query_analyzer_name("g"), "standard");
    }

    #[test]
    fn test_field_options() {
        let mapping = IndexMapping::new()
            .add_type_mapping("hidden", DocumentMapping::disabled())
            .add_type_mapping(
                "strict",
                DocumentMapping::new()
                    .with_dynamic(false)
                    .add_field("kept", FieldMapping::text().stored(false)),
            );

        assert!(mapping.field_options(Some("hidden"), "x").is_none());
        assert!(mapping.field_options(Some("strict"), "other").is_none());

        let kept = mapping.field_options(Some("strict"), "kept").unwrap();
        assert!(!kept.store);
        assert!(kept.index);

        let dynamic = mapping.field_options(None, "anything").unwrap();
        assert!(dynamic.store && dynamic.index);
    }

    #[test]
    fn test_validate_unknown_analyzer() {
        let mapping = IndexMapping::new().with_default_analyzer("nope");
        let err = ResolvedMapping::new(mapping).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_resolved_demo_mapping() {
        let resolved = ResolvedMapping::new(demo_mapping()).unwrap();
        assert_eq!(resolved.resolve_analyzer(None, "Body").name(), "ngram_analyzer");
        assert_eq!(resolved.query_analyzer("From").name(), "ngram_analyzer");
        assert!(resolved.resolve_field(None, "Body").is_some());
    }

    #[test]
    fn test_compatibility() {
        let persisted = demo_mapping();
        assert!(persisted.check_compatible(&persisted).is_ok());

        let added = persisted.clone().add_type_mapping(
            "email",
            DocumentMapping::new().add_field("From", FieldMapping::text()),
        );
        assert!(added.check_compatible(&persisted).is_ok());

        let changed = persisted.clone().with_default_analyzer("standard");
        assert!(changed.check_compatible(&persisted).unwrap_err().is_configuration());

        let mut redefined = persisted.clone();
        redefined
            .analysis
            .add_token_filter("ngram_filter", TokenFilterConfig::Ngram { min: 2, max: 3 });
        assert!(redefined.check_compatible(&persisted).is_err());
    }

    #[test]
    fn test_merge_additions() {
        let persisted = demo_mapping().add_type_mapping(
            "email",
            DocumentMapping::new()
                .with_default_analyzer("simple")
                .add_field("From", FieldMapping::text()),
        );

        let mut requested = persisted.clone();
        requested
            .analysis
            .add_analyzer("plain", AnalyzerConfig::new("whitespace", ["to_lower"]));
        let requested = requested
            .add_type_mapping(
                "email",
                DocumentMapping::new()
                    .with_default_analyzer("simple")
                    .with_dynamic(false)
                    .add_field("From", FieldMapping::text())
                    .add_field("Subject", FieldMapping::text().with_analyzer("plain")),
            )
            .add_type_mapping("note", DocumentMapping::new());
        assert!(requested.check_compatible(&persisted).is_ok());

        let merged = persisted.merge_additions(&requested);
        assert!(merged.analysis.analyzers.contains_key("plain"));
        assert!(merged.type_mappings.contains_key("note"));

        let email = &merged.type_mappings["email"];
        assert!(email.field("Subject").is_some());
        // Settings both define keep the persisted value.
        assert!(email.dynamic);
        assert!(ResolvedMapping::new(merged.clone()).is_ok());

        assert_eq!(persisted.merge_additions(&persisted), persisted);
    }

    #[test]
    fn test_field_analyzer_change_conflicts() {
        let persisted = IndexMapping::new().add_type_mapping(
            "email",
            DocumentMapping::new().add_field("From", FieldMapping::text().with_analyzer("keyword")),
        );
        let requested = IndexMapping::new().add_type_mapping(
            "email",
            DocumentMapping::new().add_field("From", FieldMapping::text().with_analyzer("simple")),
        );
        assert!(requested.check_compatible(&persisted).is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_defaults() {
        let mapping = IndexMapping::from_json(r#"{"default_analyzer": "simple"}"#).unwrap();
        assert_eq!(mapping.default_type, DEFAULT_TYPE);
        assert!(mapping.default_mapping.dynamic);

        let json = serde_json::to_string(&demo_mapping()).unwrap();
        assert_eq!(IndexMapping::from_json(&json).unwrap(), demo_mapping());

        assert!(IndexMapping::from_json("not json").unwrap_err().is_configuration());
    }
}
