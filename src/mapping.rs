//! Index mapping: which analyzer and storage options apply to each field.
//!
//! An [`index_mapping::IndexMapping`] is plain serializable configuration.
//! Turning it into a [`index_mapping::ResolvedMapping`] builds the analyzer
//! registry and validates every analyzer name it references; that happens
//! once, when an index is created or opened.
//!
//! Analyzer resolution for a document field, first match wins:
//!
//! ```text
//! field mapping analyzer → document-type default → index default → "standard"
//! ```

pub mod document_mapping;
pub mod field;
pub mod index_mapping;

pub use document_mapping::DocumentMapping;
pub use field::FieldMapping;
pub use index_mapping::{DEFAULT_TYPE, FieldOptions, IndexMapping, ResolvedField, ResolvedMapping};
