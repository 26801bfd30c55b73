//! Documents and field values.
//!
//! A [`document::Document`] is an identifier, an optional document type and
//! an ordered list of named [`field_value::FieldValue`]s. Documents are
//! immutable once indexed; changing one means putting a full replacement
//! under the same ID.
//!
//! # Examples
//!
//! ```
//! use tessera::document::document::Document;
//!
//! let doc = Document::builder("0")
//!     .add_text("From", "marty.schoch@gmail.com")
//!     .add_text("Body", "bleve indexing is easy")
//!     .add_integer("priority", 2)
//!     .build();
//!
//! assert_eq!(doc.len(), 3);
//! assert!(doc.has_field("Body"));
//! ```

pub mod document;
pub mod field_value;

pub use document::{Document, DocumentBuilder, Field};
pub use field_value::FieldValue;
