//! The sample data set: six short e-mails indexed with a 3-4 character
//! n-gram analyzer, queried four ways.

use crate::analysis::{AnalysisConfig, AnalyzerConfig, TokenFilterConfig};
use crate::document::Document;
use crate::mapping::{DocumentMapping, FieldMapping, IndexMapping};
use crate::query::MatchQuery;
use crate::search::SearchRequest;

/// Document type of the sample messages.
pub const EMAIL_TYPE: &str = "email";

/// Fields returned with every demo hit.
pub const RETURNED_FIELDS: [&str; 2] = ["From", "Body"];

const MESSAGES: [(&str, &str, &str); 6] = [
    ("0", "marty.schoch@gmail.com", "bleve indexing is easy"),
    ("1", "aouyang1@gmail.com", "I'm Trying to learn bleve"),
    ("2", "souyang1@gmail.com", "why is Bleve hard?"),
    ("3", "blargh@gmail.com", "what is indexes asdf bevel"),
    ("4", "blargh@gmail.com", "what watery indexes asdf bevel"),
    (
        "5",
        "blargh@gmail.com",
        "water is something Like This In Wisconsin asdf bevel",
    ),
];

/// The demo mapping: `ngram_analyzer` (whitespace, stop_en, porter,
/// to_lower, 3-4 grams) as the index default, plus an `email` type that
/// declares `From` and `Body` as stored text fields.
pub fn mapping() -> IndexMapping {
    let mut analysis = AnalysisConfig::default();
    analysis.add_token_filter("ngram_filter", TokenFilterConfig::Ngram { min: 3, max: 4 });
    analysis.add_analyzer(
        "ngram_analyzer",
        AnalyzerConfig::new("whitespace", ["stop_en", "porter", "to_lower", "ngram_filter"]),
    );

    let email = DocumentMapping::new()
        .add_field("From", FieldMapping::text())
        .add_field("Body", FieldMapping::text());

    IndexMapping::new()
        .with_analysis(analysis)
        .with_default_analyzer("ngram_analyzer")
        .add_type_mapping(EMAIL_TYPE, email)
}

/// The six sample messages.
pub fn messages() -> Vec<Document> {
    MESSAGES
        .iter()
        .map(|(id, from, body)| {
            Document::builder(*id)
                .doc_type(EMAIL_TYPE)
                .add_text("From", *from)
                .add_text("Body", *body)
                .build()
        })
        .collect()
}

/// The four sample queries.
pub fn queries() -> Vec<SearchRequest> {
    [
        MatchQuery::new("bleve"),
        MatchQuery::new("index"),
        MatchQuery::new("watered"),
        MatchQuery::new("ouya").with_field("From"),
    ]
    .into_iter()
    .map(|query| SearchRequest::new(query).with_fields(RETURNED_FIELDS))
    .collect()
}
