//! Search results.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::document::FieldValue;

/// One ranked document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    /// Requested stored fields that the document has.
    #[serde(serialize_with = "serialize_fields")]
    pub fields: BTreeMap<String, FieldValue>,
}

/// The outcome of a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    /// Matching documents before paging.
    pub total_hits: u64,
    /// Highest score among all matches.
    pub max_score: f32,
    pub hits: Vec<SearchHit>,
    #[serde(rename = "took_ms", serialize_with = "serialize_millis")]
    pub took: Duration,
}

impl SearchResults {
    /// An empty result.
    pub fn empty(took: Duration) -> Self {
        SearchResults {
            total_hits: 0,
            max_score: 0.0,
            hits: Vec::new(),
            took,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Hit IDs in rank order.
    pub fn ids(&self) -> Vec<&str> {
        self.hits.iter().map(|hit| hit.id.as_str()).collect()
    }
}

fn serialize_fields<S: Serializer>(
    fields: &BTreeMap<String, FieldValue>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (name, value) in fields {
        map.serialize_entry(name, &value.to_json())?;
    }
    map.end()
}

fn serialize_millis<S: Serializer>(took: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(took.as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let mut fields = BTreeMap::new();
        fields.insert("From".to_string(), FieldValue::from("marty.schoch@gmail.com"));
        fields.insert("size".to_string(), FieldValue::Integer(3));
        let results = SearchResults {
            total_hits: 1,
            max_score: 0.5,
            hits: vec![SearchHit {
                id: "0".to_string(),
                score: 0.5,
                fields,
            }],
            took: Duration::from_millis(2),
        };

        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["total_hits"], 1);
        assert_eq!(json["hits"][0]["fields"]["From"], "marty.schoch@gmail.com");
        assert_eq!(json["hits"][0]["fields"]["size"], 3);
        assert_eq!(json["took_ms"], 2.0);
        assert_eq!(results.ids(), vec!["0"]);
    }

    #[test]
    fn test_empty() {
        let results = SearchResults::empty(Duration::ZERO);
        assert!(results.is_empty());
        assert_eq!(results.total_hits, 0);
    }
}
