//! Runs a search request against one consistent index state.

use std::time::Instant;

use log::debug;

use crate::error::Result;
use crate::index::state::IndexState;
use crate::mapping::ResolvedMapping;
use crate::query::{Collector, QueryContext, TopDocsCollector};
use crate::search::request::SearchRequest;
use crate::search::results::{SearchHit, SearchResults};

/// Executes requests over a borrowed index state. The caller holds the
/// read lock for the searcher's lifetime.
#[derive(Debug, Clone, Copy)]
pub struct Searcher<'a> {
    state: &'a IndexState,
    mapping: &'a ResolvedMapping,
}

impl<'a> Searcher<'a> {
    pub fn new(state: &'a IndexState, mapping: &'a ResolvedMapping) -> Self {
        Searcher { state, mapping }
    }

    /// Analyze, look up, score, rank, then fetch the requested fields of
    /// the returned page.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        let start = Instant::now();
        request.validate()?;

        let ctx = QueryContext {
            mapping: self.mapping,
            inverted: &self.state.inverted,
            total_docs: self.state.doc_count(),
        };
        let compiled = request.query.compile(&ctx)?;
        if compiled.is_empty() {
            return Ok(SearchResults::empty(start.elapsed()));
        }

        let mut collector = TopDocsCollector::new(request.offset, request.limit);
        for doc in compiled.execute(&ctx) {
            collector.collect(doc);
        }
        let total_hits = collector.total_hits();
        let max_score = collector.max_score();

        let hits = collector
            .into_results()
            .into_iter()
            .map(|doc| SearchHit {
                fields: self
                    .state
                    .documents
                    .fetch(&doc.doc_id, &request.fields)
                    .unwrap_or_default(),
                id: doc.doc_id,
                score: doc.score,
            })
            .collect();

        let took = start.elapsed();
        debug!(
            "{}: {total_hits} hits in {:.3} ms",
            request.query.description(),
            took.as_secs_f64() * 1000.0
        );

        Ok(SearchResults {
            total_hits,
            max_score,
            hits,
            took,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::index::analyzed::AnalyzedDocument;
    use crate::mapping::IndexMapping;
    use crate::query::{MatchQuery, TermQuery};

    fn state(mapping: &ResolvedMapping) -> IndexState {
        let mut state = IndexState::new();
        for (id, body) in [
            ("D1", "bleve indexing is easy"),
            ("D2", "I'm trying to learn bleve"),
            ("D3", "why is bleve hard"),
        ] {
            let doc = Document::builder(id).add_text("Body", body).build();
            state.apply_put(&AnalyzedDocument::analyze(&doc, mapping).unwrap());
        }
        state
    }

    #[test]
    fn test_equal_scores_rank_by_id() {
        let mapping = ResolvedMapping::new(IndexMapping::new()).unwrap();
        let state = state(&mapping);
        let searcher = Searcher::new(&state, &mapping);

        let results = searcher
            .search(&SearchRequest::new(MatchQuery::new("bleve")).with_fields(["*"]))
            .unwrap();
        assert_eq!(results.total_hits, 3);
        assert_eq!(results.ids(), vec!["D1", "D2", "D3"]);
        assert_eq!(results.hits[0].score, results.hits[2].score);
        assert_eq!(results.max_score, results.hits[0].score);
        assert!(results.hits[0].fields.contains_key("Body"));
    }

    #[test]
    fn test_paging_and_no_match() {
        let mapping = ResolvedMapping::new(IndexMapping::new()).unwrap();
        let state = state(&mapping);
        let searcher = Searcher::new(&state, &mapping);

        let page = searcher
            .search(&SearchRequest::match_text("bleve").with_offset(1).with_limit(1))
            .unwrap();
        assert_eq!(page.total_hits, 3);
        assert_eq!(page.ids(), vec!["D2"]);
        assert!(page.hits[0].fields.is_empty());

        let none = searcher
            .search(&SearchRequest::match_text("zzzznomatch"))
            .unwrap();
        assert_eq!(none.total_hits, 0);
        assert!(none.is_empty());
    }

    #[test]
    fn test_term_query_is_not_analyzed() {
        let mapping = ResolvedMapping::new(IndexMapping::new()).unwrap();
        let state = state(&mapping);
        let searcher = Searcher::new(&state, &mapping);

        let lower = searcher
            .search(&SearchRequest::new(TermQuery::new("Body", "learn")))
            .unwrap();
        assert_eq!(lower.ids(), vec!["D2"]);

        let upper = searcher
            .search(&SearchRequest::new(TermQuery::new("Body", "Learn")))
            .unwrap();
        assert!(upper.is_empty());
    }

    #[test]
    fn test_invalid_query_is_rejected() {
        let mapping = ResolvedMapping::new(IndexMapping::new()).unwrap();
        let state = state(&mapping);
        let err = Searcher::new(&state, &mapping)
            .search(&SearchRequest::new(MatchQuery::new("x").with_boost(f32::NAN)))
            .unwrap_err();
        assert!(matches!(err, crate::error::TesseraError::Query(_)));
    }
}
