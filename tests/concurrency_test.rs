use std::sync::Arc;
use std::thread;

use tempfile::TempDir;
use tessera::config::IndexConfig;
use tessera::document::Document;
use tessera::error::Result;
use tessera::index::Index;
use tessera::mapping::IndexMapping;
use tessera::search::SearchRequest;

const WRITERS: usize = 4;
const DOCS_PER_WRITER: usize = 25;

fn doc(writer: usize, i: usize) -> Document {
    Document::builder(format!("w{writer}-{i:03}"))
        .add_text("Body", format!("common writer{writer} item{i}"))
        .add_text("Tag", "shared")
        .build()
}

fn hammer(index: Arc<Index>) -> Result<()> {
    let total = WRITERS * DOCS_PER_WRITER;

    let writers: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let index = Arc::clone(&index);
            thread::spawn(move || -> Result<()> {
                for i in 0..DOCS_PER_WRITER {
                    index.put(doc(writer, i))?;
                }
                Ok(())
            })
        })
        .collect();

    let readers: Vec<_> = (0..WRITERS)
        .map(|_| {
            let index = Arc::clone(&index);
            thread::spawn(move || -> Result<()> {
                let request = SearchRequest::match_text("common")
                    .with_limit(total)
                    .with_fields(["*"]);
                for _ in 0..50 {
                    let results = index.search(&request)?;
                    assert!(results.total_hits as usize <= total);
                    assert_eq!(results.hits.len() as u64, results.total_hits);
                    // A visible document is always complete.
                    for hit in &results.hits {
                        assert_eq!(hit.fields.len(), 2, "partial document {}", hit.id);
                    }
                }
                Ok(())
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().expect("thread panicked")?;
    }

    assert_eq!(index.doc_count()?, total);
    let results = index.search(&SearchRequest::match_text("shared").with_limit(total))?;
    assert_eq!(results.total_hits as usize, total);
    Ok(())
}

#[test]
fn test_concurrent_puts_and_searches_in_memory() -> Result<()> {
    hammer(Arc::new(Index::create_in_memory(IndexMapping::new())?))
}

#[test]
fn test_concurrent_puts_and_searches_on_disk() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("idx");
    let config = IndexConfig::default()
        .with_sync_writes(false)
        .with_checkpoint_interval(30);

    let index = Arc::new(Index::create(&path, IndexMapping::new(), config.clone())?);
    hammer(Arc::clone(&index))?;
    index.close()?;

    let reopened = Index::open(&path, config)?;
    assert_eq!(reopened.doc_count()?, WRITERS * DOCS_PER_WRITER);
    Ok(())
}

#[test]
fn test_concurrent_deletes() -> Result<()> {
    let index = Arc::new(Index::create_in_memory(IndexMapping::new())?);
    let docs: Vec<Document> = (0..40).map(|i| doc(0, i)).collect();
    index.put_batch(docs)?;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let index = Arc::clone(&index);
            thread::spawn(move || -> Result<usize> {
                let mut deleted = 0;
                for i in 0..40 {
                    if index.delete(&format!("w0-{i:03}"))? {
                        deleted += 1;
                    }
                }
                Ok(deleted)
            })
        })
        .collect();

    let mut deleted = 0;
    for handle in handles {
        deleted += handle.join().expect("thread panicked")?;
    }
    assert_eq!(deleted, 40);
    assert_eq!(index.doc_count()?, 0);
    assert!(index.postings_for_term("common")?.is_empty());
    Ok(())
}
