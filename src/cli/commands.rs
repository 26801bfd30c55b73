//! Command implementations for the tessera CLI.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, bail};
use log::{debug, info};
use serde_json::{Map, Value};

use crate::cli::args::*;
use crate::cli::demo;
use crate::cli::output::*;
use crate::document::Document;
use crate::index::Index;
use crate::mapping::IndexMapping;
use crate::query::{MatchQuery, Query, TermQuery};
use crate::search::SearchRequest;

/// Execute a CLI command.
pub fn execute_command(args: TesseraArgs) -> anyhow::Result<()> {
    match &args.command {
        Command::Create(create_args) => create_index(create_args, &args),
        Command::Put(put_args) => put_documents(put_args, &args),
        Command::Delete(delete_args) => delete_documents(delete_args, &args),
        Command::Get(get_args) => get_document(get_args, &args),
        Command::Search(search_args) => search_index(search_args, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &args),
        Command::Demo(demo_args) => run_demo(demo_args, &args),
    }
}

/// Create a new index.
fn create_index(args: &CreateArgs, cli_args: &TesseraArgs) -> anyhow::Result<()> {
    let mapping = load_mapping(args.mapping.as_deref())?;
    let index = Index::create(&args.index_path, mapping, cli_args.index.to_config())
        .with_context(|| format!("cannot create index at {}", args.index_path.display()))?;

    let report = CreateReport {
        path: args.index_path.display().to_string(),
        default_analyzer: index.mapping().effective_default_analyzer().to_string(),
        types: index.mapping().type_mappings.keys().cloned().collect(),
    };
    close(index, &args.index_path)?;
    output_result(&report, cli_args)?;
    Ok(())
}

/// Index the documents of a file, creating the index if needed.
fn put_documents(args: &PutArgs, cli_args: &TesseraArgs) -> anyhow::Result<()> {
    let documents = read_documents(&args.document_file, &args.id_field)?;
    let config = cli_args.index.to_config();

    let index = match &args.mapping {
        Some(mapping_file) => {
            let mapping = load_mapping(Some(mapping_file))?;
            Index::open_or_create_with_config(&args.index_path, mapping, config)
        }
        None if Index::exists(&args.index_path)? => Index::open(&args.index_path, config),
        None => Index::create(&args.index_path, IndexMapping::new(), config),
    }
    .with_context(|| format!("cannot open index at {}", args.index_path.display()))?;

    let start = Instant::now();
    let mut indexed = 0;
    for batch in documents.chunks(args.batch_size.max(1)) {
        indexed += index.put_batch(batch.to_vec())?;
        debug!("indexed {indexed} of {} documents", documents.len());
    }
    let elapsed = start.elapsed();

    close(index, &args.index_path)?;
    output_result(
        &PutReport {
            documents_indexed: indexed,
            duration_ms: elapsed.as_millis() as u64,
            docs_per_second: indexed as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        },
        cli_args,
    )?;
    Ok(())
}

/// Delete documents by ID.
fn delete_documents(args: &DeleteArgs, cli_args: &TesseraArgs) -> anyhow::Result<()> {
    let index = open(&args.index_path, cli_args)?;

    let mut report = DeleteReport {
        deleted: Vec::new(),
        not_found: Vec::new(),
    };
    for id in &args.ids {
        if index.delete(id)? {
            report.deleted.push(id.clone());
        } else {
            report.not_found.push(id.clone());
        }
    }

    close(index, &args.index_path)?;
    output_result(&report, cli_args)?;
    Ok(())
}

/// Print the stored fields of one document.
fn get_document(args: &GetArgs, cli_args: &TesseraArgs) -> anyhow::Result<()> {
    let index = open(&args.index_path, cli_args)?;
    let fields = index.fetch(&args.id, args.fields.as_slice())?;
    close(index, &args.index_path)?;

    let report = DocumentReport {
        id: args.id.clone(),
        found: fields.is_some(),
        fields: fields
            .unwrap_or_default()
            .into_iter()
            .map(|(name, value)| (name, value.to_json()))
            .collect(),
    };
    output_result(&report, cli_args)?;
    Ok(())
}

/// Run one query.
fn search_index(args: &SearchArgs, cli_args: &TesseraArgs) -> anyhow::Result<()> {
    let query = build_query(args)?;
    let request = SearchRequest::from_boxed(query)
        .with_fields(args.fields.iter().cloned())
        .with_limit(args.limit)
        .with_offset(args.offset);

    let index = open(&args.index_path, cli_args)?;
    let results = index.search(&request)?;
    close(index, &args.index_path)?;

    output_result(
        &QueryReport {
            query: request.query.description(),
            results,
        },
        cli_args,
    )?;
    Ok(())
}

fn build_query(args: &SearchArgs) -> anyhow::Result<Box<dyn Query>> {
    Ok(match args.mode {
        SearchMode::Match => {
            let mut query = MatchQuery::new(args.query.as_str())
                .with_operator(args.operator.into())
                .with_boost(args.boost);
            if let Some(field) = &args.field {
                query = query.with_field(field.as_str());
            }
            Box::new(query)
        }
        SearchMode::Term => {
            let Some(field) = &args.field else {
                bail!("term search needs --field");
            };
            Box::new(TermQuery::new(field.as_str(), args.query.as_str()).with_boost(args.boost))
        }
    })
}

/// Show document and term counts.
fn show_stats(args: &StatsArgs, cli_args: &TesseraArgs) -> anyhow::Result<()> {
    let index = open(&args.index_path, cli_args)?;
    let stats = index.stats()?;
    close(index, &args.index_path)?;

    output_result(
        &StatsReport {
            path: args.index_path.display().to_string(),
            stats,
        },
        cli_args,
    )?;
    Ok(())
}

/// Index the sample messages (once) and run the sample queries.
fn run_demo(args: &DemoArgs, cli_args: &TesseraArgs) -> anyhow::Result<()> {
    let config = cli_args.index.to_config();
    let (index, fresh) = if args.in_memory {
        (Index::create_in_memory_with_config(demo::mapping(), config)?, true)
    } else {
        let existed = Index::exists(&args.index_path)?;
        let index = Index::open_or_create_with_config(&args.index_path, demo::mapping(), config)
            .with_context(|| format!("cannot open demo index at {}", args.index_path.display()))?;
        (index, !existed)
    };

    let indexed = if fresh {
        index.put_batch(demo::messages())?
    } else {
        info!(
            "reusing {} documents already in {}",
            index.doc_count()?,
            args.index_path.display()
        );
        0
    };

    let queries = demo::queries()
        .into_iter()
        .map(|request| {
            let results = index.search(&request)?;
            Ok(QueryReport {
                query: request.query.description(),
                results,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    close(index, &args.index_path)?;
    output_result(&DemoReport { indexed, queries }, cli_args)?;
    Ok(())
}

fn open(path: &Path, cli_args: &TesseraArgs) -> anyhow::Result<Index> {
    Index::open(path, cli_args.index.to_config())
        .with_context(|| format!("cannot open index at {}", path.display()))
}

fn close(index: Index, path: &Path) -> anyhow::Result<()> {
    index
        .close()
        .with_context(|| format!("cannot close index at {}", path.display()))
}

/// Read a mapping file, or the default mapping when none is given.
fn load_mapping(path: Option<&Path>) -> anyhow::Result<IndexMapping> {
    let Some(path) = path else {
        return Ok(IndexMapping::new());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("cannot read mapping file {}", path.display()))?;
    IndexMapping::from_json(&json)
        .with_context(|| format!("invalid mapping file {}", path.display()))
}

/// Read documents from a JSON object, a JSON array of objects, or JSON Lines.
fn read_documents(path: &Path, id_field: &str) -> anyhow::Result<Vec<Document>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read document file {}", path.display()))?;

    let values = match serde_json::from_str::<Value>(&text) {
        Ok(Value::Array(values)) => values,
        Ok(value) => vec![value],
        Err(_) => text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(number, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("{}:{}: invalid JSON", path.display(), number + 1))
            })
            .collect::<anyhow::Result<Vec<Value>>>()?,
    };

    values
        .into_iter()
        .enumerate()
        .map(|(position, value)| {
            document_from_value(value, id_field).with_context(|| {
                format!("{}: document #{}", path.display(), position + 1)
            })
        })
        .collect()
}

/// Split the ID out of a JSON object and build a document from the rest.
fn document_from_value(value: Value, id_field: &str) -> anyhow::Result<Document> {
    let Value::Object(mut object) = value else {
        bail!("expected a JSON object");
    };

    let id = match object.remove(id_field) {
        Some(Value::String(id)) => id,
        Some(Value::Number(id)) => id.to_string(),
        Some(other) => bail!("'{id_field}' must be a string or a number, got {other}"),
        None => bail!("missing '{id_field}'"),
    };

    Ok(Document::from_json(id, &Value::Object(object))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_document_from_value() {
        let doc = document_from_value(
            json!({"id": 7, "_type": "email", "From": "a@b.c"}),
            "id",
        )
        .unwrap();

        assert_eq!(doc.id(), "7");
        assert_eq!(doc.doc_type(), Some("email"));
        assert!(!doc.has_field("id"));
        assert!(doc.has_field("From"));

        assert!(document_from_value(json!({"From": "x"}), "id").is_err());
        assert!(document_from_value(json!({"id": [1]}), "id").is_err());
        assert!(document_from_value(json!("text"), "id").is_err());
    }

    #[test]
    fn test_read_documents_formats() {
        let dir = TempDir::new().unwrap();

        let array = dir.path().join("docs.json");
        fs::write(&array, r#"[{"id": "a", "Body": "x"}, {"id": "b", "Body": "y"}]"#).unwrap();
        assert_eq!(read_documents(&array, "id").unwrap().len(), 2);

        let single = dir.path().join("doc.json");
        fs::write(&single, r#"{"key": "a", "Body": "x"}"#).unwrap();
        assert_eq!(read_documents(&single, "key").unwrap()[0].id(), "a");

        let lines = dir.path().join("docs.jsonl");
        fs::write(&lines, "{\"id\": \"a\"}\n\n{\"id\": \"b\"}\n").unwrap();
        let docs = read_documents(&lines, "id").unwrap();
        assert_eq!(docs.iter().map(|d| d.id()).collect::<Vec<_>>(), vec!["a", "b"]);

        let broken = dir.path().join("broken.jsonl");
        fs::write(&broken, "{\"id\": \"a\"}\n{oops\n").unwrap();
        let err = read_documents(&broken, "id").unwrap_err();
        assert!(format!("{err:#}").contains(":2: invalid JSON"));
    }

    #[test]
    fn test_load_mapping() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapping.json");
        fs::write(&path, serde_json::to_string(&demo::mapping()).unwrap()).unwrap();

        assert_eq!(load_mapping(Some(&path)).unwrap(), demo::mapping());
        assert_eq!(load_mapping(None).unwrap(), IndexMapping::new());

        fs::write(&path, "{not json").unwrap();
        assert!(load_mapping(Some(&path)).is_err());
    }

    #[test]
    fn test_term_mode_needs_field() {
        let args = TesseraArgs::try_parse_from(["tessera", "search", "idx", "bleve", "-m", "term"])
            .unwrap();
        let Command::Search(search) = args.command else {
            panic!("Expected Search command");
        };
        assert!(build_query(&search).is_err());
    }
}
