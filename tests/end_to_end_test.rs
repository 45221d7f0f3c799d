//! End-to-end retrieval through files on disk.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use djmir::config::{BatchConfig, ExpansionConfig, RetrievalConfig};
use djmir::prelude::*;
use djmir::batch::write_expanded_queries;
use djmir::index::load_jsonl_corpus;
use djmir::query::read_queries;
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn toy_corpus(dir: &Path) -> std::path::PathBuf {
    write_file(
        dir,
        "corpus.jsonl",
        concat!(
            r#"{"docno": "doc1", "text": "Patient reports fever and a severe headache."}"#,
            "\n",
            r#"{"docno": "doc2", "text": "High fever overnight."}"#,
            "\n",
            r#"{"docno": "doc3", "text": "Persistent cough, no other symptoms."}"#,
            "\n",
        ),
    )
}

#[test]
fn test_fever_headache_ranking() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let corpus = toy_corpus(temp_dir.path());
    let queries_path = write_file(temp_dir.path(), "queries.txt", "Q1 fever headache\n");
    let run_path = temp_dir.path().join("run.txt");

    let analyzer = StandardAnalyzer::english()?;
    let index = load_jsonl_corpus(&corpus, &analyzer)?;
    let queries = read_queries(&queries_path, &analyzer)?;
    let config = RetrievalConfig::default();
    let scorer = DjmScorer::new(&config.scoring)?;

    let mut writer = TrecResultWriter::create(&run_path, "e2e")?;
    let summary = BatchRunner::new(&index, &scorer, config.batch)?.run(&queries, &mut writer)?;
    assert_eq!(summary.queries_run, 1);
    assert_eq!(summary.results_written, 2);

    let run = std::fs::read_to_string(&run_path)?;
    let lines: Vec<Vec<&str>> = run.lines().map(|l| l.split(' ').collect()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0][..4], ["Q1", "Q0", "doc1", "0"]);
    assert_eq!(lines[1][..4], ["Q1", "Q0", "doc2", "1"]);
    assert!(lines.iter().all(|l| l[5] == "e2e"));
    assert!(!run.contains("doc3"));

    let first: f64 = lines[0][4].parse().unwrap();
    let second: f64 = lines[1][4].parse().unwrap();
    assert!(first > second);
    Ok(())
}

#[test]
fn test_empty_vocabulary_is_identity() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let corpus = toy_corpus(temp_dir.path());
    let vocabulary_path = write_file(temp_dir.path(), "chv.txt", "");
    let queries_path = write_file(temp_dir.path(), "queries.txt", "Q1 fever headache\n");

    let analyzer = StandardAnalyzer::english()?;
    let index = load_jsonl_corpus(&corpus, &analyzer)?;
    let queries = read_queries(&queries_path, &analyzer)?;
    let vocabulary = Arc::new(ControlledVocabulary::load_or_empty(&vocabulary_path, &analyzer));
    assert!(vocabulary.is_empty());

    let expansion = StagedQueryExpansion::new(&index, vocabulary, ExpansionConfig::default());
    let query = &queries.queries[0];
    let expanded = expansion.expand(query)?;

    assert!(expanded.is_identity());
    assert_eq!(expanded.original_terms, query.terms);
    assert_eq!(expanded.terms().collect::<Vec<_>>(), vec!["fever", "headach"]);
    Ok(())
}

#[test]
fn test_missing_vocabulary_does_not_block_batch() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let corpus = toy_corpus(temp_dir.path());
    let queries_path = write_file(temp_dir.path(), "queries.txt", "Q1 fever\n");

    let analyzer = StandardAnalyzer::english()?;
    let index = load_jsonl_corpus(&corpus, &analyzer)?;
    let queries = read_queries(&queries_path, &analyzer)?;
    let vocabulary = Arc::new(ControlledVocabulary::load_or_empty(
        temp_dir.path().join("missing.txt"),
        &analyzer,
    ));
    let expansion = StagedQueryExpansion::new(&index, vocabulary, ExpansionConfig::default());
    let scorer = DjmScorer::new(&RetrievalConfig::default().scoring)?;

    let results = BatchRunner::new(&index, &scorer, BatchConfig::default())?
        .with_expander(&expansion)
        .run_collect(&queries)?;
    let docnos: Vec<_> = results[0].results.iter().map(|r| r.docno.as_str()).collect();
    assert_eq!(docnos, vec!["doc1", "doc2"]);
    Ok(())
}

#[test]
fn test_malformed_line_skipped_and_batch_continues() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let corpus = toy_corpus(temp_dir.path());
    let queries_path = write_file(
        temp_dir.path(),
        "queries.txt",
        "Q1 fever headache\nbroken\n\nQ2 persistent cough\n",
    );

    let analyzer = StandardAnalyzer::english()?;
    let index = load_jsonl_corpus(&corpus, &analyzer)?;
    let queries = read_queries(&queries_path, &analyzer)?;
    assert_eq!(queries.len(), 2);
    assert_eq!(queries.rejected.len(), 1);
    assert_eq!(queries.rejected[0].line_number, 2);

    let scorer = DjmScorer::new(&RetrievalConfig::default().scoring)?;
    let mut sink = MemorySink::new();
    let summary = BatchRunner::new(&index, &scorer, BatchConfig::default())?
        .run(&queries, &mut sink)?;

    assert_eq!(summary.rejected_lines, 1);
    assert_eq!(sink.results.len(), 2);
    assert_eq!(sink.results[1].query_id, "Q2");
    assert_eq!(sink.results[1].results[0].docno, "doc3");
    Ok(())
}

#[test]
fn test_expanded_query_export() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let corpus = write_file(
        temp_dir.path(),
        "corpus.jsonl",
        concat!(
            r#"{"docno": "a", "text": "fever pyrexia"}"#,
            "\n",
            r#"{"docno": "b", "text": "fever pyrexia chills"}"#,
            "\n",
            r#"{"docno": "c", "text": "cough"}"#,
            "\n",
            r#"{"docno": "d", "text": "rash"}"#,
            "\n",
        ),
    );
    let vocabulary_path = write_file(temp_dir.path(), "chv.txt", "C0015967\tfever\tpyrexia\n");
    let queries_path = write_file(temp_dir.path(), "queries.txt", "Q1 fever\nQ2 cough\n");

    let analyzer = StandardAnalyzer::english()?;
    let index = load_jsonl_corpus(&corpus, &analyzer)?;
    let queries = read_queries(&queries_path, &analyzer)?;
    let vocabulary = Arc::new(ControlledVocabulary::load(&vocabulary_path, &analyzer)?);
    let expansion = StagedQueryExpansion::new(&index, vocabulary, ExpansionConfig::default());

    let mut out = Vec::new();
    write_expanded_queries(&mut out, &queries, &expansion)?;
    assert_eq!(String::from_utf8(out).unwrap(), "Q1 fever pyrexia\nQ2 cough\n");
    Ok(())
}
