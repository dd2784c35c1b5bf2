//! End-to-end retrieval tests: ingest a candidate table, then drive the
//! pipeline through the public API, including the chat façade and
//! persistence across reopen.

use talent_db::{
    recruiter, AppContext, CandidateRecord, CandidateTable, Config, EmbeddingProvider,
    HashEmbedder, QueryFilter,
    RecruiterBot, RetrievalParams, StorePaths, VectorStore,
};

fn candidate(id: &str, nome: &str, level: &str, city: &str, skills: &str) -> CandidateRecord {
    CandidateRecord {
        applicant_id: id.to_string(),
        nome: Some(nome.to_string()),
        titulo_profissional: Some(skills.to_string()),
        nivel_profissional: Some(level.to_string()),
        cidade: Some(city.to_string()),
        ..Default::default()
    }
}

fn sample_table() -> CandidateTable {
    CandidateTable::from_records(vec![
        candidate("101", "Alice", "Senior", "São Paulo", "python machine learning"),
        candidate("102", "Bob", "Junior", "São Paulo", "python web development"),
        candidate("103", "Carol", "Senior", "Curitiba", "java backend services"),
        candidate("104", "Dave", "Pleno", "Recife", "accounting and finance"),
        candidate("105", "Eve", "Junior", "Curitiba", "python data analysis"),
    ])
}

fn wired_context(dir: &std::path::Path) -> AppContext {
    let mut config = Config::default();
    config.embedding.model = "hash-128".to_string();
    config.index.index_path = dir.join("vectors.tdb");
    config.index.meta_path = dir.join("metadata.tdb");

    let context = AppContext::from_config(&config, sample_table()).unwrap();
    context.ingest().unwrap();
    context
}

#[test]
fn derived_filters_narrow_the_results() {
    let dir = tempfile::tempdir().unwrap();
    let context = wired_context(dir.path());

    // "Senior" in the query derives a one-hot filter, so only the two
    // Senior rows are eligible regardless of text similarity.
    let results = context
        .find_top_applicants(
            "Senior engineer, python machine learning",
            None,
            RetrievalParams::default(),
        )
        .unwrap();

    let ids: Vec<&str> = results.iter().map(|r| r.applicant_id.as_str()).collect();
    assert_eq!(results.len(), 2);
    assert!(ids.contains(&"101"));
    assert!(ids.contains(&"103"));
    assert_eq!(results[0].applicant_id, "101");
}

#[test]
fn results_are_descending_and_capped() {
    let dir = tempfile::tempdir().unwrap();
    let context = wired_context(dir.path());

    let params = RetrievalParams {
        top_n: 3,
        search_k: 100,
    };
    let results = context
        .find_top_applicants_unfiltered("python developer", params)
        .unwrap();

    assert_eq!(results.len(), 3);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn explicit_filters_replace_derived_ones() {
    let dir = tempfile::tempdir().unwrap();
    let context = wired_context(dir.path());

    // The query says Senior, but the explicit filter pins Junior; the two
    // are never merged.
    let explicit = QueryFilter::from([("Junior".to_string(), 1i64.into())]);
    let results = context
        .find_top_applicants(
            "Senior python developer",
            Some(&explicit),
            RetrievalParams::default(),
        )
        .unwrap();

    assert!(!results.is_empty());
    for r in &results {
        assert!(["102", "105"].contains(&r.applicant_id.as_str()));
    }
}

#[test]
fn filtered_empty_has_explicit_unfiltered_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let context = wired_context(dir.path());

    // No row lives in Manaus, so the derived city filter empties the result.
    let query = "python developer in Manaus";
    let filtered = context
        .find_top_applicants(query, None, RetrievalParams::default())
        .unwrap();
    assert!(filtered.is_empty());

    let fallback = context
        .find_top_applicants_unfiltered(query, RetrievalParams::default())
        .unwrap();
    assert_eq!(fallback.len(), 5);
}

#[test]
fn chat_replies_use_fixed_strings() {
    let dir = tempfile::tempdir().unwrap();
    let context = wired_context(dir.path());
    let mut bot = RecruiterBot::new(&context);

    assert_eq!(
        bot.chat("   ").unwrap(),
        "Please provide a job description or more details."
    );
    assert_eq!(
        bot.chat("python developer in Manaus").unwrap(),
        "No applicants matched the current criteria."
    );

    let reply = bot.chat("python machine learning").unwrap();
    let lines: Vec<&str> = reply.lines().collect();
    assert_eq!(lines[0], recruiter::MATCHES_HEADER);
    // Bot default is top 5; the table has 5 rows and no filter applies.
    assert_eq!(lines.len(), 6);
    assert!(lines[1].starts_with("1. "));
    assert!(lines[1].contains(" — Score: "));
    assert!(lines[1].contains("(row_idx="));
}

#[test]
fn store_reopens_with_identical_results() {
    let dir = tempfile::tempdir().unwrap();
    let embedder = HashEmbedder::new(128).unwrap();
    let paths = StorePaths::in_dir(dir.path());

    let table = sample_table();
    let before = {
        let mut store = VectorStore::new(paths.clone(), 5);
        talent_db::ingest::ingest_candidates(&mut store, &embedder, &table).unwrap();

        let query = embedder.embed("python developer").unwrap();
        store.search(&query, 5)
    };

    let reopened = VectorStore::open(paths, 5);
    assert_eq!(reopened.len(), 5);

    let query = embedder.embed("python developer").unwrap();
    let after = reopened.search(&query, 5);

    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(&after) {
        assert_eq!(b.id, a.id);
        assert!((b.score - a.score).abs() < 1e-6);
        assert_eq!(b.metadata.get("idx"), a.metadata.get("idx"));
    }
}

#[test]
fn stale_back_references_degrade_gracefully() {
    let dir = tempfile::tempdir().unwrap();
    let embedder = HashEmbedder::new(64).unwrap();
    let mut store = VectorStore::new(StorePaths::in_dir(dir.path()), 5);

    talent_db::ingest::ingest_candidates(&mut store, &embedder, &sample_table()).unwrap();

    // Retrieval against a shorter table than the one ingested: rows past
    // the end resolve to nothing and are dropped, not errors.
    let truncated = CandidateTable::from_records(vec![candidate(
        "101",
        "Alice",
        "Senior",
        "São Paulo",
        "python machine learning",
    )]);

    let results = talent_db::find_top_applicants_unfiltered(
        "python",
        &store,
        &embedder,
        &truncated,
        RetrievalParams::default(),
    )
    .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].applicant_id, "101");
}
