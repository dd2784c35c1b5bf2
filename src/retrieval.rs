//! Retrieval orchestration.
//!
//! Composes the embedding provider, the vector store, and the filter
//! extractor: embed the query, fetch a candidate pool from the index, prune
//! by derived or explicit filters, resolve hits back to source candidate
//! rows, re-rank by score, and cut to top-N.

use crate::embedding::EmbeddingProvider;
use crate::error::{Result, TalentDbError};
use crate::metadata::{Metadata, MetadataFilter, MetadataValue, QueryFilter};
use crate::query::extract_filters;
use crate::store::{SearchHit, VectorStore};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

/// A row of the source applicant table.
///
/// Known fields are explicit and optional; anything else rides in the
/// `extra` bag for passthrough display. Read-only from the retrieval path's
/// perspective.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Stable applicant identifier from the source system.
    pub applicant_id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    /// Professional title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titulo_profissional: Option<String>,
    /// Seniority level (Junior/Pleno/Senior).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nivel_profissional: Option<String>,
    /// Academic level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nivel_academico: Option<String>,
    /// English proficiency as reported by the applicant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nivel_ingles: Option<String>,
    /// Spanish proficiency as reported by the applicant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nivel_espanhol: Option<String>,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidade: Option<String>,
    /// Pre-combined résumé text used for embedding, when already prepared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Passthrough attributes not part of the fixed schema.
    #[serde(flatten)]
    pub extra: HashMap<String, MetadataValue>,
}

/// Position-addressable table of candidate rows.
///
/// Owned by the external batch data layer; the retrieval path only reads it
/// through the `idx` back-reference carried in vector metadata.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CandidateTable {
    rows: Vec<CandidateRecord>,
}

impl CandidateTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows.
    pub fn from_records(rows: Vec<CandidateRecord>) -> Self {
        Self { rows }
    }

    /// Load a table from a JSON array of records.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let rows: Vec<CandidateRecord> = serde_json::from_slice(&bytes)
            .map_err(|e| TalentDbError::serialization_error(e.to_string()))?;
        Ok(Self { rows })
    }

    /// Row at position `idx`.
    pub fn get(&self, idx: usize) -> Option<&CandidateRecord> {
        self.rows.get(idx)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over (position, record) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CandidateRecord)> {
        self.rows.iter().enumerate()
    }
}

/// Knobs for the retrieval pipeline.
///
/// `search_k` is the candidate pool width fetched from the index before
/// filtering; `top_n` is the final cut. The effective pool width is
/// `max(search_k, top_n)`.
#[derive(Clone, Copy, Debug)]
pub struct RetrievalParams {
    /// Maximum number of results returned.
    pub top_n: usize,
    /// Neighbor pool width fetched before filtering.
    pub search_k: usize,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            top_n: crate::constants::retrieval::DEFAULT_TOP_N,
            search_k: crate::constants::retrieval::DEFAULT_SEARCH_K,
        }
    }
}

impl RetrievalParams {
    fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(TalentDbError::invalid_parameter("top_n must be positive"));
        }
        if self.search_k == 0 {
            return Err(TalentDbError::invalid_parameter(
                "search_k must be positive",
            ));
        }
        Ok(())
    }

    fn pool_width(&self) -> usize {
        self.search_k.max(self.top_n)
    }
}

/// A resolved retrieval result.
#[derive(Clone, Debug)]
pub struct CandidateMatch {
    /// Row position in the candidate table.
    pub applicant_idx: usize,
    /// Stable applicant identifier.
    pub applicant_id: String,
    /// Display name, when the source row carries one.
    pub display_name: Option<String>,
    /// Similarity score of the underlying hit.
    pub score: f32,
    /// Metadata stored with the matched vector.
    pub metadata: Metadata,
}

/// Retrieve the top applicants for a job description, applying filters.
///
/// Filters come from `explicit_filters` when supplied, otherwise they are
/// derived from `query_text`; the two are never merged. Returns at most
/// `params.top_n` matches in descending score order, and however many
/// survive the filter — possibly none. For an unfiltered retry use
/// [`find_top_applicants_unfiltered`].
pub fn find_top_applicants(
    query_text: &str,
    store: &VectorStore,
    embedder: &dyn EmbeddingProvider,
    candidates: &CandidateTable,
    explicit_filters: Option<&QueryFilter>,
    params: RetrievalParams,
) -> Result<Vec<CandidateMatch>> {
    params.validate()?;
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let filter: MetadataFilter = match explicit_filters {
        Some(filters) => filters.into(),
        None => extract_filters(query_text).into(),
    };

    let query = embedder.embed(query_text)?;
    let hits = store.search_with_filters(&query, params.pool_width(), &filter);

    Ok(resolve_and_rank(hits, candidates, params.top_n))
}

/// Retrieve the top applicants without any filtering.
///
/// The explicitly named fallback for callers whose filtered retrieval came
/// back empty and who prefer unfiltered matches over none.
pub fn find_top_applicants_unfiltered(
    query_text: &str,
    store: &VectorStore,
    embedder: &dyn EmbeddingProvider,
    candidates: &CandidateTable,
    params: RetrievalParams,
) -> Result<Vec<CandidateMatch>> {
    params.validate()?;
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let query = embedder.embed(query_text)?;
    let hits = store.search(&query, params.pool_width());

    Ok(resolve_and_rank(hits, candidates, params.top_n))
}

/// Resolve hits to candidate rows via the `idx` back-reference, re-sort by
/// descending score, and truncate.
///
/// Hits without a resolvable `idx` are silently dropped: a stale
/// back-reference degrades that hit, not the whole query.
fn resolve_and_rank(
    hits: Vec<SearchHit>,
    candidates: &CandidateTable,
    top_n: usize,
) -> Vec<CandidateMatch> {
    let mut matches: Vec<CandidateMatch> = hits
        .into_iter()
        .filter_map(|hit| {
            let idx = hit
                .metadata
                .get("idx")
                .and_then(MetadataValue::as_integer)
                .and_then(|i| usize::try_from(i).ok())?;
            let row = candidates.get(idx)?;

            Some(CandidateMatch {
                applicant_idx: idx,
                applicant_id: row.applicant_id.clone(),
                display_name: row.nome.clone(),
                score: hit.score,
                metadata: hit.metadata,
            })
        })
        .collect();

    // Defensive re-sort; the index order should already satisfy this.
    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.applicant_idx.cmp(&b.applicant_idx))
    });
    matches.truncate(top_n);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StorePaths;

    /// Embedder returning fixed vectors keyed by text, for deterministic
    /// scenario tests.
    struct FixedEmbedder {
        dim: usize,
        vectors: HashMap<String, Vec<f32>>,
        fallback: Vec<f32>,
    }

    impl EmbeddingProvider for FixedEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(self
                .vectors
                .get(text)
                .cloned()
                .unwrap_or_else(|| self.fallback.clone()))
        }

        fn dimension(&self) -> usize {
            self.dim
        }
    }

    fn candidate(id: &str, nome: Option<&str>) -> CandidateRecord {
        CandidateRecord {
            applicant_id: id.to_string(),
            nome: nome.map(str::to_string),
            ..Default::default()
        }
    }

    fn indexed_meta(idx: i64, level: &str) -> Metadata {
        let mut m = Metadata::new();
        m.insert("idx".into(), idx.into());
        m.insert("nivel_profissional".into(), level.into());
        m
    }

    fn scenario() -> (tempfile::TempDir, VectorStore, CandidateTable, FixedEmbedder) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = VectorStore::new(StorePaths::in_dir(dir.path()), 5);
        store.add(&[1.0, 0.0], indexed_meta(0, "Senior")).unwrap();
        store.add(&[0.0, 1.0], indexed_meta(1, "Junior")).unwrap();

        let table = CandidateTable::from_records(vec![
            candidate("101", Some("Alice")),
            candidate("102", Some("Bob")),
        ]);

        let embedder = FixedEmbedder {
            dim: 2,
            vectors: HashMap::from([("engineer".to_string(), vec![0.9, 0.1])]),
            fallback: vec![0.5, 0.5],
        };

        (dir, store, table, embedder)
    }

    #[test]
    fn test_top_candidate_wins() {
        let (_dir, store, table, embedder) = scenario();

        let results = find_top_applicants(
            "engineer",
            &store,
            &embedder,
            &table,
            None,
            RetrievalParams {
                top_n: 1,
                search_k: 10,
            },
        )
        .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].applicant_idx, 0);
        assert_eq!(results[0].applicant_id, "101");
        assert_eq!(results[0].display_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_empty_candidate_table_returns_empty() {
        let (_dir, store, _table, embedder) = scenario();

        let results = find_top_applicants(
            "engineer",
            &store,
            &embedder,
            &CandidateTable::new(),
            None,
            RetrievalParams::default(),
        )
        .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_explicit_filters_take_precedence() {
        let (_dir, store, table, embedder) = scenario();

        // Query text derives no filters, but the explicit filter restricts
        // to Junior, overriding the nearest (Senior) hit.
        let explicit: QueryFilter =
            HashMap::from([("nivel_profissional".to_string(), "Junior".into())]);

        let results = find_top_applicants(
            "engineer",
            &store,
            &embedder,
            &table,
            Some(&explicit),
            RetrievalParams {
                top_n: 5,
                search_k: 10,
            },
        )
        .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].applicant_idx, 1);
    }

    #[test]
    fn test_unresolvable_idx_dropped() {
        let (_dir, mut store, table, embedder) = scenario();
        // Vector with an idx pointing past the table end.
        store.add(&[0.99, 0.14], indexed_meta(99, "Senior")).unwrap();
        // Vector with no idx at all.
        store
            .add(&[0.98, 0.19], Metadata::from([(
                "nivel_profissional".to_string(),
                MetadataValue::from("Senior"),
            )]))
            .unwrap();

        let results = find_top_applicants(
            "engineer",
            &store,
            &embedder,
            &table,
            None,
            RetrievalParams {
                top_n: 10,
                search_k: 10,
            },
        )
        .unwrap();

        let idxs: Vec<usize> = results.iter().map(|r| r.applicant_idx).collect();
        assert_eq!(idxs, vec![0, 1]);
    }

    #[test]
    fn test_filtered_empty_then_unfiltered_fallback() {
        let (_dir, store, table, embedder) = scenario();

        let explicit: QueryFilter =
            HashMap::from([("nivel_profissional".to_string(), "Pleno".into())]);
        let params = RetrievalParams {
            top_n: 5,
            search_k: 10,
        };

        let filtered = find_top_applicants(
            "engineer",
            &store,
            &embedder,
            &table,
            Some(&explicit),
            params,
        )
        .unwrap();
        assert!(filtered.is_empty());

        let fallback =
            find_top_applicants_unfiltered("engineer", &store, &embedder, &table, params).unwrap();
        assert_eq!(fallback.len(), 2);
        assert_eq!(fallback[0].applicant_idx, 0);
    }

    #[test]
    fn test_zero_top_n_rejected() {
        let (_dir, store, table, embedder) = scenario();
        let err = find_top_applicants(
            "engineer",
            &store,
            &embedder,
            &table,
            None,
            RetrievalParams {
                top_n: 0,
                search_k: 10,
            },
        )
        .unwrap_err();
        assert!(matches!(err, TalentDbError::InvalidParameter(_)));
    }

    #[test]
    fn test_candidate_record_json_roundtrip() {
        let json = r#"[
            {"applicant_id": "101", "nome": "Alice", "cidade": "São Paulo",
             "telefone": "11 99999-0000"},
            {"applicant_id": "102"}
        ]"#;

        let rows: Vec<CandidateRecord> = serde_json::from_str(json).unwrap();
        let table = CandidateTable::from_records(rows);

        assert_eq!(table.len(), 2);
        let alice = table.get(0).unwrap();
        assert_eq!(alice.nome.as_deref(), Some("Alice"));
        assert_eq!(alice.cidade.as_deref(), Some("São Paulo"));
        assert_eq!(
            alice.extra.get("telefone"),
            Some(&MetadataValue::String("11 99999-0000".into()))
        );
        assert!(table.get(1).unwrap().nome.is_none());
        assert!(table.get(2).is_none());
    }
}
