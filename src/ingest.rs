//! Batch ingestion of candidate rows into the vector store.
//!
//! Combines each row's fields into one embeddable text, batch-embeds, and
//! inserts the vectors with normalized metadata carrying the `idx`
//! back-reference the retrieval path resolves through.

use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::metadata::transform::{
    self, ACADEMIC_LEVELS, CITIES, FIELD_ACADEMIC, FIELD_CITY, FIELD_PROFESSIONAL,
    LANGUAGE_FIELDS, PROFESSIONAL_LEVELS,
};
use crate::metadata::{Metadata, MetadataValue};
use crate::retrieval::{CandidateRecord, CandidateTable};
use crate::store::VectorStore;
use tracing::info;

/// Combine a candidate row into a single embeddable text.
///
/// Uses the pre-combined `text` field when the row carries one; otherwise
/// joins the known fields and any extra attributes as `label: value` lines,
/// skipping absent values.
pub fn combine_fields(record: &CandidateRecord) -> String {
    if let Some(text) = &record.text {
        return text.clone();
    }

    let mut parts: Vec<String> = Vec::new();
    let known = [
        ("nome", &record.nome),
        ("titulo_profissional", &record.titulo_profissional),
        (FIELD_PROFESSIONAL, &record.nivel_profissional),
        (FIELD_ACADEMIC, &record.nivel_academico),
        (LANGUAGE_FIELDS[0], &record.nivel_ingles),
        (LANGUAGE_FIELDS[1], &record.nivel_espanhol),
        (FIELD_CITY, &record.cidade),
    ];
    for (label, value) in known {
        if let Some(value) = value {
            parts.push(format!("{label}: {value}"));
        }
    }

    // Extras in sorted key order so the combined text is stable.
    let mut extras: Vec<(&String, &MetadataValue)> = record.extra.iter().collect();
    extras.sort_by_key(|(key, _)| key.as_str());
    for (key, value) in extras {
        if let Some(text) = value_text(value) {
            parts.push(format!("{key}: {text}"));
        }
    }

    parts.join("\n")
}

/// Build the normalized metadata stored with a candidate's vector.
///
/// Carries the row position as `idx`, the categorical fields expanded to
/// their one-hot form, and languages collapsed to presence flags.
pub fn build_metadata(idx: usize, record: &CandidateRecord) -> Metadata {
    let mut raw = Metadata::new();
    raw.insert("idx".into(), (idx as i64).into());
    raw.insert("applicant_id".into(), record.applicant_id.as_str().into());

    let categorical = [
        (FIELD_PROFESSIONAL, &record.nivel_profissional),
        (FIELD_ACADEMIC, &record.nivel_academico),
        (LANGUAGE_FIELDS[0], &record.nivel_ingles),
        (LANGUAGE_FIELDS[1], &record.nivel_espanhol),
        (FIELD_CITY, &record.cidade),
    ];
    for (field, value) in categorical {
        if let Some(value) = value {
            raw.insert(field.into(), value.as_str().into());
        }
    }

    transform::normalize(&raw)
}

/// Ingest every row of `candidates` into the store.
///
/// Embeds all combined texts in one batch, inserts them with their metadata,
/// and builds bitmap indices over the one-hot filter fields. Returns the
/// number of rows ingested.
pub fn ingest_candidates(
    store: &mut VectorStore,
    embedder: &dyn EmbeddingProvider,
    candidates: &CandidateTable,
) -> Result<usize> {
    if candidates.is_empty() {
        return Ok(0);
    }

    let texts: Vec<String> = candidates
        .iter()
        .map(|(_, record)| combine_fields(record))
        .collect();
    let metadata: Vec<Metadata> = candidates
        .iter()
        .map(|(idx, record)| build_metadata(idx, record))
        .collect();

    let embeddings = embedder.embed_batch(&texts)?;
    store.add_batch(&embeddings, metadata)?;
    index_filter_fields(store);

    info!(rows = candidates.len(), "ingested candidate table");
    Ok(candidates.len())
}

/// Build bitmap indices over every field the filter extractor can emit.
pub fn index_filter_fields(store: &mut VectorStore) {
    for field in PROFESSIONAL_LEVELS
        .iter()
        .chain(ACADEMIC_LEVELS.iter())
        .chain(CITIES.iter())
        .chain(LANGUAGE_FIELDS.iter())
    {
        store.build_metadata_index(field);
    }
}

fn value_text(value: &MetadataValue) -> Option<String> {
    match value {
        MetadataValue::Null => None,
        MetadataValue::String(s) => Some(s.clone()),
        MetadataValue::Integer(i) => Some(i.to_string()),
        MetadataValue::Float(f) => Some(f.to_string()),
        MetadataValue::Boolean(b) => Some(b.to_string()),
    }
}
