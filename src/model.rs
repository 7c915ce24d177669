//! In-memory value records for the entities of the data model.
//!
//! Per the design notes: these are plain value records keyed by the
//! surrogate id the store assigned them. There are no back-references and
//! no `@property`-style lazy re-query — once a caller holds one of these,
//! the id is cached on the struct and further store calls take the id
//! directly instead of re-deriving it from the natural key.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Language {
    pub id: i64,
    pub name_en: String,
    pub iso_code: String,
    pub qid: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct LexicalCategory {
    pub id: i64,
    pub postag: String,
    pub qid: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct EntityTypeLabel {
    pub id: i64,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Dataset {
    pub id: i64,
    pub title: String,
    pub qid: i64,
    pub workdirectory: String,
    pub collection: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DocumentRow {
    pub id: i64,
    pub dataset_id: i64,
    pub external_id: String,
    pub processed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct Score {
    pub id: i64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SentenceRow {
    pub id: i64,
    pub text: String,
    pub uuid: Uuid,
    pub document_id: i64,
    pub language_id: i64,
    pub score_id: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct RawTokenRow {
    pub id: i64,
    pub text: String,
    pub lexical_category_id: i64,
    pub language_id: i64,
    pub score_id: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct NormTokenRow {
    pub id: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct EntityRow {
    pub id: i64,
    pub label: String,
    pub entity_type_label_id: i64,
}

/// A newly constructed document handed to the processor before it has a
/// store id. `processed` is always false for a document still to be
/// extracted; the store is the sole writer of that flag thereafter.
#[derive(Debug, Clone)]
pub struct Document {
    pub dataset_id: i64,
    pub external_id: String,
    pub text: String,
    pub html: String,
}

/// Row returned to HTTP clients by the query service (§4.8).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentenceResult {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attributes: SentenceAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentenceAttributes {
    pub text: String,
    pub score: f64,
}

impl SentenceResult {
    pub fn new(id: Uuid, text: String, score: f64) -> Self {
        Self {
            id,
            kind: "sentence",
            attributes: SentenceAttributes { text, score },
        }
    }
}
