//! Error taxonomy for the ingest pipeline and query API.
//!
//! Mirrors the propagation policy of the pipeline: `SkipCondition` and
//! `MissingReference` are recoverable at sentence/document granularity,
//! `TransientStore` aborts the current document, and `FatalConfig` aborts
//! the process at startup. Library code always returns `Result<T, CorpusError>`;
//! only the binaries unwrap at the outermost edge.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    /// Malformed input or a document missing required fields. Counted and
    /// logged at info, never surfaced as a hard failure.
    #[error("skipped: {0}")]
    SkipCondition(String),

    /// An unknown POS tag, entity-type label, or language was referenced.
    /// Aborts the sentence currently being analysed.
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// Connection loss or other I/O failure against the store. Aborts the
    /// document currently being processed; the orchestrator continues.
    #[error("store error: {0}")]
    TransientStore(#[from] sqlx::Error),

    /// Missing or malformed configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    FatalConfig(String),
}

pub type Result<T> = std::result::Result<T, CorpusError>;

impl CorpusError {
    pub fn missing_reference(what: impl Into<String>) -> Self {
        Self::MissingReference(what.into())
    }

    pub fn skip(why: impl Into<String>) -> Self {
        Self::SkipCondition(why.into())
    }

    pub fn fatal_config(why: impl Into<String>) -> Self {
        Self::FatalConfig(why.into())
    }

    /// True for errors that abort only the current document, leaving the
    /// orchestrator free to continue with the next one.
    pub fn is_document_local(&self) -> bool {
        matches!(
            self,
            Self::SkipCondition(_) | Self::MissingReference(_) | Self::TransientStore(_)
        )
    }
}

/// Errors surfaced by the `/lookup` query endpoint. These never abort the
/// process; they are rendered into the response envelope's `errors` array.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Token cannot be empty.")]
    EmptyToken,

    #[error("Invalid ISO code: '{0}'.")]
    UnknownLanguage(String),

    #[error("Invalid QID: {0} for lexical_category_qid.")]
    UnknownLexicalCategory(String),
}
