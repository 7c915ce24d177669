//! Interfaces to the external collaborators named in the purpose/scope:
//! the NLP model (sentence segmenter, POS tagger, named-entity recogniser),
//! the language-identification model, and the HTML-to-text converter.
//!
//! None of these are implemented here as production models — they are
//! process-wide capabilities constructed once and injected into the
//! analysers, never held as globals. `heuristic` ships a reference-grade
//! stand-in for each trait so the pipeline and its tests run without a
//! real model attached.

pub mod heuristic;

use std::ops::Range;

/// One token as produced by the segmenter/tagger, with its byte-offset span
/// within the chunk that was analysed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedToken {
    pub text: String,
    pub pos_tag: String,
    pub span: Range<usize>,
}

/// One sentence as produced by the segmenter, with its own span and the
/// tokens found within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedSentence {
    pub text: String,
    pub span: Range<usize>,
    pub tokens: Vec<SegmentedToken>,
}

/// A named-entity mention scoped to the whole chunk the NER model saw —
/// the sentence analyser intersects these spans against its own sentence
/// span (§4.4) rather than the segmenter doing that narrowing itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedEntityMention {
    pub surface: String,
    pub type_label: String,
    pub span: Range<usize>,
}

/// Combined output of one segmenter+NER pass over a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NlpChunkOutput {
    pub sentences: Vec<SegmentedSentence>,
    pub entities: Vec<NamedEntityMention>,
}

/// Sentence segmentation, tokenisation and named-entity recognition over a
/// single document chunk. A real implementation wraps a loaded NLP model;
/// §5 requires it be loaded once per document and released once the
/// document completes.
pub trait NlpCollaborator: Send + Sync {
    fn analyze_chunk(&self, chunk: &str) -> NlpChunkOutput;
}

/// Probabilistic language identification over already-cleaned text.
pub trait LanguageIdentifier: Send + Sync {
    /// Returns `(iso_code, confidence)` with confidence in `[0, 1]`.
    fn identify(&self, cleaned_text: &str) -> (String, f64);
}

/// Extracts visible text from an HTML document body, using spaces as
/// separators between elements (§4.5).
pub trait HtmlToText: Send + Sync {
    fn convert(&self, html: &str) -> String;
}
