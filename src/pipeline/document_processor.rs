//! Converts one document record to text, splits it into sentence-safe
//! chunks, runs the sentence segmenter, and analyses each produced sentence
//! (§4.5).

use tracing::{error, info, warn};

use crate::analysis::sentence_analyser;
use crate::config::IngestSettings;
use crate::error::{CorpusError, Result};
use crate::model::Document;
use crate::nlp::{HtmlToText, LanguageIdentifier, NlpCollaborator};
use crate::store::Store;

/// Splits `text` into chunks of at most `max_chars` characters. The end of
/// each chunk (other than the last) is walked backward to the nearest `.`;
/// if none is found within the chunk, it is cut blindly at `max_chars`
/// (§4.5). Concatenating the result reproduces `text` verbatim.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 {
        return vec![text.to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < chars.len() {
        let limit = (start + max_chars).min(chars.len());
        let mut end = limit;
        if limit < chars.len() {
            let mut cut = limit;
            while cut > start && chars[cut - 1] != '.' {
                cut -= 1;
            }
            if cut > start {
                end = cut;
            }
        }
        chunks.push(chars[start..end].iter().collect());
        start = end;
    }
    chunks
}

/// Drops any line containing four or more consecutive dots — dotted
/// leaders from a table of contents, which otherwise produce spurious
/// sentences (§4.5).
pub fn scrub_toc_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.contains("...."))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolves a document record to its extraction text: plain text if
/// present, otherwise HTML converted via the injected collaborator.
/// `SkipCondition` if neither is present (§4.5, §4.6).
fn resolve_text(document: &Document, html_to_text: &dyn HtmlToText) -> Result<String> {
    if !document.text.trim().is_empty() {
        return Ok(document.text.clone());
    }
    if !document.html.trim().is_empty() {
        return Ok(html_to_text.convert(&document.html));
    }
    Err(CorpusError::skip(format!(
        "document '{}' has neither text nor html",
        document.external_id
    )))
}

/// Extracts and commits every sentence of `document`, honouring
/// idempotence via the document's `processed` flag. Aborts and propagates
/// on a store error (which aborts only this document, per §7); per-sentence
/// `MissingReference`/`SkipCondition` errors are logged and swallowed so
/// the rest of the document continues.
pub async fn process_document(
    store: &Store,
    nlp: &dyn NlpCollaborator,
    language_identifier: &dyn LanguageIdentifier,
    html_to_text: &dyn HtmlToText,
    settings: &IngestSettings,
    document: &Document,
) -> Result<()> {
    let existing = store
        .get_document(document.dataset_id, &document.external_id)
        .await?;
    if let Some(row) = &existing {
        if row.processed {
            info!(document = %document.external_id, "already processed, skipping");
            return Ok(());
        }
    }

    let text = match resolve_text(document, html_to_text) {
        Ok(text) => text,
        Err(err) => {
            info!(document = %document.external_id, error = %err, "skipping document");
            return Ok(());
        }
    };

    let document_row = match existing {
        Some(row) => row,
        None => {
            store
                .insert_document(document.dataset_id, &document.external_id)
                .await?
        }
    };

    let scrubbed = scrub_toc_lines(&text);
    let chunks = chunk_text(&scrubbed, settings.chunk_size);

    for chunk in &chunks {
        let output = nlp.analyze_chunk(chunk);
        for sentence in &output.sentences {
            let result = sentence_analyser::analyze_sentence(
                store,
                sentence,
                &output.entities,
                document_row.id,
                settings,
                language_identifier,
            )
            .await;

            match result {
                Ok(_) => {}
                Err(err @ CorpusError::MissingReference(_)) => {
                    warn!(document = %document.external_id, error = %err, "sentence aborted");
                }
                Err(err @ CorpusError::SkipCondition(_)) => {
                    info!(document = %document.external_id, error = %err, "sentence skipped");
                }
                Err(err @ CorpusError::TransientStore(_)) => {
                    error!(document = %document.external_id, error = %err, "document aborted");
                    return Err(err);
                }
                Err(err) => return Err(err),
            }
        }
    }

    store.mark_document_processed(document_row.id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunk_text("Hej. Det är en mening.", 100_000);
        assert_eq!(chunks, vec!["Hej. Det är en mening.".to_string()]);
    }

    #[test]
    fn splits_at_nearest_preceding_period() {
        let text = "Aaaa. Bbbb. Cccc.";
        let chunks = chunk_text(text, 8);
        assert_eq!(chunks[0], "Aaaa.");
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn cuts_blindly_when_no_period_within_limit() {
        let text = "aaaaaaaaaaaaaaaaaaaa";
        let chunks = chunk_text(text, 5);
        assert_eq!(chunks[0].chars().count(), 5);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn concatenation_always_reproduces_the_input() {
        let text = "En mening. En till mening som är lite längre. Sista meningen här.";
        for limit in [1, 5, 10, 20, 1000] {
            let chunks = chunk_text(text, limit);
            assert_eq!(chunks.concat(), text, "limit={limit}");
        }
    }

    #[test]
    fn scrubs_toc_leader_lines() {
        let text = "Innehåll\nInledning ....... 3\nBakgrund .......... 5\nReal content here.";
        let scrubbed = scrub_toc_lines(text);
        assert!(!scrubbed.contains("......."));
        assert!(scrubbed.contains("Real content here."));
    }
}
