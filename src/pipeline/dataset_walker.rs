//! Enumerates per-dataset working directories, parses per-document JSON
//! records, and hands validated documents to the document processor (§4.6).

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{error, info};

use crate::config::IngestSettings;
use crate::error::Result;
use crate::model::{Dataset, Document};
use crate::nlp::{HtmlToText, LanguageIdentifier, NlpCollaborator};
use crate::pipeline::document_processor::process_document;
use crate::store::Store;

/// Recursively collects every `.json` file beneath `dir`. Directory
/// enumeration order is whatever the filesystem returns — stable per run,
/// unspecified across runs, matching §5's ordering guarantees.
fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
            out.push(path);
        }
    }
    Ok(())
}

/// Extracts `(dok_id, text, html)` from a raw JSON document, requiring the
/// `dokumentstatus.dokument` path (§4.6, §6).
fn extract_document_fields(value: &Value) -> Option<(String, String, String)> {
    let dokument = value.get("dokumentstatus")?.get("dokument")?;
    let dok_id = dokument.get("dok_id")?.as_str()?.to_string();
    let text = dokument
        .get("text")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let html = dokument
        .get("html")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    if text.trim().is_empty() && html.trim().is_empty() {
        return None;
    }
    Some((dok_id, text, html))
}

/// Walks one dataset's working directory, processing up to
/// `max_documents` documents (0 = unlimited). Returns the number of
/// documents processed (not skipped).
pub async fn walk_dataset(
    store: &Store,
    nlp: &dyn NlpCollaborator,
    language_identifier: &dyn LanguageIdentifier,
    html_to_text: &dyn HtmlToText,
    settings: &IngestSettings,
    dataset: &Dataset,
    max_documents: usize,
) -> Result<usize> {
    let mut files = Vec::new();
    if let Err(err) = collect_json_files(Path::new(&dataset.workdirectory), &mut files) {
        info!(dataset = %dataset.title, error = %err, "failed to enumerate dataset directory");
        return Ok(0);
    }
    files.sort();

    let mut processed = 0usize;
    for path in &files {
        if max_documents != 0 && processed >= max_documents {
            break;
        }

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                info!(file = %path.display(), error = %err, "skipping unreadable file");
                continue;
            }
        };
        let value: Value = match serde_json::from_str(raw.trim_start_matches('\u{feff}')) {
            Ok(value) => value,
            Err(err) => {
                info!(file = %path.display(), error = %err, "skipping malformed JSON");
                continue;
            }
        };
        let Some((dok_id, text, html)) = extract_document_fields(&value) else {
            info!(file = %path.display(), "skipping document missing dok_id or text/html");
            continue;
        };

        let document = Document {
            dataset_id: dataset.id,
            external_id: dok_id,
            text,
            html,
        };

        // A store error aborts only this document (§7): log it and move on
        // to the next file rather than propagating out of the whole dataset.
        if let Err(err) =
            process_document(store, nlp, language_identifier, html_to_text, settings, &document)
                .await
        {
            error!(file = %path.display(), error = %err, "document aborted");
            continue;
        }
        processed += 1;
    }

    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fields_from_well_formed_document() {
        let value: Value = serde_json::from_str(
            r#"{"dokumentstatus": {"dokument": {"dok_id": "D1", "text": "Hej."}}}"#,
        )
        .unwrap();
        let (id, text, html) = extract_document_fields(&value).unwrap();
        assert_eq!(id, "D1");
        assert_eq!(text, "Hej.");
        assert_eq!(html, "");
    }

    #[test]
    fn rejects_document_missing_required_path() {
        let value: Value = serde_json::from_str(r#"{"something_else": true}"#).unwrap();
        assert!(extract_document_fields(&value).is_none());
    }

    #[test]
    fn rejects_document_with_neither_text_nor_html() {
        let value: Value =
            serde_json::from_str(r#"{"dokumentstatus": {"dokument": {"dok_id": "D1"}}}"#).unwrap();
        assert!(extract_document_fields(&value).is_none());
    }
}
