//! Consumes one segmented sentence: cleans it, identifies its language,
//! applies the suitability/acceptance gates, drives the token analyser over
//! its tokens, extracts its entities, and performs the transactional commit
//! (§4.4).

use std::collections::HashSet;

use uuid::Uuid;

use super::token_analyser;
use crate::config::IngestSettings;
use crate::error::{CorpusError, Result};
use crate::nlp::{LanguageIdentifier, NamedEntityMention, SegmentedSentence};
use crate::store::{SentenceCommit, Store};

const CLEAN_REMOVE_CHARS: &[char] = &[':', '(', ')', '-', '–', '/'];

/// Tab-to-space, targeted character removal, general punctuation strip,
/// digit-bearing word removal, whitespace collapse. Used only for language
/// identification and word counting, never for storage.
pub fn clean_sentence(text: &str) -> String {
    let despaced = text.replace("â€“", " ").replace('\t', " ");
    let without_marked: String = despaced
        .chars()
        .filter(|c| !CLEAN_REMOVE_CHARS.contains(c))
        .collect();
    let without_punctuation: String = without_marked
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    without_punctuation
        .split_whitespace()
        .filter(|word| !word.chars().any(|c| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn word_count(cleaned: &str) -> usize {
    cleaned.split_whitespace().count()
}

/// §4.4's "suitable" predicate: strictly more than five words.
pub fn is_suitable(cleaned: &str) -> bool {
    word_count(cleaned) > 5
}

/// Outcome of analysing one sentence. `committed` is false both when the
/// sentence fails the acceptance gate and when it already existed (the
/// idempotent skip case) — callers only need to know whether a new or
/// existing sentence row is now guaranteed to exist.
#[derive(Debug, Clone)]
pub struct SentenceOutcome {
    pub committed: bool,
    pub sentence_uuid: Option<Uuid>,
}

/// Analyses one segmented sentence against the document's full set of named
/// entity mentions. `language_identifier` is a process-wide capability; the
/// caller is responsible for constructing it once (§5).
pub async fn analyze_sentence(
    store: &Store,
    segment: &SegmentedSentence,
    document_entities: &[NamedEntityMention],
    document_id: i64,
    settings: &IngestSettings,
    language_identifier: &dyn LanguageIdentifier,
) -> Result<SentenceOutcome> {
    let cleaned = clean_sentence(&segment.text);
    let word_count = word_count(&cleaned);

    // One-word (or empty) sentences never reach token insertion (§4.4).
    if cleaned.is_empty() || word_count < 2 {
        return Ok(SentenceOutcome {
            committed: false,
            sentence_uuid: None,
        });
    }

    let (detected_language, confidence) = language_identifier.identify(&cleaned);
    let rounded_confidence = (confidence * 100.0).round() / 100.0;

    let language = store
        .get_language_by_iso(&detected_language)
        .await?
        .ok_or_else(|| {
            CorpusError::missing_reference(format!(
                "unknown language code '{detected_language}'"
            ))
        })?;

    let score = store.intern_score(rounded_confidence).await?;

    let language_accepted = settings
        .accepted_languages
        .iter()
        .any(|l| l == &detected_language);

    // Tokens are analysed for any sentence with at least two cleaned words,
    // but the token acceptance predicate itself still requires the
    // sentence's detected language to be in the accepted set (§4.3), so a
    // rejected-language sentence links no raw/norm tokens.
    let mut accepted_raw_token_ids = Vec::new();
    for token in &segment.tokens {
        if let Some(raw_token_id) =
            token_analyser::analyze_token(store, token, language.id, score.id, language_accepted)
                .await?
        {
            accepted_raw_token_ids.push(raw_token_id);
        }
    }

    let suitable = is_suitable(&cleaned);
    let passes_gate =
        suitable && language_accepted && rounded_confidence >= settings.min_confidence;

    if !passes_gate {
        return Ok(SentenceOutcome {
            committed: false,
            sentence_uuid: None,
        });
    }

    if let Some(existing) = store
        .get_sentence_by_natural_key(&segment.text, document_id, language.id)
        .await?
    {
        return Ok(SentenceOutcome {
            committed: true,
            sentence_uuid: Some(existing.uuid),
        });
    }

    let entity_ids = extract_entity_ids(store, segment, document_entities).await?;

    let uuid = Uuid::new_v4();
    let commit = SentenceCommit {
        text: segment.text.clone(),
        uuid,
        document_id,
        language_id: language.id,
        score_id: score.id,
        accepted_raw_token_ids,
        entity_ids,
    };
    let sentence = store.commit_sentence(commit).await?;

    Ok(SentenceOutcome {
        committed: true,
        sentence_uuid: Some(sentence.uuid),
    })
}

/// Selects every entity mention whose span lies entirely within the
/// sentence's span, deduplicates on `(surface, entity-type label)`, and
/// upserts each into the Entity table.
async fn extract_entity_ids(
    store: &Store,
    segment: &SegmentedSentence,
    document_entities: &[NamedEntityMention],
) -> Result<Vec<i64>> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut entity_ids = Vec::new();

    for mention in document_entities {
        if mention.span.start < segment.span.start || mention.span.end > segment.span.end {
            continue;
        }
        let key = (mention.surface.clone(), mention.type_label.clone());
        if !seen.insert(key) {
            continue;
        }
        let entity_type = store
            .get_entity_type_label_by_label(&mention.type_label)
            .await?
            .ok_or_else(|| {
                CorpusError::missing_reference(format!(
                    "unknown entity type label '{}'",
                    mention.type_label
                ))
            })?;
        let entity = store.insert_entity(&mention.surface, entity_type.id).await?;
        entity_ids.push(entity.id);
    }

    Ok(entity_ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_tabs_marked_chars_and_punctuation() {
        let cleaned = clean_sentence("Riksdagen\tbeslutade (den 5:e) att anta lag-förslaget.");
        assert!(!cleaned.contains('\t'));
        assert!(!cleaned.contains('('));
        assert!(!cleaned.contains(')'));
        assert!(!cleaned.contains(':'));
        assert!(!cleaned.contains('.'));
    }

    #[test]
    fn drops_words_containing_digits() {
        let cleaned = clean_sentence("Artikel 5a handlar om saken idag");
        assert!(!cleaned.split_whitespace().any(|w| w.contains("5a")));
    }

    #[test]
    fn collapses_whitespace() {
        let cleaned = clean_sentence("Ett   stort    hus");
        assert_eq!(cleaned, "Ett stort hus");
    }

    #[test]
    fn suitability_requires_more_than_five_words() {
        assert!(!is_suitable("ett två tre fyra fem"));
        assert!(is_suitable("ett två tre fyra fem sex"));
    }
}
