//! Maps one segmented token to its persisted form (§4.3).

use unicode_normalization::UnicodeNormalization;

use crate::error::{CorpusError, Result};
use crate::nlp::SegmentedToken;
use crate::store::Store;

const EXCLUDED_POS: &[&str] = &["SPACE", "PUNCT", "SYM", "X"];
const STRIP_CHARS: &[char] = &[':', ',', '.', '(', ')', '-', '–', '/', '\r'];
const REJECT_CHARS: &[char] = &['¶', '¤', '¥', '~', '$', '€', '|'];

fn strip_for_emptiness_check(surface: &str) -> String {
    surface
        .chars()
        .filter(|c| !STRIP_CHARS.contains(c) && !c.is_ascii_digit())
        .collect()
}

fn has_digit(surface: &str) -> bool {
    surface.chars().any(|c| c.is_ascii_digit())
}

fn has_reject_char(surface: &str) -> bool {
    surface.chars().any(|c| REJECT_CHARS.contains(&c))
}

/// Implements the acceptance predicate of §4.3, including its fifth clause
/// ("sentence's detected language is in the accepted-language set") — see
/// `examples/original_source/models/token.py`'s `is_accepted_token`, which
/// ANDs `self.sentence.detected_language in config.accepted_languages` into
/// the same predicate.
pub fn is_accepted(pos_tag: &str, surface: &str, language_accepted: bool) -> bool {
    if !language_accepted {
        return false;
    }
    if EXCLUDED_POS.contains(&pos_tag) {
        return false;
    }
    if strip_for_emptiness_check(surface).is_empty() {
        return false;
    }
    if has_digit(surface) {
        return false;
    }
    if has_reject_char(surface) {
        return false;
    }
    true
}

/// Ensures a RawToken row, a NormToken row, and their link exist for an
/// accepted token, returning the raw token's id. Returns `None` for a
/// rejected token without touching the store. `language_accepted` reflects
/// whether the containing sentence's detected language is in the
/// configured accepted-language set (§4.4).
pub async fn analyze_token(
    store: &Store,
    token: &SegmentedToken,
    language_id: i64,
    score_id: i64,
    language_accepted: bool,
) -> Result<Option<i64>> {
    if !is_accepted(&token.pos_tag, &token.text, language_accepted) {
        return Ok(None);
    }

    let lexical_category = store
        .get_lexical_category_by_postag(&token.pos_tag)
        .await?
        .ok_or_else(|| {
            CorpusError::missing_reference(format!("unknown POS tag '{}'", token.pos_tag))
        })?;

    let raw_token = store
        .insert_raw_token(&token.text, lexical_category.id, language_id, score_id)
        .await?;

    // NFC-normalise before lower-casing: text lifted from PDFs/HTML can carry
    // combining-diacritic forms (e.g. "a" + combining ring) that would
    // otherwise norm-token separately from their precomposed equivalent.
    let norm_text: String = token.text.trim().nfc().collect::<String>().to_lowercase();
    let norm_token = store.insert_norm_token(&norm_text).await?;
    store
        .link_raw_norm_token(raw_token.id, norm_token.id)
        .await?;

    Ok(Some(raw_token.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_excluded_pos_tags() {
        assert!(!is_accepted("PUNCT", ".", true));
        assert!(!is_accepted("SPACE", " ", true));
    }

    #[test]
    fn rejects_tokens_reduced_to_empty_by_stripping() {
        assert!(!is_accepted("NOUN", "12-34", true));
        assert!(!is_accepted("NOUN", "...", true));
    }

    #[test]
    fn rejects_tokens_with_digits() {
        assert!(!is_accepted("NOUN", "covid19", true));
    }

    #[test]
    fn rejects_tokens_with_reject_set_characters() {
        assert!(!is_accepted("NOUN", "100€", true));
        assert!(!is_accepted("NOUN", "a¶b", true));
    }

    #[test]
    fn accepts_a_plain_word() {
        assert!(is_accepted("NOUN", "kontinent", true));
        assert!(is_accepted("PROPN", "Europa", true));
    }

    #[test]
    fn rejects_an_otherwise_valid_token_when_sentence_language_is_not_accepted() {
        assert!(!is_accepted("NOUN", "kontinent", false));
        assert!(!is_accepted("PROPN", "Europa", false));
    }
}
