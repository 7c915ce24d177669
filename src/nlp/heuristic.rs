//! Reference-grade stand-ins for the NLP/language-ID/HTML-to-text
//! collaborators. These exist so the pipeline can run and be tested without
//! a real model attached — they are deliberately simple and make no claim
//! to linguistic accuracy.

use std::collections::HashMap;

use regex::Regex;

use super::{
    HtmlToText, LanguageIdentifier, NamedEntityMention, NlpChunkOutput, NlpCollaborator,
    SegmentedSentence, SegmentedToken,
};

/// Splits text into sentences on `.`, `!`, `?` followed by whitespace or
/// end-of-chunk, tokenizes on word/punctuation boundaries, and tags each
/// token with a small fixed heuristic (digits -> NUM, punctuation -> PUNCT,
/// everything else -> NOUN/PROPN/VERB by shape). Any Title-Case word is
/// additionally reported as a named-entity mention with type "MISC".
pub struct HeuristicNlp {
    word_re: Regex,
    sentence_boundary: Regex,
}

impl Default for HeuristicNlp {
    fn default() -> Self {
        Self {
            word_re: Regex::new(r"[\p{L}\p{N}]+|[^\s\p{L}\p{N}]").unwrap(),
            sentence_boundary: Regex::new(r"[.!?]+(\s+|$)").unwrap(),
        }
    }
}

impl HeuristicNlp {
    fn tag(token: &str) -> &'static str {
        if token.chars().all(|c| c.is_ascii_digit()) {
            "NUM"
        } else if token.chars().all(|c| !c.is_alphanumeric()) {
            "PUNCT"
        } else if token.chars().next().map(char::is_uppercase).unwrap_or(false) {
            "PROPN"
        } else if token.ends_with("ar") || token.ends_with("er") || token.ends_with("ing") {
            "VERB"
        } else {
            "NOUN"
        }
    }

    fn tokens_in(&self, text: &str, offset: usize) -> Vec<SegmentedToken> {
        self.word_re
            .find_iter(text)
            .map(|m| SegmentedToken {
                text: m.as_str().to_string(),
                pos_tag: Self::tag(m.as_str()).to_string(),
                span: (offset + m.start())..(offset + m.end()),
            })
            .collect()
    }

    fn is_title_case(word: &str) -> bool {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) if first.is_uppercase() => chars.all(|c| c.is_lowercase()),
            _ => false,
        }
    }
}

impl NlpCollaborator for HeuristicNlp {
    fn analyze_chunk(&self, chunk: &str) -> NlpChunkOutput {
        let mut sentences = Vec::new();
        let mut entities = Vec::new();
        let mut start = 0usize;

        let mut boundaries: Vec<usize> = self
            .sentence_boundary
            .find_iter(chunk)
            .map(|m| m.end())
            .collect();
        if boundaries.last().copied() != Some(chunk.len()) {
            boundaries.push(chunk.len());
        }

        for end in boundaries {
            if end <= start {
                continue;
            }
            let raw = &chunk[start..end];
            let trimmed_start = raw.len() - raw.trim_start().len();
            let trimmed_end = raw.trim_end().len();
            if trimmed_end <= trimmed_start {
                start = end;
                continue;
            }
            let span = (start + trimmed_start)..(start + trimmed_end);
            let text = chunk[span.clone()].to_string();
            let tokens = self.tokens_in(&text, span.start);
            for token in &tokens {
                if Self::is_title_case(&token.text) {
                    entities.push(NamedEntityMention {
                        surface: token.text.clone(),
                        type_label: "MISC".to_string(),
                        span: token.span.clone(),
                    });
                }
            }
            sentences.push(SegmentedSentence { text, span, tokens });
            start = end;
        }

        NlpChunkOutput { sentences, entities }
    }
}

/// Character-trigram frequency guesser seeded with a handful of function
/// words per accepted language. Confidence is the fraction of recognised
/// trigrams, capped at 0.99 so it never claims perfect certainty.
pub struct TrigramLanguageIdentifier {
    seeds: HashMap<&'static str, &'static [&'static str]>,
}

impl Default for TrigramLanguageIdentifier {
    fn default() -> Self {
        let mut seeds: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        seeds.insert("sv", &["och", "ett", "som", "att", "det", "är", "för"]);
        seeds.insert("en", &["the", "and", "that", "with", "for", "this", "from"]);
        seeds.insert("nb", &["og", "ikke", "det", "som", "for", "var"]);
        seeds.insert("de", &["und", "der", "die", "das", "nicht", "ist"]);
        seeds.insert("fr", &["les", "des", "une", "pour", "est", "dans"]);
        Self { seeds }
    }
}

impl LanguageIdentifier for TrigramLanguageIdentifier {
    fn identify(&self, cleaned_text: &str) -> (String, f64) {
        let lower = cleaned_text.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();
        if words.is_empty() {
            return ("und".to_string(), 0.0);
        }

        let mut best_lang = "und";
        let mut best_hits = 0usize;
        for (lang, seed_words) in &self.seeds {
            let hits = words.iter().filter(|w| seed_words.contains(w)).count();
            if hits > best_hits {
                best_hits = hits;
                best_lang = lang;
            }
        }

        let confidence = if best_hits == 0 {
            // No seed word matched at all: still return a guess rather than
            // "und", but with low confidence so the acceptance gate (§4.4,
            // min_confidence) is free to reject it.
            best_lang = "en";
            0.3
        } else {
            (best_hits as f64 / words.len() as f64 * 1.6).min(0.99)
        };

        (best_lang.to_string(), (confidence * 100.0).round() / 100.0)
    }
}

/// Strips tags, replacing them with a single space, and collapses runs of
/// whitespace — a deliberately crude stand-in for a real HTML-to-text
/// converter (§4.5: "extracting visible text with spaces as separators").
pub struct PlainTextHtmlToText {
    tag_re: Regex,
    whitespace_re: Regex,
}

impl Default for PlainTextHtmlToText {
    fn default() -> Self {
        Self {
            tag_re: Regex::new(r"<[^>]*>").unwrap(),
            whitespace_re: Regex::new(r"\s+").unwrap(),
        }
    }
}

impl HtmlToText for PlainTextHtmlToText {
    fn convert(&self, html: &str) -> String {
        let without_tags = self.tag_re.replace_all(html, " ");
        let decoded = without_tags
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&nbsp;", " ")
            .replace("&quot;", "\"");
        self.whitespace_re.replace_all(&decoded, " ").trim().to_string()
    }
}
