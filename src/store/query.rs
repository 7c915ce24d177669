//! The two read-only queries behind `POST /lookup` (§4.8).

use uuid::Uuid;

use super::Store;
use crate::error::Result;

/// One sentence as returned to an HTTP caller, plus the total count of the
/// whole matching set (not just this page).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub items: Vec<SentenceHit>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SentenceHit {
    pub uuid: Uuid,
    pub text: String,
    pub score: f64,
}

/// Escapes `%` and `_` so a phrase search can't smuggle SQL LIKE wildcards.
fn escape_like(input: &str) -> String {
    input.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

impl Store {
    /// Phrase branch: case-insensitive substring match, ascending text
    /// length, paginated (§4.8).
    pub async fn search_phrase(
        &self,
        phrase: &str,
        language_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<SearchPage> {
        let pattern = format!("%{}%", escape_like(phrase));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM sentence
            WHERE language_id = $1 AND text ILIKE $2 ESCAPE '\'
            "#,
        )
        .bind(language_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, SentenceHit>(
            r#"
            SELECT sentence.uuid AS uuid, sentence.text AS text, score.value AS score
            FROM sentence
            JOIN score ON score.id = sentence.score_id
            WHERE sentence.language_id = $1 AND sentence.text ILIKE $2 ESCAPE '\'
            ORDER BY length(sentence.text) ASC, sentence.id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(language_id)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(SearchPage { items, total })
    }

    /// Simple branch: sentences linked to a specific raw token, ascending
    /// text length, paginated (§4.8).
    pub async fn search_by_raw_token(
        &self,
        raw_token_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<SearchPage> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM raw_token_sentence WHERE raw_token_id = $1
            "#,
        )
        .bind(raw_token_id)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, SentenceHit>(
            r#"
            SELECT sentence.uuid AS uuid, sentence.text AS text, score.value AS score
            FROM raw_token_sentence
            JOIN sentence ON sentence.id = raw_token_sentence.sentence_id
            JOIN score ON score.id = sentence.score_id
            WHERE raw_token_sentence.raw_token_id = $1
            ORDER BY length(sentence.text) ASC, sentence.id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(raw_token_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(SearchPage { items, total })
    }
}
