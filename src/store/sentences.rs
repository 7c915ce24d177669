//! RawToken, NormToken, Sentence, and Entity primitives, plus the
//! transactional commit of a single accepted sentence (§4.4, "Commit
//! order").

use sqlx::Postgres;
use uuid::Uuid;

use super::Store;
use crate::error::Result;
use crate::model::{EntityRow, NormTokenRow, RawTokenRow, SentenceRow};

/// A fully prepared sentence ready for the single-transaction commit: the
/// sentence itself, the ids of its accepted raw tokens, and the ids of the
/// entities whose span fell within it.
pub struct SentenceCommit {
    pub text: String,
    pub uuid: Uuid,
    pub document_id: i64,
    pub language_id: i64,
    pub score_id: i64,
    pub accepted_raw_token_ids: Vec<i64>,
    pub entity_ids: Vec<i64>,
}

impl Store {
    // ---- raw token (§4.3) ----

    pub async fn get_raw_token(
        &self,
        text: &str,
        lexical_category_id: i64,
        language_id: i64,
    ) -> Result<Option<RawTokenRow>> {
        let row = sqlx::query_as::<_, RawTokenRow>(
            "SELECT id, text, lexical_category_id, language_id, score_id FROM raw_token \
             WHERE text = $1 AND lexical_category_id = $2 AND language_id = $3",
        )
        .bind(text)
        .bind(lexical_category_id)
        .bind(language_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Inserts a raw token if its natural key is new, otherwise returns the
    /// existing row untouched — this is where the score-inheritance
    /// imprecision noted in the design notes originates: whichever call
    /// wins the race keeps its `score_id` forever.
    pub async fn insert_raw_token(
        &self,
        text: &str,
        lexical_category_id: i64,
        language_id: i64,
        score_id: i64,
    ) -> Result<RawTokenRow> {
        let row = sqlx::query_as::<_, RawTokenRow>(
            r#"
            INSERT INTO raw_token (text, lexical_category_id, language_id, score_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (text, lexical_category_id, language_id)
                DO UPDATE SET text = EXCLUDED.text
            RETURNING id, text, lexical_category_id, language_id, score_id
            "#,
        )
        .bind(text)
        .bind(lexical_category_id)
        .bind(language_id)
        .bind(score_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    // ---- norm token (§4.3) ----

    pub async fn get_norm_token(&self, text: &str) -> Result<Option<NormTokenRow>> {
        let row = sqlx::query_as::<_, NormTokenRow>(
            "SELECT id, text FROM norm_token WHERE text = $1",
        )
        .bind(text)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert_norm_token(&self, text: &str) -> Result<NormTokenRow> {
        let row = sqlx::query_as::<_, NormTokenRow>(
            r#"
            INSERT INTO norm_token (text)
            VALUES ($1)
            ON CONFLICT (text) DO UPDATE SET text = EXCLUDED.text
            RETURNING id, text
            "#,
        )
        .bind(text)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn link_raw_norm_token(&self, raw_token_id: i64, norm_token_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO raw_token_norm_token (raw_token_id, norm_token_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(raw_token_id)
        .bind(norm_token_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ---- entity (§4.4, "Entity extraction") ----

    pub async fn get_entity(
        &self,
        label: &str,
        entity_type_label_id: i64,
    ) -> Result<Option<EntityRow>> {
        let row = sqlx::query_as::<_, EntityRow>(
            "SELECT id, label, entity_type_label_id FROM entity \
             WHERE label = $1 AND entity_type_label_id = $2",
        )
        .bind(label)
        .bind(entity_type_label_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert_entity(&self, label: &str, entity_type_label_id: i64) -> Result<EntityRow> {
        let row = sqlx::query_as::<_, EntityRow>(
            r#"
            INSERT INTO entity (label, entity_type_label_id)
            VALUES ($1, $2)
            ON CONFLICT (label, entity_type_label_id) DO UPDATE SET label = EXCLUDED.label
            RETURNING id, label, entity_type_label_id
            "#,
        )
        .bind(label)
        .bind(entity_type_label_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    // ---- sentence (§4.4) ----

    pub async fn get_sentence_by_natural_key(
        &self,
        text: &str,
        document_id: i64,
        language_id: i64,
    ) -> Result<Option<SentenceRow>> {
        let row = sqlx::query_as::<_, SentenceRow>(
            "SELECT id, text, uuid, document_id, language_id, score_id FROM sentence \
             WHERE text = $1 AND document_id = $2 AND language_id = $3",
        )
        .bind(text)
        .bind(document_id)
        .bind(language_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Commits an accepted, new sentence in a single transaction: the
    /// sentence row, its RawToken links, and its Entity links (§4.4,
    /// "Commit order"). Returns the committed row, including on the rare
    /// race where another writer inserted the same natural key first.
    pub async fn commit_sentence(&self, commit: SentenceCommit) -> Result<SentenceRow> {
        let mut tx: sqlx::Transaction<'_, Postgres> = self.pool.begin().await?;

        let sentence = sqlx::query_as::<_, SentenceRow>(
            r#"
            INSERT INTO sentence (text, uuid, document_id, language_id, score_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (text, document_id, language_id) DO UPDATE SET text = EXCLUDED.text
            RETURNING id, text, uuid, document_id, language_id, score_id
            "#,
        )
        .bind(&commit.text)
        .bind(commit.uuid)
        .bind(commit.document_id)
        .bind(commit.language_id)
        .bind(commit.score_id)
        .fetch_one(&mut *tx)
        .await?;

        for raw_token_id in &commit.accepted_raw_token_ids {
            sqlx::query(
                "INSERT INTO raw_token_sentence (raw_token_id, sentence_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(raw_token_id)
            .bind(sentence.id)
            .execute(&mut *tx)
            .await?;
        }

        for entity_id in &commit.entity_ids {
            sqlx::query(
                "INSERT INTO sentence_entity (sentence_id, entity_id) \
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(sentence.id)
            .bind(entity_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(sentence)
    }
}
