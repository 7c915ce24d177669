//! Relational persistence layer (§4.1). `Store` is a thin newtype over a
//! `PgPool`; every method is a single runtime-checked statement (no
//! `sqlx::query!`/`query_as!`, so the crate builds without a live
//! `DATABASE_URL`) and every insert is `ON CONFLICT ... DO UPDATE SET <key
//! column> = EXCLUDED.<key column> RETURNING *`, which both no-ops on a
//! duplicate natural key and still yields the row via `RETURNING`.

mod query;
mod schema;
mod sentences;

pub use query::{SearchPage, SentenceHit};
pub use sentences::SentenceCommit;

use sqlx::PgPool;

use crate::error::Result;
use crate::model::{Dataset, DocumentRow, EntityTypeLabel, Language, LexicalCategory, Score};

#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates every table and index if missing. Idempotent; call on every
    /// startup (§4.7).
    pub async fn init(&self) -> Result<()> {
        schema::create_schema(&self.pool).await
    }

    // ---- reference tables (§4.2) ----

    pub async fn upsert_language(
        &self,
        name_en: &str,
        iso_code: &str,
        qid: i64,
    ) -> Result<Language> {
        let row = sqlx::query_as::<_, Language>(
            r#"
            INSERT INTO language (name_en, iso_code, qid)
            VALUES ($1, $2, $3)
            ON CONFLICT (iso_code) DO UPDATE SET iso_code = EXCLUDED.iso_code
            RETURNING id, name_en, iso_code, qid
            "#,
        )
        .bind(name_en)
        .bind(iso_code)
        .bind(qid)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_language_by_iso(&self, iso_code: &str) -> Result<Option<Language>> {
        let row = sqlx::query_as::<_, Language>(
            "SELECT id, name_en, iso_code, qid FROM language WHERE iso_code = $1",
        )
        .bind(iso_code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn upsert_lexical_category(&self, postag: &str, qid: i64) -> Result<LexicalCategory> {
        let row = sqlx::query_as::<_, LexicalCategory>(
            r#"
            INSERT INTO lexical_category (postag, qid)
            VALUES ($1, $2)
            ON CONFLICT (postag) DO UPDATE SET postag = EXCLUDED.postag
            RETURNING id, postag, qid
            "#,
        )
        .bind(postag)
        .bind(qid)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_lexical_category_by_postag(
        &self,
        postag: &str,
    ) -> Result<Option<LexicalCategory>> {
        let row = sqlx::query_as::<_, LexicalCategory>(
            "SELECT id, postag, qid FROM lexical_category WHERE postag = $1",
        )
        .bind(postag)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_lexical_category_by_qid(&self, qid: i64) -> Result<Option<LexicalCategory>> {
        let row = sqlx::query_as::<_, LexicalCategory>(
            "SELECT id, postag, qid FROM lexical_category WHERE qid = $1",
        )
        .bind(qid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn upsert_entity_type_label(
        &self,
        label: &str,
        description: &str,
    ) -> Result<EntityTypeLabel> {
        let row = sqlx::query_as::<_, EntityTypeLabel>(
            r#"
            INSERT INTO entity_type_label (label, description)
            VALUES ($1, $2)
            ON CONFLICT (label) DO UPDATE SET label = EXCLUDED.label
            RETURNING id, label, description
            "#,
        )
        .bind(label)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_entity_type_label_by_label(
        &self,
        label: &str,
    ) -> Result<Option<EntityTypeLabel>> {
        let row = sqlx::query_as::<_, EntityTypeLabel>(
            "SELECT id, label, description FROM entity_type_label WHERE label = $1",
        )
        .bind(label)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn upsert_dataset(
        &self,
        title: &str,
        qid: i64,
        workdirectory: &str,
        collection: Option<&str>,
    ) -> Result<Dataset> {
        let row = sqlx::query_as::<_, Dataset>(
            r#"
            INSERT INTO dataset (title, qid, workdirectory, collection)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (qid) DO UPDATE SET qid = EXCLUDED.qid
            RETURNING id, title, qid, workdirectory, collection
            "#,
        )
        .bind(title)
        .bind(qid)
        .bind(workdirectory)
        .bind(collection)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_datasets(&self) -> Result<Vec<Dataset>> {
        let rows = sqlx::query_as::<_, Dataset>(
            "SELECT id, title, qid, workdirectory, collection FROM dataset ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ---- documents (§4.6) ----

    pub async fn get_document(
        &self,
        dataset_id: i64,
        external_id: &str,
    ) -> Result<Option<DocumentRow>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, dataset_id, external_id, processed FROM document \
             WHERE dataset_id = $1 AND external_id = $2",
        )
        .bind(dataset_id)
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert_document(
        &self,
        dataset_id: i64,
        external_id: &str,
    ) -> Result<DocumentRow> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO document (dataset_id, external_id, processed)
            VALUES ($1, $2, FALSE)
            ON CONFLICT (dataset_id, external_id) DO UPDATE SET dataset_id = EXCLUDED.dataset_id
            RETURNING id, dataset_id, external_id, processed
            "#,
        )
        .bind(dataset_id)
        .bind(external_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn mark_document_processed(&self, document_id: i64) -> Result<()> {
        sqlx::query("UPDATE document SET processed = TRUE WHERE id = $1")
            .bind(document_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ---- score (§3, "Score") ----

    /// Interns a confidence value, already rounded to two decimals by the
    /// caller (the sentence analyser owns the rounding, §4.4).
    pub async fn intern_score(&self, value: f64) -> Result<Score> {
        let row = sqlx::query_as::<_, Score>(
            r#"
            INSERT INTO score (value)
            VALUES ($1)
            ON CONFLICT (value) DO UPDATE SET value = EXCLUDED.value
            RETURNING id, value
            "#,
        )
        .bind(value)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
