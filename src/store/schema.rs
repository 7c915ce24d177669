//! Schema and index creation (§4.1). Every statement is `IF NOT EXISTS`, so
//! running this against an already-initialised store is a no-op — the
//! orchestrator calls it unconditionally on every startup.

use sqlx::PgPool;

use crate::error::Result;

const CREATE_TABLES: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS language (
        id BIGSERIAL PRIMARY KEY,
        name_en TEXT NOT NULL,
        iso_code TEXT NOT NULL UNIQUE,
        qid BIGINT NOT NULL UNIQUE
    )"#,
    r#"CREATE TABLE IF NOT EXISTS lexical_category (
        id BIGSERIAL PRIMARY KEY,
        postag TEXT NOT NULL UNIQUE,
        qid BIGINT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS entity_type_label (
        id BIGSERIAL PRIMARY KEY,
        label TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS dataset (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        qid BIGINT NOT NULL UNIQUE,
        workdirectory TEXT NOT NULL,
        collection TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS document (
        id BIGSERIAL PRIMARY KEY,
        dataset_id BIGINT NOT NULL REFERENCES dataset(id),
        external_id TEXT NOT NULL,
        processed BOOLEAN NOT NULL DEFAULT FALSE,
        UNIQUE (dataset_id, external_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS score (
        id BIGSERIAL PRIMARY KEY,
        value DOUBLE PRECISION NOT NULL UNIQUE
    )"#,
    r#"CREATE TABLE IF NOT EXISTS sentence (
        id BIGSERIAL PRIMARY KEY,
        text TEXT NOT NULL,
        uuid UUID NOT NULL UNIQUE,
        document_id BIGINT NOT NULL REFERENCES document(id),
        language_id BIGINT NOT NULL REFERENCES language(id),
        score_id BIGINT NOT NULL REFERENCES score(id),
        UNIQUE (text, document_id, language_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS raw_token (
        id BIGSERIAL PRIMARY KEY,
        text TEXT NOT NULL,
        lexical_category_id BIGINT NOT NULL REFERENCES lexical_category(id),
        language_id BIGINT NOT NULL REFERENCES language(id),
        score_id BIGINT NOT NULL REFERENCES score(id),
        UNIQUE (text, lexical_category_id, language_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS norm_token (
        id BIGSERIAL PRIMARY KEY,
        text TEXT NOT NULL UNIQUE
    )"#,
    r#"CREATE TABLE IF NOT EXISTS entity (
        id BIGSERIAL PRIMARY KEY,
        label TEXT NOT NULL,
        entity_type_label_id BIGINT NOT NULL REFERENCES entity_type_label(id),
        UNIQUE (label, entity_type_label_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS raw_token_sentence (
        raw_token_id BIGINT NOT NULL REFERENCES raw_token(id),
        sentence_id BIGINT NOT NULL REFERENCES sentence(id),
        PRIMARY KEY (raw_token_id, sentence_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS raw_token_norm_token (
        raw_token_id BIGINT NOT NULL REFERENCES raw_token(id),
        norm_token_id BIGINT NOT NULL REFERENCES norm_token(id),
        PRIMARY KEY (raw_token_id, norm_token_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS sentence_entity (
        sentence_id BIGINT NOT NULL REFERENCES sentence(id),
        entity_id BIGINT NOT NULL REFERENCES entity(id),
        PRIMARY KEY (sentence_id, entity_id)
    )"#,
];

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_score_value ON score (value)",
    "CREATE INDEX IF NOT EXISTS idx_language_iso_code ON language (iso_code)",
    "CREATE INDEX IF NOT EXISTS idx_lexical_category_postag ON lexical_category (postag)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_sentence_uuid ON sentence (uuid)",
    "CREATE INDEX IF NOT EXISTS idx_sentence_document ON sentence (document_id)",
    "CREATE INDEX IF NOT EXISTS idx_raw_token_text ON raw_token (text)",
    "CREATE INDEX IF NOT EXISTS idx_norm_token_text ON norm_token (text)",
];

/// Creates every table and index if it doesn't already exist. Safe to call
/// on every process startup.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    for statement in CREATE_TABLES {
        sqlx::query(statement).execute(pool).await?;
    }
    for statement in CREATE_INDEXES {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
