//! One-shot initialiser that upserts the static reference tables from
//! declarative configuration (§4.2). Idempotent: safe against an
//! already-populated store.

use crate::config::ReferenceConfig;
use crate::error::Result;
use crate::store::Store;

/// Strips a leading non-digit prefix (Wikidata QIDs look like `Q9027`) and
/// parses the remainder as an integer, per §4.1's "Reference-QID integers
/// are stored as unsigned integers derived by stripping the leading letter
/// prefix of the source QID string."
pub fn parse_qid(raw: &str) -> Result<i64> {
    let digits: String = raw.chars().skip_while(|c| !c.is_ascii_digit()).collect();
    digits.parse::<i64>().map_err(|_| {
        crate::error::CorpusError::fatal_config(format!("malformed reference QID: '{raw}'"))
    })
}

pub async fn load_references(store: &Store, config: &ReferenceConfig, environment: &str) -> Result<()> {
    let languages = config.languages.entries(environment)?;
    for (iso_code, entry) in languages {
        let qid = parse_qid(&entry.language_qid)?;
        store
            .upsert_language(&entry.language_name_en, iso_code, qid)
            .await?;
    }

    for (postag, qid) in &config.lexical_categories.categories {
        store.upsert_lexical_category(postag, *qid as i64).await?;
    }

    for (label, description) in &config.entity_types.labels {
        store.upsert_entity_type_label(label, description).await?;
    }

    for (title, entry) in &config.datasets.datasets {
        let qid = parse_qid(&entry.qid)?;
        store
            .upsert_dataset(title, qid, &entry.workdirectory, entry.collection.as_deref())
            .await?;
    }

    Ok(())
}
