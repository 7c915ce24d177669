//! Declarative reference-data configuration: languages, lexical categories,
//! entity-type labels, and datasets (§6). Each is a small YAML document
//! loaded once at startup by the reference loader.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CorpusError, Result};

/// `languages.yml`: `environment -> { iso_code -> { language_name_en, language_qid } }`.
/// Only the `development` environment is read today; the shape is kept so a
/// deployment can carry a `production` block without a schema change.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguagesConfig {
    #[serde(flatten)]
    pub environments: HashMap<String, HashMap<String, LanguageEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageEntry {
    pub language_name_en: String,
    pub language_qid: String,
}

impl LanguagesConfig {
    pub fn load(path: &Path) -> Result<Self> {
        load_yaml(path)
    }

    /// Flattened `(iso_code, entry)` pairs across every configured environment.
    pub fn entries(&self, environment: &str) -> Result<&HashMap<String, LanguageEntry>> {
        self.environments.get(environment).ok_or_else(|| {
            CorpusError::fatal_config(format!(
                "languages config has no '{environment}' environment"
            ))
        })
    }
}

/// `lexical_categories.yml`: `POS_TAG -> integer QID`.
#[derive(Debug, Clone, Deserialize)]
pub struct LexicalCategoriesConfig {
    #[serde(flatten)]
    pub categories: HashMap<String, u32>,
}

impl LexicalCategoriesConfig {
    pub fn load(path: &Path) -> Result<Self> {
        load_yaml(path)
    }
}

/// `entity_types.yml`: `label -> description`.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityTypesConfig {
    #[serde(flatten)]
    pub labels: HashMap<String, String>,
}

impl EntityTypesConfig {
    pub fn load(path: &Path) -> Result<Self> {
        load_yaml(path)
    }
}

/// `datasets.yml`: `title -> { qid, workdirectory, collection? }`.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetsConfig {
    #[serde(flatten)]
    pub datasets: HashMap<String, DatasetEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetEntry {
    pub qid: String,
    pub workdirectory: String,
    #[serde(default)]
    pub collection: Option<String>,
}

impl DatasetsConfig {
    pub fn load(path: &Path) -> Result<Self> {
        load_yaml(path)
    }
}

fn load_yaml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        CorpusError::fatal_config(format!("failed to read config {}: {e}", path.display()))
    })?;
    serde_yaml::from_str(&raw).map_err(|e| {
        CorpusError::fatal_config(format!("failed to parse config {}: {e}", path.display()))
    })
}

/// Bundle of the four config files, loaded from a single directory.
pub struct ReferenceConfig {
    pub languages: LanguagesConfig,
    pub lexical_categories: LexicalCategoriesConfig,
    pub entity_types: EntityTypesConfig,
    pub datasets: DatasetsConfig,
}

impl ReferenceConfig {
    pub fn load_dir(dir: &Path) -> Result<Self> {
        Ok(Self {
            languages: LanguagesConfig::load(&dir.join("languages.yml"))?,
            lexical_categories: LexicalCategoriesConfig::load(
                &dir.join("lexical_categories.yml"),
            )?,
            entity_types: EntityTypesConfig::load(&dir.join("entity_types.yml"))?,
            datasets: DatasetsConfig::load(&dir.join("datasets.yml"))?,
        })
    }
}

/// Tunables that gate sentence acceptance (§4.4). Not config-file backed —
/// these are CLI flags on the `ingest` binary, since they change the
/// behaviour of a single run rather than describing reference data.
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub accepted_languages: Vec<String>,
    pub min_confidence: f64,
    pub chunk_size: usize,
    pub max_documents_per_dataset: usize,
    pub max_datasets: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            accepted_languages: vec!["sv", "en", "nb", "de", "fr"]
                .into_iter()
                .map(String::from)
                .collect(),
            min_confidence: 0.4,
            chunk_size: 100_000,
            max_documents_per_dataset: 0,
            max_datasets: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_languages_config() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            "development:\n  sv:\n    language_name_en: Swedish\n    language_qid: Q9027\n"
        )
        .unwrap();
        let cfg = LanguagesConfig::load(f.path()).unwrap();
        let entries = cfg.entries("development").unwrap();
        assert_eq!(entries["sv"].language_name_en, "Swedish");
    }

    #[test]
    fn missing_environment_is_fatal_config() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "production:\n  sv:\n    language_name_en: Swedish\n    language_qid: Q9027\n").unwrap();
        let cfg = LanguagesConfig::load(f.path()).unwrap();
        let err = cfg.entries("development").unwrap_err();
        assert!(matches!(err, CorpusError::FatalConfig(_)));
    }

    #[test]
    fn default_ingest_settings_match_spec_languages() {
        let settings = IngestSettings::default();
        assert!(settings.accepted_languages.contains(&"sv".to_string()));
        assert_eq!(settings.min_confidence, 0.4);
        assert_eq!(settings.chunk_size, 100_000);
    }
}
