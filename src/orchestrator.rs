//! Top-level driver (§4.7): initialises the store, loads reference data,
//! then iterates datasets honouring the per-dataset and per-dataset-count
//! caps from the CLI.

use tracing::{error, info};

use crate::config::{IngestSettings, ReferenceConfig};
use crate::error::Result;
use crate::nlp::{HtmlToText, LanguageIdentifier, NlpCollaborator};
use crate::reference_loader;
use crate::store::Store;

pub struct OrchestratorCaps {
    /// 0 means unlimited.
    pub max_documents_per_dataset: usize,
    /// 0 means unlimited.
    pub max_datasets: usize,
}

/// Runs the full ingest: schema, references, then every configured dataset
/// in config order, each capped independently. A per-document store error
/// aborts only that document (§7); the dataset walker catches it, logs it,
/// and continues to the next file, so this function only fails on
/// startup/config errors.
pub async fn run(
    store: &Store,
    reference_config: &ReferenceConfig,
    environment: &str,
    settings: &IngestSettings,
    caps: &OrchestratorCaps,
    nlp: &dyn NlpCollaborator,
    language_identifier: &dyn LanguageIdentifier,
    html_to_text: &dyn HtmlToText,
) -> Result<()> {
    store.init().await?;
    reference_loader::load_references(store, reference_config, environment).await?;

    let datasets = store.list_datasets().await?;
    let dataset_count = if caps.max_datasets == 0 {
        datasets.len()
    } else {
        caps.max_datasets.min(datasets.len())
    };

    for dataset in datasets.iter().take(dataset_count) {
        info!(dataset = %dataset.title, "starting dataset");
        match crate::pipeline::dataset_walker::walk_dataset(
            store,
            nlp,
            language_identifier,
            html_to_text,
            settings,
            dataset,
            caps.max_documents_per_dataset,
        )
        .await
        {
            Ok(processed) => {
                info!(dataset = %dataset.title, documents = processed, "dataset complete");
            }
            Err(err) => {
                error!(dataset = %dataset.title, error = %err, "dataset aborted");
            }
        }
    }

    Ok(())
}
