pub mod dataset_walker;
pub mod document_processor;
