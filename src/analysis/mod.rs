pub mod sentence_analyser;
pub mod token_analyser;
