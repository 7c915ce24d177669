//! Request/response envelope for `POST /lookup` (§4.8). The response
//! deliberately allows `data` and `errors` to coexist, and echoes the
//! request fields back so a client can iteratively correct them — the
//! "evolvable JSON API" contract named in the design notes.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::model::SentenceResult;

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupRequest {
    pub token: Option<String>,
    pub lexical_category_qid: Option<String>,
    pub iso_language_code: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LookupResponse {
    pub data: Vec<SentenceResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub token: Option<String>,
    pub lexical_category_qid: Option<String>,
    pub iso_language_code: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl LookupResponse {
    pub fn echo(request: &LookupRequest, data: Vec<SentenceResult>, errors: Vec<ClientError>) -> Self {
        Self {
            data,
            errors: errors.iter().map(ToString::to_string).collect(),
            token: request.token.clone(),
            lexical_category_qid: request.lexical_category_qid.clone(),
            iso_language_code: request.iso_language_code.clone(),
            limit: request.limit,
            offset: request.offset,
        }
    }
}

/// `true` iff the token contains at least one whitespace character,
/// routing the lookup to the phrase branch (§4.8, glossary "Compound token").
pub fn is_phrase(token: &str) -> bool {
    token.chars().any(char::is_whitespace)
}
