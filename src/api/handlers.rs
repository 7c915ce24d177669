//! `POST /lookup` handler (§4.8) plus minimal liveness/OpenAPI endpoints.

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::ClientError;
use crate::model::SentenceResult;
use crate::reference_loader::parse_qid;
use crate::store::Store;

use super::envelope::{is_phrase, LookupRequest, LookupResponse};

const TOTAL_COUNT_HEADER: &str = "x-total-count";

pub async fn lookup(State(store): State<Store>, Json(request): Json<LookupRequest>) -> Response {
    let mut errors = Vec::new();

    let token = request.token.clone().unwrap_or_default();
    if token.trim().is_empty() {
        errors.push(ClientError::EmptyToken);
    }

    let language = match &request.iso_language_code {
        Some(code) => match store.get_language_by_iso(code).await {
            Ok(Some(language)) => Some(language),
            Ok(None) => {
                errors.push(ClientError::UnknownLanguage(code.clone()));
                None
            }
            Err(err) => {
                return server_error(err);
            }
        },
        None => {
            errors.push(ClientError::UnknownLanguage(String::new()));
            None
        }
    };

    let phrase_branch = !token.trim().is_empty() && is_phrase(&token);

    let lexical_category = if !phrase_branch && !token.trim().is_empty() {
        match &request.lexical_category_qid {
            Some(raw) => match parse_qid(raw).ok() {
                Some(qid) => match store.get_lexical_category_by_qid(qid).await {
                    Ok(Some(category)) => Some(category),
                    Ok(None) => {
                        errors.push(ClientError::UnknownLexicalCategory(raw.clone()));
                        None
                    }
                    Err(err) => return server_error(err),
                },
                None => {
                    errors.push(ClientError::UnknownLexicalCategory(raw.clone()));
                    None
                }
            },
            None => {
                errors.push(ClientError::UnknownLexicalCategory(String::new()));
                None
            }
        }
    } else {
        None
    };

    if !errors.is_empty() {
        let body = LookupResponse::echo(&request, Vec::new(), errors);
        return (StatusCode::OK, Json(body)).into_response();
    }

    let language = language.expect("validated above");

    let page = if phrase_branch {
        store
            .search_phrase(&token, language.id, request.limit, request.offset)
            .await
    } else {
        let lexical_category = lexical_category.expect("validated above");
        match store
            .get_raw_token(&token, lexical_category.id, language.id)
            .await
        {
            Ok(Some(raw_token)) => {
                store
                    .search_by_raw_token(raw_token.id, request.limit, request.offset)
                    .await
            }
            Ok(None) => Ok(crate::store::SearchPage {
                items: Vec::new(),
                total: 0,
            }),
            Err(err) => Err(err),
        }
    };

    let page = match page {
        Ok(page) => page,
        Err(err) => return server_error(err),
    };

    let data: Vec<SentenceResult> = page
        .items
        .into_iter()
        .map(|hit| SentenceResult::new(hit.uuid, hit.text, hit.score))
        .collect();

    let body = LookupResponse::echo(&request, data, Vec::new());
    let mut response = (StatusCode::OK, Json(body)).into_response();
    if let Ok(value) = HeaderValue::from_str(&page.total.to_string()) {
        response.headers_mut().insert(TOTAL_COUNT_HEADER, value);
    }
    response
}

fn server_error(err: crate::error::CorpusError) -> Response {
    tracing::error!(error = %err, "query surface store error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "errors": [err.to_string()] })),
    )
        .into_response()
}

pub async fn liveness() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn openapi_json() -> Json<serde_json::Value> {
    Json(json!({
        "openapi": "3.0.3",
        "info": { "title": "parla-corpus query API", "version": "0.1.0" },
        "paths": {
            "/lookup": {
                "post": {
                    "summary": "Find sentences containing a word or phrase",
                    "requestBody": {
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "properties": {
                                        "token": { "type": "string" },
                                        "lexical_category_qid": { "type": "string" },
                                        "iso_language_code": { "type": "string" },
                                        "limit": { "type": "integer" },
                                        "offset": { "type": "integer" }
                                    }
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": { "description": "Sentences matching the lookup, with X-Total-Count header" }
                    }
                }
            }
        }
    }))
}

pub async fn docs() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html>
<head><title>parla-corpus query API</title></head>
<body>
<div id="swagger-ui"></div>
<script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist/swagger-ui-bundle.js"></script>
<script>
  window.onload = () => SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
</script>
</body>
</html>"#,
    )
}
