use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use invindex::tokenizer::first_term;
use invindex::{Format, IndexStats, InvertedIndex, Query as IndexQuery, SharedIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct TextParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct NotParams {
    #[serde(default)]
    pub include: String,
    #[serde(default)]
    pub exclude: String,
}

#[derive(Deserialize)]
pub struct FrequencyParams {
    pub term: String,
    pub doc: Option<String>,
}

#[derive(Deserialize)]
pub struct StatsParams {
    #[serde(default = "default_top")]
    pub top: usize,
}
fn default_top() -> usize { 10 }

#[derive(Serialize)]
pub struct TermResponse {
    pub query: String,
    /// The normalized term actually looked up.
    pub term: Option<String>,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<TermHit>,
}

#[derive(Serialize)]
pub struct TermHit {
    pub doc_id: String,
    pub positions: Vec<usize>,
    pub content: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<DocHit>,
}

#[derive(Serialize)]
pub struct DocHit {
    pub doc_id: String,
    pub content: String,
}

#[derive(Serialize)]
pub struct FrequencyResponse {
    pub term: String,
    pub normalized: Option<String>,
    pub document_frequency: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_frequency: Option<usize>,
}

#[derive(Deserialize)]
pub struct BatchDoc {
    pub id: String,
    #[serde(alias = "content")]
    pub body: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum BatchInput {
    Docs(Vec<BatchDoc>),
    Doc(BatchDoc),
    Map(HashMap<String, String>),
}

#[derive(Clone)]
pub struct AppState {
    pub index: SharedIndex,
    /// Where `/index/commit` writes the index.
    pub index_path: Option<PathBuf>,
    pub admin_token: Option<String>,
}

pub fn build_app(index_path: Option<String>) -> Result<Router> {
    let index = SharedIndex::default();
    match &index_path {
        Some(path) if std::path::Path::new(path).exists() => index.load(path, Format::from_path(path))?,
        Some(path) => tracing::warn!(path = %path, "index file not found, starting empty"),
        None => {}
    }
    let state = AppState {
        index,
        index_path: index_path.map(PathBuf::from),
        admin_token: std::env::var("ADMIN_TOKEN").ok(),
    };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Ok(router(state).layer(cors))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/search/and", get(and_handler))
        .route("/search/or", get(or_handler))
        .route("/search/not", get(not_handler))
        .route("/search/phrase", get(phrase_handler))
        .route("/query", post(query_handler))
        .route("/frequency", get(frequency_handler))
        .route("/stats", get(stats_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/index/batch", post(index_batch))
        .route("/index/commit", post(index_commit))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<TextParams>) -> Json<TermResponse> {
    let start = Instant::now();
    let term = first_term(&params.q);
    let results: Vec<TermHit> = state.index.with_read(|index| {
        index
            .search(&params.q)
            .into_iter()
            .map(|(doc_id, positions)| {
                let raw = index.document(&doc_id).unwrap_or_default();
                let content = match &term {
                    Some(t) => highlight_term(raw, t),
                    None => raw.to_string(),
                };
                TermHit { doc_id, positions, content }
            })
            .collect()
    });
    Json(TermResponse { query: params.q, term, took_s: start.elapsed().as_secs_f64(), total_hits: results.len(), results })
}

pub async fn and_handler(State(state): State<AppState>, Query(params): Query<TextParams>) -> Json<SearchResponse> {
    let terms = split_terms(&params.q);
    run(&state, params.q, IndexQuery::And { terms })
}

pub async fn or_handler(State(state): State<AppState>, Query(params): Query<TextParams>) -> Json<SearchResponse> {
    let terms = split_terms(&params.q);
    run(&state, params.q, IndexQuery::Or { terms })
}

pub async fn not_handler(State(state): State<AppState>, Query(params): Query<NotParams>) -> Json<SearchResponse> {
    let label = format!("{} NOT {}", params.include, params.exclude);
    let query = IndexQuery::Not { include: split_terms(&params.include), exclude: split_terms(&params.exclude) };
    run(&state, label, query)
}

pub async fn phrase_handler(State(state): State<AppState>, Query(params): Query<TextParams>) -> Json<SearchResponse> {
    let query = IndexQuery::Phrase { phrase: params.q.clone() };
    run(&state, params.q, query)
}

pub async fn query_handler(State(state): State<AppState>, Json(query): Json<IndexQuery>) -> Json<SearchResponse> {
    let label = serde_json::to_string(&query).unwrap_or_default();
    run(&state, label, query)
}

fn run(state: &AppState, label: String, query: IndexQuery) -> Json<SearchResponse> {
    let start = Instant::now();
    let results = state.index.with_read(|index| to_hits(index, query.execute(index)));
    Json(SearchResponse { query: label, took_s: start.elapsed().as_secs_f64(), total_hits: results.len(), results })
}

fn to_hits(index: &InvertedIndex, doc_ids: HashSet<String>) -> Vec<DocHit> {
    let mut hits: Vec<DocHit> = doc_ids
        .into_iter()
        .map(|doc_id| {
            let content = index.document(&doc_id).unwrap_or_default().to_string();
            DocHit { doc_id, content }
        })
        .collect();
    hits.sort_by(|a, b| a.doc_id.cmp(&b.doc_id));
    hits
}

fn split_terms(input: &str) -> Vec<String> {
    input.split_whitespace().map(|s| s.to_string()).collect()
}

pub async fn frequency_handler(State(state): State<AppState>, Query(params): Query<FrequencyParams>) -> Json<FrequencyResponse> {
    let resp = state.index.with_read(|index| FrequencyResponse {
        normalized: first_term(&params.term),
        document_frequency: index.document_frequency(&params.term),
        term_frequency: params.doc.as_deref().map(|doc| index.term_frequency(&params.term, doc)),
        term: params.term.clone(),
    });
    Json(resp)
}

pub async fn stats_handler(State(state): State<AppState>, Query(params): Query<StatsParams>) -> Json<IndexStats> {
    Json(state.index.with_read(|index| index.stats(params.top)))
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<String>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    state.index.with_read(|index| match index.document(&doc_id) {
        Some(content) => Ok(Json(serde_json::json!({
            "doc_id": doc_id,
            "content": content,
            "length": index.doc_length(&doc_id).unwrap_or(0),
        }))),
        None => Err((StatusCode::NOT_FOUND, format!("document '{doc_id}' not found"))),
    })
}

/// Wrap every whole-word, case-insensitive occurrence of `term` in `<em>` tags.
fn highlight_term(text: &str, term: &str) -> String {
    match regex::RegexBuilder::new(&format!(r"\b{}\b", regex::escape(term)))
        .case_insensitive(true)
        .build()
    {
        Ok(pat) => pat.replace_all(text, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).to_string(),
        Err(_) => text.to_string(),
    }
}

// --- Admin endpoints ---
async fn index_batch(State(state): State<AppState>, headers: HeaderMap, Json(input): Json<BatchInput>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let docs: Vec<(String, String)> = match input {
        BatchInput::Docs(docs) => docs.into_iter().map(|d| (d.id, d.body)).collect(),
        BatchInput::Doc(doc) => vec![(doc.id, doc.body)],
        BatchInput::Map(map) => map.into_iter().collect(),
    };
    let indexed = docs.len();
    state.index.build_from_documents(docs);
    let num_docs = state.index.with_read(|index| index.num_docs());
    tracing::info!(indexed, num_docs, "indexed batch");
    Ok(Json(serde_json::json!({ "indexed": indexed, "num_docs": num_docs })))
}

async fn index_commit(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let path = state
        .index_path
        .as_ref()
        .ok_or((StatusCode::CONFLICT, "server started without --index; nowhere to commit".to_string()))?;
    state
        .index
        .save(path, Format::from_path(path))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(serde_json::json!({ "saved": path.display().to_string() })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
