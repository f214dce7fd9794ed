use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use seo_core::{AnalysisResult, Error, LoadedArticle, SavedArticle};
use seo_session::ImportMode;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub result: AnalysisResult,
    /// Edited body to store instead of `result.htmlContent`.
    #[serde(default)]
    pub html_content: Option<String>,
    /// Defaults to the current draft.
    #[serde(default)]
    pub original_text: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct ImportQuery {
    #[serde(default)]
    pub mode: ImportMode,
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub text: String,
    pub last_autosave: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct DraftRequest {
    pub text: String,
}

#[derive(Deserialize, Default)]
pub struct AnalyzeRequest {
    /// Replaces the current draft before analysis when present.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct DeepenRequest {
    pub result: AnalysisResult,
}

pub async fn list_articles(State(state): State<AppState>) -> Json<Vec<SavedArticle>> {
    Json(state.session.articles())
}

pub async fn create_article(
    State(state): State<AppState>,
    Json(req): Json<SaveRequest>,
) -> ApiResult<impl IntoResponse> {
    let override_html = req.html_content.as_deref();
    let saved = match req.original_text.as_deref() {
        Some(text) => state.session.save_with_text(req.result, text, override_html)?,
        None => state.session.save(req.result, override_html)?,
    };
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SavedArticle>> {
    let article = state
        .session
        .get(&id)
        .ok_or_else(|| Error::NotFound(format!("saved article {}", id)))?;
    Ok(Json(article))
}

/// Returns the article split into result and original text, and makes that
/// text the current draft.
pub async fn load_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LoadedArticle>> {
    Ok(Json(state.session.load(&id)?))
}

pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.session.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn export_articles(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    Ok(Json(state.session.export()?))
}

pub async fn import_articles(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    Json(document): Json<Value>,
) -> ApiResult<Json<ImportResponse>> {
    let count = state.session.import(document, query.mode)?;
    Ok(Json(ImportResponse { count }))
}

pub async fn get_draft(State(state): State<AppState>) -> Json<DraftResponse> {
    Json(DraftResponse {
        text: state.session.text(),
        last_autosave: state.session.last_autosave(),
    })
}

pub async fn put_draft(
    State(state): State<AppState>,
    Json(req): Json<DraftRequest>,
) -> Json<DraftResponse> {
    state.session.set_text(req.text);
    get_draft(State(state)).await
}

pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalysisResult>> {
    if let Some(text) = req.text {
        state.session.set_text(text);
    }
    let text = state.session.text();
    tracing::info!("🤖 Analyzing {} chars with {}", text.len(), state.gateway.name());
    let result = state.gateway.analyze(&text).await?;
    Ok(Json(result))
}

pub async fn deepen(
    State(state): State<AppState>,
    Json(req): Json<DeepenRequest>,
) -> ApiResult<Json<AnalysisResult>> {
    let text = state.session.text();
    tracing::info!("🔎 Deepening \"{}\" with {}", req.result.title, state.gateway.name());
    let result = state.gateway.deepen(&req.result, &text).await?;
    Ok(Json(result))
}
