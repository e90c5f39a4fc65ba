use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use ng_core::{pipeline, Article, FilterPolicy};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::profiles::{Outcome, ProfileOverrides, RouteProfile};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlesResponse {
    pub status: String,
    pub total_results: usize,
    pub articles: Vec<Article>,
    pub fallback: bool,
}

impl From<Outcome> for ArticlesResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            status: "ok".to_string(),
            total_results: outcome.articles.len(),
            articles: outcome.articles,
            fallback: outcome.fallback,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub articles: Value,
    #[serde(default)]
    pub policy: FilterPolicy,
}

type ApiResult<T> = Result<Json<T>, ApiError>;

async fn serve_profile(
    state: &AppState,
    name: &str,
    overrides: ProfileOverrides,
) -> ApiResult<ArticlesResponse> {
    let profile = state
        .profile(name)
        .ok_or_else(|| ApiError::NotFound(name.to_string()))?
        .with_overrides(&overrides);

    let outcome = profile.resolve(&state.orchestrator).await?;
    info!(
        profile = name,
        returned = outcome.articles.len(),
        fallback = outcome.fallback,
        "📤 serving articles"
    );
    Ok(Json(outcome.into()))
}

pub async fn news(
    State(state): State<Arc<AppState>>,
    Query(overrides): Query<ProfileOverrides>,
) -> ApiResult<ArticlesResponse> {
    serve_profile(&state, "news", overrides).await
}

pub async fn everything(
    State(state): State<Arc<AppState>>,
    Query(overrides): Query<ProfileOverrides>,
) -> ApiResult<ArticlesResponse> {
    serve_profile(&state, "everything", overrides).await
}

pub async fn international(
    State(state): State<Arc<AppState>>,
    Query(overrides): Query<ProfileOverrides>,
) -> ApiResult<ArticlesResponse> {
    serve_profile(&state, "international", overrides).await
}

pub async fn profile(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(overrides): Query<ProfileOverrides>,
) -> ApiResult<ArticlesResponse> {
    serve_profile(&state, &name, overrides).await
}

pub async fn list_profiles(State(state): State<Arc<AppState>>) -> Json<Vec<RouteProfile>> {
    Json(state.profiles.clone())
}

pub async fn filter_articles(
    payload: Result<Json<FilterRequest>, JsonRejection>,
) -> ApiResult<ArticlesResponse> {
    let Json(request) = payload?;
    let articles = pipeline::filter_value(&request.articles, &request.policy)?;
    Ok(Json(
        Outcome {
            articles,
            fallback: false,
        }
        .into(),
    ))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
