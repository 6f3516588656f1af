use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use scout_core::{Error, UserInput};
use scout_inference::SummaryBatch;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

type ApiResult<T> = std::result::Result<T, ApiError>;

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<impl IntoResponse> {
    let query = present(&params.q).ok_or_else(|| ApiError::bad_request("Search query is required"))?;

    let results = match state.search.search(query).await {
        Ok(results) => results,
        Err(e @ Error::SearchInProgress(_)) => {
            return Err(ApiError::error(StatusCode::CONFLICT, &e.to_string()))
        }
        Err(e) => {
            return Err(ApiError::internal_with_details(
                "error",
                "An error occurred while processing articles",
                e,
            ))
        }
    };

    if results.is_empty() {
        return Err(ApiError::message(StatusCode::NOT_FOUND, "No articles found"));
    }

    Ok(Json(json!({
        "message": "Articles saved successfully",
        "count": results.len(),
        "results": results,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    #[serde(default)]
    pub all_batches: Option<Vec<SummaryBatch>>,
}

pub async fn generate_summary(
    State(state): State<Arc<AppState>>,
    body: Option<Json<SummaryRequest>>,
) -> ApiResult<impl IntoResponse> {
    let batches = body
        .and_then(|Json(request)| request.all_batches)
        .filter(|batches| !batches.is_empty())
        .ok_or_else(|| ApiError::bad_request("No batches provided"))?;

    info!("📚 Summarizing {} batches", batches.len());
    let failed = |e: Error| ApiError::internal_with_details("error", "Error generating summary", e);

    let summary = state.summarizer.summarize_batches(&batches).await.map_err(failed)?;
    let summary_id = state.storage.store_summary(&summary).await.map_err(failed)?;

    Ok(Json(json!({
        "success": true,
        "unifiedSummary": summary,
        "summaryId": summary_id,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SaveArticleRequest {
    pub content: Option<String>,
}

pub async fn save_article(
    State(state): State<Arc<AppState>>,
    body: Option<Json<SaveArticleRequest>>,
) -> ApiResult<impl IntoResponse> {
    let request = body.map(|Json(request)| request);
    let content = request
        .as_ref()
        .and_then(|r| present(&r.content))
        .ok_or_else(|| ApiError::message(StatusCode::BAD_REQUEST, "Content is required."))?;

    let article = match state.composer.compose(content).await {
        Ok(article) => article,
        Err(Error::TitleGeneration) => {
            tracing::error!("❌ Title generation returned nothing");
            return Err(ApiError::message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate titles.",
            ));
        }
        Err(e) => return Err(ApiError::internal_with_details("message", "Internal server error.", e)),
    };

    let id = state
        .storage
        .store_titled_article(&article)
        .await
        .map_err(|e| ApiError::internal_with_details("message", "Internal server error.", e))?;
    info!("💾 Saved titled article {}", id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Article saved successfully.",
            "id": id,
            "titles": article.titles,
            "thumbnail": article.thumbnail.url,
        })),
    ))
}

pub async fn list_articles(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let articles = state
        .storage
        .list_titled_articles()
        .await
        .map_err(|e| ApiError::internal_with_details("error", "Error fetching articles", e))?;

    if articles.is_empty() {
        return Err(ApiError::not_found("No articles found"));
    }
    Ok(Json(articles))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state
        .storage
        .get_titled_article(&id)
        .await
        .map_err(|e| ApiError::internal_with_details("error", "Error fetching article", e))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Article not found"))
}

pub async fn list_batches(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let batches = state
        .storage
        .list_batches()
        .await
        .map_err(|e| ApiError::internal_with_details("error", "Error fetching article batches", e))?;

    if batches.is_empty() {
        return Err(ApiError::not_found("No batches found"));
    }
    Ok(Json(json!({
        "count": batches.len(),
        "batches": batches,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UserInputRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

pub async fn save_user_input(
    State(state): State<Arc<AppState>>,
    body: Option<Json<UserInputRequest>>,
) -> ApiResult<impl IntoResponse> {
    let request = body.map(|Json(request)| request);
    let fields = request.as_ref().and_then(|r| {
        Some((present(&r.name)?, present(&r.email)?, present(&r.message)?))
    });
    let (name, email, message) = fields.ok_or_else(|| ApiError::bad_request("All fields are required."))?;

    let input = UserInput {
        name: name.to_string(),
        email: email.to_string(),
        message: message.to_string(),
        timestamp: Utc::now(),
    };

    let doc_id = state.storage.store_user_input(&input).await.map_err(|e| {
        tracing::error!("❌ Failed to save user input: {}", e);
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "success": false, "error": "Failed to save data." }),
        )
    })?;

    Ok(Json(json!({
        "success": true,
        "message": "Data saved successfully!",
        "docId": doc_id,
    })))
}
