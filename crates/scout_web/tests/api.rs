use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use scout_core::{
    ArticleBatch, ArticleStorage, Error, InferenceModel, Prompt, Result, Stored, TitledArticle,
    UnifiedSummary, UserInput,
};
use scout_inference::uploader::PassthroughUploader;
use scout_inference::{ArticleComposer, Summarizer};
use scout_scrapers::browser::fake::FakeWeb;
use scout_scrapers::{ScraperConfig, SearchManager, SocialScraper, WebScraper};
use scout_storage::MemoryStorage;
use scout_web::{create_app, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt;

/// Numbered titles for title prompts, a fixed image, and an echo for everything else
struct ScriptedModel;

#[async_trait]
impl InferenceModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<Option<String>> {
        if prompt.system.contains("titles") {
            return Ok(Some("1. A 2. B 3. C".to_string()));
        }
        if prompt.system.contains("image model") {
            return Ok(Some("a golden coin".to_string()));
        }
        Ok(Some("Bitcoin rallied.".to_string()))
    }

    async fn generate_image(&self, _prompt: &str) -> Result<Option<String>> {
        Ok(Some("https://images.example/thumb.png".to_string()))
    }
}

/// Every call fails as if the database were unreachable
struct UnavailableStorage;

fn unavailable<T>() -> Result<T> {
    Err(Error::Storage("database unreachable".to_string()))
}

#[async_trait]
impl ArticleStorage for UnavailableStorage {
    async fn insert_batch_if_absent(&self, _batch: &ArticleBatch) -> Result<bool> {
        unavailable()
    }

    async fn get_batch(&self, _id: &str) -> Result<Option<ArticleBatch>> {
        unavailable()
    }

    async fn list_batches(&self) -> Result<Vec<ArticleBatch>> {
        unavailable()
    }

    async fn store_summary(&self, _summary: &UnifiedSummary) -> Result<String> {
        unavailable()
    }

    async fn store_titled_article(&self, _article: &TitledArticle) -> Result<String> {
        unavailable()
    }

    async fn list_titled_articles(&self) -> Result<Vec<Stored<TitledArticle>>> {
        unavailable()
    }

    async fn get_titled_article(&self, _id: &str) -> Result<Option<Stored<TitledArticle>>> {
        unavailable()
    }

    async fn store_user_input(&self, _input: &UserInput) -> Result<String> {
        unavailable()
    }
}

fn app_with(web: FakeWeb, storage: MemoryStorage) -> Router {
    app_with_storage(web, Arc::new(storage))
}

fn app_with_storage(web: FakeWeb, storage: Arc<dyn ArticleStorage>) -> Router {
    let model: Arc<dyn InferenceModel> = Arc::new(ScriptedModel);
    let state = AppState::new(
        storage.clone(),
        SearchManager::new(Arc::new(web), storage, ScraperConfig::default()),
        Summarizer::new(model.clone()),
        ArticleComposer::new(model, Arc::new(PassthroughUploader)),
    );
    create_app(state, tower_http::cors::CorsLayer::permissive())
}

fn bitcoin_web(query: &str) -> FakeWeb {
    let config = ScraperConfig::default();
    FakeWeb::new()
        .with_page(
            WebScraper::new(config.clone()).page_url(query, 0).unwrap().as_str(),
            r#"<a href="https://news.example/btc"><h3>Bitcoin today</h3></a>
               <a href="https://slow.example/btc"><h3>Markets</h3></a>"#,
        )
        .with_page("https://news.example/btc", "<article>Price is $50k</article>")
        .with_timeout("https://slow.example/btc")
        .with_page(
            SocialScraper::new(config).search_url(query).unwrap().as_str(),
            r#"<article data-testid="tweet">
                 <div data-testid="User-Name">satoshi</div>
                 <div data-testid="tweetText">hodl</div>
                 <a href="/satoshi/status/1">now</a>
               </article>"#,
        )
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_search_requires_query() {
    let app = app_with(FakeWeb::new(), MemoryStorage::new());

    for uri in ["/search", "/search?q=", "/search?q=%20%20"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Search query is required" }));
    }
}

#[tokio::test]
async fn test_search_without_results_is_not_found() {
    let storage = MemoryStorage::new();
    let app = app_with(FakeWeb::new(), storage.clone());

    let (status, body) = send(&app, Method::GET, "/search?q=nothing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "No articles found" }));

    let (status, body) = send(&app, Method::GET, "/api/batches", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "No batches found" }));
}

#[tokio::test]
async fn test_search_saves_batch() {
    let query = "bitcoin price today";
    let app = app_with(bitcoin_web(query), MemoryStorage::new());

    let (status, body) = send(&app, Method::GET, "/search?q=bitcoin+price+today", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Articles saved successfully");
    assert_eq!(body["count"], 3);
    assert_eq!(body["results"][0]["content"], "Price is $50k");
    assert_eq!(body["results"][1]["content"], "Error fetching article content");
    assert_eq!(body["results"][2]["source"], "social");
    assert_eq!(body["results"][2]["link"], "https://x.com/satoshi/status/1");

    let (status, body) = send(&app, Method::GET, "/api/batches", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    let id = body["batches"][0]["id"].as_str().unwrap();
    assert!(id.starts_with("bitcoin-price-today-"));
    assert_eq!(body["batches"][0]["articleCount"], 3);
    assert_eq!(body["batches"][0]["searchQuery"], query);
}

#[tokio::test]
async fn test_concurrent_search_conflicts() {
    let query = "bitcoin price today";
    let web = bitcoin_web(query).with_launch_delay(Duration::from_millis(100));
    let app = app_with(web, MemoryStorage::new());

    let (first, second) = tokio::join!(
        send(&app, Method::GET, "/search?q=bitcoin+price+today", None),
        send(&app, Method::GET, "/search?q=Bitcoin+Price+Today", None),
    );
    let (ok, conflict) = if first.0 == StatusCode::OK { (first, second) } else { (second, first) };
    assert_eq!(ok.0, StatusCode::OK);
    assert_eq!(conflict.0, StatusCode::CONFLICT);
    assert!(conflict.1["error"].as_str().unwrap().contains("already running"));
}

#[tokio::test]
async fn test_generate_summary() {
    let storage = MemoryStorage::new();
    let app = app_with(FakeWeb::new(), storage.clone());

    let (status, body) = send(&app, Method::POST, "/api/generate-summary", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No batches provided" }));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/generate-summary",
        Some(json!({ "allBatches": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let batches = json!({
        "allBatches": [
            { "id": "b1", "articles": [{ "title": "Bitcoin", "content": "Price is $50k", "source": "web" }] },
            { "articles": [{ "title": "Post by satoshi", "content": "hodl" }] }
        ]
    });
    let (status, body) = send(&app, Method::POST, "/api/generate-summary", Some(batches)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["unifiedSummary"]["content"], "Bitcoin rallied.");
    assert_eq!(body["unifiedSummary"]["originalBatchCount"], 2);
    assert_eq!(body["unifiedSummary"]["articleCount"], 2);
    assert!(body["summaryId"].as_str().is_some());
    assert_eq!(storage.summaries().await.len(), 1);
}

#[tokio::test]
async fn test_search_failure_carries_details() {
    let app = app_with(FakeWeb::new().with_launch_failure(), MemoryStorage::new());

    let (status, body) = send(&app, Method::GET, "/search?q=bitcoin", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "An error occurred while processing articles");
    assert!(body["details"].as_str().unwrap().contains("Failed to launch browser"));
}

#[tokio::test]
async fn test_read_failures_carry_details() {
    let app = app_with_storage(FakeWeb::new(), Arc::new(UnavailableStorage));

    for (uri, message) in [
        ("/api/articles", "Error fetching articles"),
        ("/api/articles/abc", "Error fetching article"),
        ("/api/batches", "Error fetching article batches"),
    ] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(
            body,
            json!({ "error": message, "details": "Storage error: database unreachable" }),
            "{}",
            uri
        );
    }
}

#[tokio::test]
async fn test_generate_summary_accepts_null_content() {
    let storage = MemoryStorage::new();
    let app = app_with(FakeWeb::new(), storage.clone());

    let batches = json!({
        "allBatches": [
            { "articles": [{ "title": "Bitcoin", "content": null }, { "title": "Eth", "content": "up" }] }
        ]
    });
    let (status, body) = send(&app, Method::POST, "/api/generate-summary", Some(batches)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unifiedSummary"]["articleCount"], 2);
    assert_eq!(storage.summaries().await.len(), 1);
}

#[tokio::test]
async fn test_save_article_end_to_end() {
    let app = app_with(FakeWeb::new(), MemoryStorage::new());

    let (status, body) = send(&app, Method::POST, "/save-article", Some(json!({ "content": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "Content is required." }));

    let (status, body) = send(&app, Method::GET, "/api/articles", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "No articles found" }));

    let (status, body) = send(
        &app,
        Method::POST,
        "/save-article",
        Some(json!({ "content": "Bitcoin surges" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Article saved successfully.");
    assert_eq!(body["titles"], json!({ "title1": "A", "title2": "B", "title3": "C" }));
    assert_eq!(body["thumbnail"], "https://images.example/thumb.png");
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, &format!("/api/articles/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["content"], "Bitcoin surges");
    assert_eq!(body["title2"], "B");
    assert_eq!(body["titleCount"], 3);
    assert_eq!(body["thumbnail"]["prompt"], "a golden coin");

    let (status, body) = send(&app, Method::GET, "/api/articles", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, "/api/articles/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Article not found" }));
}

#[tokio::test]
async fn test_save_user_input() {
    let storage = MemoryStorage::new();
    let app = app_with(FakeWeb::new(), storage.clone());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/saveUserInput",
        Some(json!({ "name": "Ada", "email": "" , "message": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "All fields are required." }));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/saveUserInput",
        Some(json!({ "name": "Ada", "email": "ada@example.com", "message": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Data saved successfully!");
    assert!(body["docId"].as_str().is_some());

    let inputs = storage.user_inputs().await;
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].record.email, "ada@example.com");
}
