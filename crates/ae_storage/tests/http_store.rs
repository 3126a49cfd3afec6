use std::sync::{Arc, Mutex};
use std::time::Duration;

use ae_core::{ArticleId, ArticleStore, Error, PublishedArticle};
use ae_storage::HttpArticleStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct FakeStore {
    articles: Arc<Mutex<Vec<Value>>>,
    fail_writes: bool,
}

async fn list(State(store): State<FakeStore>) -> Json<Value> {
    let articles = store.articles.lock().unwrap().clone();
    Json(json!({ "success": true, "articles": articles }))
}

async fn create(State(store): State<FakeStore>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if store.fail_writes {
        return (StatusCode::OK, Json(json!({ "success": false })));
    }
    let mut articles = store.articles.lock().unwrap();
    let id = articles.len() as i64 + 1;
    let mut article = body;
    article["id"] = json!(id);
    articles.push(article);
    (StatusCode::CREATED, Json(json!({ "success": true, "article_id": id })))
}

async fn show(State(store): State<FakeStore>, Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
    let articles = store.articles.lock().unwrap();
    match articles.iter().find(|a| a["id"] == json!(id)) {
        Some(article) => (StatusCode::OK, Json(json!({ "success": true, "article": article }))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "error": "Article not found" })),
        ),
    }
}

async fn update(
    State(store): State<FakeStore>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut articles = store.articles.lock().unwrap();
    match articles.iter_mut().find(|a| a["id"] == json!(id)) {
        Some(article) => {
            let mut replacement = body;
            replacement["id"] = json!(id);
            *article = replacement;
            (StatusCode::OK, Json(json!({ "success": true })))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "error": "Article not found" })),
        ),
    }
}

async fn serve(store: FakeStore) -> String {
    let router = Router::new()
        .route("/api/articles", get(list).post(create))
        .route("/api/articles/:id", get(show).put(update))
        .with_state(store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/api/articles", addr)
}

fn seeded() -> FakeStore {
    let store = FakeStore::default();
    store.articles.lock().unwrap().push(json!({
        "id": 1,
        "title": "Why live chat matters",
        "url": "https://beyondchats.example/blogs/live-chat",
        "content": "Original body",
        "author": null,
        "published_date": "2023-05-01",
        "scraped_at": "2024-01-01 00:00:00"
    }));
    store
}

fn published(title: &str) -> PublishedArticle {
    PublishedArticle {
        title: title.to_string(),
        url: "https://example.com/articles/1".to_string(),
        content: "Rewritten\n\n## References\n\n- [A](https://a.example/blog/a)".to_string(),
        author: String::new(),
        published_date: "2024-01-01T00:00:00.000Z".to_string(),
    }
}

#[tokio::test]
async fn test_list_and_get_articles() {
    let base_url = serve(seeded()).await;
    let store = HttpArticleStore::new(&base_url, Duration::from_secs(5)).unwrap();

    let articles = store.list_articles().await.unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].id, ArticleId::Number(1));
    assert_eq!(articles[0].author, None);

    let article = store.get_article(&ArticleId::Number(1)).await.unwrap();
    assert_eq!(article.title, "Why live chat matters");
    assert_eq!(article.content.as_deref(), Some("Original body"));
}

#[tokio::test]
async fn test_publish_and_update() {
    let fake = seeded();
    let base_url = serve(fake.clone()).await;
    let store = HttpArticleStore::new(&base_url, Duration::from_secs(5)).unwrap();

    let id = store.publish_article(&published("Enhanced")).await.unwrap();
    assert_eq!(id, Some(ArticleId::Number(2)));
    assert_eq!(fake.articles.lock().unwrap().len(), 2);

    store
        .update_article(&ArticleId::Number(2), &published("Enhanced again"))
        .await
        .unwrap();
    let article = store.get_article(&ArticleId::Number(2)).await.unwrap();
    assert_eq!(article.title, "Enhanced again");
    assert_eq!(article.author.as_deref(), Some(""));
}

#[tokio::test]
async fn test_not_found_carries_status_and_message() {
    let base_url = serve(seeded()).await;
    let store = HttpArticleStore::new(&base_url, Duration::from_secs(5)).unwrap();

    let err = store.get_article(&ArticleId::Number(99)).await.unwrap_err();
    match err {
        Error::Store { status, message } => {
            assert_eq!(status, Some(404));
            assert_eq!(message, "Article not found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unsuccessful_publish_is_an_error() {
    let base_url = serve(FakeStore {
        fail_writes: true,
        ..FakeStore::default()
    })
    .await;
    let store = HttpArticleStore::new(&base_url, Duration::from_secs(5)).unwrap();

    let err = store.publish_article(&published("Enhanced")).await.unwrap_err();
    match err {
        Error::Store { status, message } => {
            assert_eq!(status, Some(200));
            assert_eq!(message, "Failed to publish article");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_store_is_store_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = HttpArticleStore::new(&format!("http://{}/api/articles", addr), Duration::from_secs(2)).unwrap();
    let err = store.list_articles().await.unwrap_err();
    assert!(matches!(err, Error::Store { status: None, .. }));
}
