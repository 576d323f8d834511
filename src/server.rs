use crate::services::book::BookMaker;
use axum::{
    Router,
    extract::State,
    response::{Html, Json},
    routing::{get, post},
};
use http::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    /// Books are created one at a time.
    maker: Arc<Mutex<BookMaker>>,
}

impl AppState {
    pub fn new(maker: BookMaker) -> Self {
        AppState {
            maker: Arc::new(Mutex::new(maker)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/books", post(create_book))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(tower_http::cors::Any)
                    .allow_methods(tower_http::cors::AllowMethods::any())
                    .allow_headers(tower_http::cors::AllowHeaders::any()),
            ),
        )
}

async fn index() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>eBook Generator</title>
    <meta charset="utf-8">
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; }
        .endpoint { background-color: #f5f5f5; padding: 10px; margin: 10px 0; border-radius: 4px; font-family: monospace; }
    </style>
</head>
<body>
    <h1>eBook Generator</h1>
    <p>A team of writing agents turns a short prompt into a finished PDF book with a cover.</p>
    <h2>Available Endpoints:</h2>
    <div class="endpoint">GET / - This information page</div>
    <div class="endpoint">GET /health - Health check</div>
    <div class="endpoint">POST /books - {"prompt": "Write a book about ..."}</div>
    <p>Only one book is generated at a time; further requests wait their turn.</p>
</body>
</html>
"#,
    )
}

async fn health_check() -> &'static str {
    "OK"
}

#[derive(Debug, Deserialize)]
pub struct CreateBook {
    pub prompt: String,
}

async fn create_book(
    State(state): State<AppState>,
    Json(request): Json<CreateBook>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let job_id = uuid::Uuid::new_v4().to_string();
    let maker = state.maker.lock().await;
    tracing::info!(%job_id, "book job started");

    let output = maker.create_ebook(prompt).await.map_err(|e| {
        tracing::error!(%job_id, error = %e, "book job failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(serde_json::json!({
        "success": true,
        "job_id": job_id,
        "title": output.title,
        "folder": output.folder,
        "chapter_count": output.chapter_count,
        "merged": output.merged,
        "termination": output.termination,
    })))
}
