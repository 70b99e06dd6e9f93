//! HTTP server: the map page and its polygon data.

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::environment::Config;
use crate::feed::{collect_polygons, create_http_client, AlertMap, DocumentError};
use crate::map::{render_map_page, render_no_alerts_page};

/// Shared by every request. No alert data is kept between requests.
#[derive(Clone)]
pub struct AppState {
    client: reqwest::Client,
    config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            client: create_http_client()?,
            config: Arc::new(config),
        })
    }

    async fn load(&self) -> Result<AlertMap, DocumentError> {
        collect_polygons(
            &self.client,
            &self.config.feed_url,
            self.config.fetch_concurrency,
        )
        .await
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

/// The index could not be loaded; nothing can be shown.
struct FeedUnavailable(DocumentError);

impl IntoResponse for FeedUnavailable {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: "feed_unavailable".to_string(),
            message: self.0.to_string(),
        };
        (StatusCode::BAD_GATEWAY, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(map_page))
        .route("/polygons", get(polygons))
        .route("/status", get(status_check))
        .with_state(state)
}

/// Runs the HTTP server until it fails.
pub async fn serve(config: Config) -> Result<()> {
    let addr = config.bind_address();
    let state = AppState::new(config)?;
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);

    axum::serve(listener, router(state).into_make_service()).await?;
    Ok(())
}

async fn map_page(State(state): State<AppState>) -> Response {
    match state.load().await {
        Ok(map) if map.no_alerts() => Html(render_no_alerts_page()).into_response(),
        Ok(map) => Html(render_map_page(&map.polygons)).into_response(),
        Err(_) => (StatusCode::BAD_GATEWAY, Html(render_no_alerts_page())).into_response(),
    }
}

async fn polygons(State(state): State<AppState>) -> Result<Json<AlertMap>, FeedUnavailable> {
    state.load().await.map(Json).map_err(FeedUnavailable)
}

async fn status_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
