///! HTTP routes: the model as JSON, the card as SVG or PNG, and the built site

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::services::ServeDir;

use nessfix_backend::module::league::{LeagueUpdater, PageSource};
use nessfix_backend::module::renderer::{error_card, CardLayoutKind};
use nessfix_backend::NessfixError;
use nessfix_common::RenderModel;

const NO_STORE: &str = "no-store, must-revalidate";
const CARD_SVG_CACHE: &str = "s-maxage=300, stale-while-revalidate=86400";
const CARD_PNG_DISPOSITION: &str = r#"inline; filename="nessfix-card.png""#;

#[derive(Clone)]
pub struct AppState {
    pub updater: Arc<LeagueUpdater>,
    pub source: Arc<dyn PageSource>,
    /// Read the snapshot instead of scraping on every request
    pub use_snapshot: bool,
}

impl AppState {
    async fn current_model(&self) -> Result<RenderModel, NessfixError> {
        if self.use_snapshot {
            let path = self.updater.config().output.snapshot_path();
            self.updater.load_snapshot(path).await
        } else {
            self.updater.scrape(self.source.as_ref()).await
        }
    }

    fn layout(&self, query: &CardQuery) -> CardLayoutKind {
        query
            .layout
            .as_deref()
            .and_then(|l| l.parse().ok())
            .unwrap_or(self.updater.config().card.layout)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CardQuery {
    layout: Option<String>,
}

fn json_error(e: impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
        .into_response()
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn latest(State(state): State<AppState>) -> Response {
    match state.current_model().await {
        Ok(model) => ([(header::CACHE_CONTROL, NO_STORE)], Json(model)).into_response(),
        Err(e) => {
            tracing::error!("Latest model unavailable: {}", e);
            json_error(e)
        }
    }
}

async fn card_svg(State(state): State<AppState>, Query(query): Query<CardQuery>) -> Response {
    let svg_type = (header::CONTENT_TYPE, "image/svg+xml; charset=utf-8");
    match state.current_model().await {
        Ok(model) => {
            let svg = state.updater.card_svg(&model, state.layout(&query));
            ([svg_type, (header::CACHE_CONTROL, CARD_SVG_CACHE)], svg).into_response()
        }
        Err(e) => {
            tracing::error!("SVG card unavailable: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, [svg_type], error_card(&e.to_string())).into_response()
        }
    }
}

async fn card_png(State(state): State<AppState>, Query(query): Query<CardQuery>) -> Response {
    let model = match state.current_model().await {
        Ok(model) => model,
        Err(e) => {
            tracing::error!("PNG card unavailable: {}", e);
            return json_error(e);
        }
    };

    match state.updater.card_png(&model, state.layout(&query)).await {
        Ok(png) => (
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, NO_STORE),
                (header::CONTENT_DISPOSITION, CARD_PNG_DISPOSITION),
            ],
            png,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("PNG rasterizing failed: {}", e);
            json_error(e)
        }
    }
}

/// API routes plus the built site as the fallback.
pub fn router(state: AppState) -> Router {
    let site = ServeDir::new(state.updater.config().output.dir());
    Router::new()
        .route("/health", get(health_check))
        .route("/api/latest", get(latest))
        .route("/api/card.svg", get(card_svg))
        .route("/api/card.png", get(card_png))
        .fallback_service(site)
        .with_state(state)
}
