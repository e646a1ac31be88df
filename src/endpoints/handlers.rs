use crate::controller::{Action, Update, drive};
use crate::endpoints::map::INDEX_HTML;
use crate::endpoints::server::AppState;
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

pub async fn webmap_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // the template is a JS string literal in the page
    let basemap = serde_json::to_string(&state.basemap_template).unwrap_or_default();
    Html(INDEX_HTML.replace("__BASEMAP_TILES__", &basemap))
}

pub async fn grid_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.viewer.lock().await.grid_geojson() {
        Some(geojson) => ([(header::CONTENT_TYPE, "application/geo+json")], geojson).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "grid is not loaded").into_response(),
    }
}

/// Full map rebuild plus view state, for a page that just loaded
pub async fn state_handler(State(state): State<Arc<AppState>>) -> Json<Update> {
    Json(state.viewer.lock().await.replay())
}

/// Commands queued since the last request, e.g. the grid layers once the
/// startup load finishes
pub async fn updates_handler(State(state): State<Arc<AppState>>) -> Json<Update> {
    Json(state.viewer.lock().await.update())
}

pub async fn action_handler(
    State(state): State<Arc<AppState>>,
    Json(action): Json<Action>,
) -> Json<Update> {
    Json(drive(&state.viewer, state.catalog.as_ref(), action).await)
}
