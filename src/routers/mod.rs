pub mod root;
pub mod song;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::controllers::SongController;
use crate::db::SongStore;

pub use root::{health_check_route, not_found_route, root_route};
pub use song::{count_route, legacy_song_routes, song_routes};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub songs: Arc<SongController>,
    pub backend_url: String,
}

impl AppState {
    pub fn new(store: Arc<dyn SongStore>, backend_url: impl Into<String>) -> Self {
        Self {
            songs: Arc::new(SongController::new(store)),
            backend_url: backend_url.into(),
        }
    }
}

/// The full HTTP surface of the service.
pub fn app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Core routes
        .route("/", get(root_route))
        .route("/health", get(health_check_route))
        .route("/count", get(count_route))
        // Songs
        .merge(song_routes())
        .merge(legacy_song_routes())
        .fallback(not_found_route)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
