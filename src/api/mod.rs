pub mod dto;
pub mod error;

pub mod doc;
mod compare;
mod manifests;
mod photos;
mod rovers;
mod scraper_control;

use crate::app::AppState;
use axum::routing::{get, post};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

/// Wires every handler module onto its path and returns the
/// `(Router, OpenApi)` pair `app::run` splits apart to mount both the JSON
/// API and the Swagger UI.
pub fn routes(state: AppState) -> OpenApiRouter {
    OpenApiRouter::with_openapi(doc::ApiDoc::openapi())
        .route("/api/v1/rovers", get(rovers::list_rovers))
        .route("/api/v1/rovers/{name}", get(rovers::get_rover))
        .route("/api/v1/rovers/{name}/photos", get(rovers::rover_photos))
        .route("/api/v1/rovers/{name}/latest_photos", get(rovers::latest_photos))
        .route("/api/v1/rovers/{name}/manifest", get(manifests::manifest))
        .route("/api/v1/photos/{id}", get(photos::get_photo))
        .route("/api/v1/photos/search", get(photos::search_photos))
        .route("/api/v1/scraper/{rover}", post(scraper_control::scrape_sol))
        .route("/api/v1/scraper/{rover}/bulk", post(scraper_control::scrape_bulk))
        .route("/api/v1/scraper/{rover}/progress", get(scraper_control::progress))
        .route("/api/v1/scraper/{rover}/volume/{volume_name}", post(scraper_control::scrape_volume))
        .route("/api/v1/scraper/{rover}/volumes", post(scraper_control::scrape_all_volumes))
        .route("/api/v1/compare/sol", get(compare::compare_sol))
        .route("/api/v1/compare/photo", get(compare::compare_photo))
        .route("/api/v1/compare/range", get(compare::compare_range))
        .with_state(state)
}
