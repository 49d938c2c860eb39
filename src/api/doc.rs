use utoipa::OpenApi;

pub const ROVERS_TAG: &str = "Rovers";
pub const PHOTOS_TAG: &str = "Photos";
pub const MANIFESTS_TAG: &str = "Manifests";
pub const SCRAPER_CONTROL_TAG: &str = "Scraper-Control";
pub const COMPARE_TAG: &str = "Compare";

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = ROVERS_TAG, description = "Rover metadata and rover-scoped photo search"),
        (name = PHOTOS_TAG, description = "Single-photo lookup and cross-rover photo search"),
        (name = MANIFESTS_TAG, description = "Per-sol manifest of a rover's photo counts"),
        (name = SCRAPER_CONTROL_TAG, description = "Admin endpoints that trigger scrape jobs"),
        (name = COMPARE_TAG, description = "Diagnostics that compare stored photos against a live upstream fetch"),
    )
)]
pub struct ApiDoc;
