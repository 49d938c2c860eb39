//! Admin endpoints that trigger and inspect scrape jobs (§4.4, §4.10).

use crate::api::error::{ApiError, ApiResult};
use crate::app::AppState;
use crate::query;
use crate::scraper::{self, pds_volume::PdsVolumeScraper};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct JobStarted {
    pub job_id: i64,
}

#[derive(Deserialize)]
pub struct SolParam {
    pub sol: i32,
}

pub async fn scrape_sol(State(state): State<AppState>, Path(rover_name): Path<String>, Query(params): Query<SolParam>) -> ApiResult<Json<JobStarted>> {
    let mut conn = state.get_connection()?;
    let rover = query::resolve_rover(&mut conn, &rover_name)?;
    let scraper = scraper::registry(&rover_name, &state.config).ok_or_else(|| ApiError::UnknownScraper(rover_name.clone()))?;
    let job_id = scraper::run_sol(&mut conn, &state.config, &state.client, scraper.as_ref(), &rover, params.sol).await?;
    Ok(Json(JobStarted { job_id }))
}

#[derive(Deserialize)]
pub struct BulkParams {
    pub start_sol: i32,
    pub end_sol: i32,
}

pub async fn scrape_bulk(State(state): State<AppState>, Path(rover_name): Path<String>, Query(params): Query<BulkParams>) -> ApiResult<Json<JobStarted>> {
    let mut conn = state.get_connection()?;
    let rover = query::resolve_rover(&mut conn, &rover_name)?;
    let scraper = scraper::registry(&rover_name, &state.config).ok_or_else(|| ApiError::UnknownScraper(rover_name.clone()))?;
    let job_id = scraper::run_bulk(&mut conn, &state.config, &state.client, scraper.as_ref(), &rover, params.start_sol, params.end_sol).await?;
    Ok(Json(JobStarted { job_id }))
}

#[derive(Serialize)]
pub struct RoverProgress {
    pub rover_name: String,
    pub start_sol: i32,
    pub end_sol: Option<i32>,
    pub sols_attempted: i32,
    pub sols_succeeded: i32,
    pub photos_added: i32,
    pub failed_sols: Vec<i32>,
    pub status: crate::model::enums::JobStatus,
}

pub async fn progress(State(state): State<AppState>, Path(rover_name): Path<String>) -> ApiResult<Json<RoverProgress>> {
    let mut conn = state.get_connection()?;
    let rover = query::resolve_rover(&mut conn, &rover_name)?;
    let detail = crate::repository::job::latest_rover_detail(&mut conn, &rover.name)?.ok_or(ApiError::PhotoNotFound)?;
    Ok(Json(RoverProgress {
        rover_name: detail.rover_name,
        start_sol: detail.start_sol,
        end_sol: detail.end_sol,
        sols_attempted: detail.sols_attempted,
        sols_succeeded: detail.sols_succeeded,
        photos_added: detail.photos_added,
        failed_sols: detail.failed_sols,
        status: detail.status,
    }))
}

/// Both `opportunity` and `spirit` are PDS-volume rovers (§4.4.3); any other
/// name is a 400, not a 404, since the route itself is volume-scraper-only.
fn pds_scraper(rover_name: &str, state: &AppState) -> ApiResult<PdsVolumeScraper> {
    match rover_name.to_lowercase().as_str() {
        "opportunity" => PdsVolumeScraper::opportunity(&state.config),
        "spirit" => PdsVolumeScraper::spirit(&state.config),
        _ => None,
    }
    .ok_or_else(|| ApiError::UnknownScraper(rover_name.to_owned()))
}

pub async fn scrape_volume(State(state): State<AppState>, Path((rover_name, volume_name)): Path<(String, String)>) -> ApiResult<Json<JobStarted>> {
    let mut conn = state.get_connection()?;
    let rover = query::resolve_rover(&mut conn, &rover_name)?;
    let scraper = pds_scraper(&rover_name, &state)?;
    let job_id = scraper::run_volume(&mut conn, &state.config, &state.client, &scraper, &rover, &volume_name).await?;
    Ok(Json(JobStarted { job_id }))
}

pub async fn scrape_all_volumes(State(state): State<AppState>, Path(rover_name): Path<String>) -> ApiResult<Json<JobStarted>> {
    let mut conn = state.get_connection()?;
    let rover = query::resolve_rover(&mut conn, &rover_name)?;
    let scraper = pds_scraper(&rover_name, &state)?;
    let job_id = scraper::run_all_volumes(&mut conn, &state.config, &state.client, &scraper, &rover).await?;
    Ok(Json(JobStarted { job_id }))
}
