//! NASA-compare diagnostics (§4.6.4): `/compare/sol`, `/compare/photo`, `/compare/range`.

use crate::api::error::{ApiError, ApiResult};
use crate::app::AppState;
use crate::query::{self, compare};
use crate::scraper;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct SolComparisonDto {
    pub sol: i32,
    pub nasa_count: usize,
    pub our_count: usize,
    pub missing: Vec<String>,
    pub extra: Vec<String>,
    pub match_percent: f64,
    pub status: &'static str,
    pub truncated: bool,
}

impl From<compare::SolComparison> for SolComparisonDto {
    fn from(c: compare::SolComparison) -> Self {
        SolComparisonDto {
            sol: c.sol,
            nasa_count: c.nasa_count,
            our_count: c.our_count,
            missing: c.missing,
            extra: c.extra,
            match_percent: c.match_percent,
            status: status_str(c.status),
            truncated: c.truncated,
        }
    }
}

fn status_str(status: compare::CompareStatus) -> &'static str {
    match status {
        compare::CompareStatus::Match => "match",
        compare::CompareStatus::Missing => "missing",
        compare::CompareStatus::Extra => "extra",
        compare::CompareStatus::Divergent => "divergent",
    }
}

fn resolve(rover_name: &str, state: &AppState) -> ApiResult<Box<dyn scraper::Scraper>> {
    scraper::registry(rover_name, &state.config).ok_or_else(|| ApiError::UnknownScraper(rover_name.to_owned()))
}

#[derive(Deserialize)]
pub struct SolParams {
    pub rover: String,
    pub sol: i32,
}

pub async fn compare_sol(State(state): State<AppState>, Query(params): Query<SolParams>) -> ApiResult<Json<SolComparisonDto>> {
    let mut conn = state.get_connection()?;
    let rover = query::resolve_rover(&mut conn, &params.rover)?;
    let scraper = resolve(&params.rover, &state)?;
    let result = compare::compare_sol(&mut conn, &state.config.query, &state.client, scraper.as_ref(), &rover, params.sol).await?;
    Ok(Json(result.into()))
}

#[derive(Serialize)]
pub struct FieldDiffDto {
    pub field: String,
    pub ours: Option<serde_json::Value>,
    pub nasa: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct PhotoComparisonDto {
    pub nasa_id: String,
    pub in_ours: bool,
    pub in_nasa: bool,
    pub field_diffs: Vec<FieldDiffDto>,
}

impl From<compare::PhotoComparison> for PhotoComparisonDto {
    fn from(c: compare::PhotoComparison) -> Self {
        PhotoComparisonDto {
            nasa_id: c.nasa_id,
            in_ours: c.in_ours,
            in_nasa: c.in_nasa,
            field_diffs: c
                .field_diffs
                .into_iter()
                .map(|d| FieldDiffDto {
                    field: d.field,
                    ours: d.ours,
                    nasa: d.nasa,
                })
                .collect(),
        }
    }
}

/// `nasa_id` is only unique within one rover's own imagery, not globally
/// (two rovers' cameras can both emit the same product id), so this
/// endpoint takes a `rover` parameter alongside `nasa_id`.
#[derive(Deserialize)]
pub struct PhotoParams {
    pub rover: String,
    pub nasa_id: String,
}

pub async fn compare_photo(State(state): State<AppState>, Query(params): Query<PhotoParams>) -> ApiResult<Json<PhotoComparisonDto>> {
    let mut conn = state.get_connection()?;
    let rover = query::resolve_rover(&mut conn, &params.rover)?;
    let scraper = resolve(&params.rover, &state)?;
    let result = compare::compare_photo(&mut conn, &state.client, scraper.as_ref(), &rover, &params.nasa_id).await?;
    Ok(Json(result.into()))
}

#[derive(Serialize)]
pub struct RangeComparisonDto {
    pub sols: Vec<SolComparisonDto>,
}

#[derive(Deserialize)]
pub struct RangeParams {
    pub rover: String,
    pub start_sol: i32,
    pub end_sol: i32,
}

pub async fn compare_range(State(state): State<AppState>, Query(params): Query<RangeParams>) -> ApiResult<Json<RangeComparisonDto>> {
    let mut conn = state.get_connection()?;
    let rover = query::resolve_rover(&mut conn, &params.rover)?;
    let scraper = resolve(&params.rover, &state)?;
    let result = compare::compare_range(&mut conn, &state.config.query, &state.client, scraper.as_ref(), &rover, params.start_sol, params.end_sol).await?;
    Ok(Json(RangeComparisonDto {
        sols: result.sols.into_iter().map(SolComparisonDto::from).collect(),
    }))
}
