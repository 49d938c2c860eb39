//! `/photos/{id}` and the cross-rover `/photos/search` endpoint (§4.6.1, §6.1).

use crate::api::dto::{self, FieldSet, ListEnvelope, PhotoResource};
use crate::api::error::{ApiError, ApiResult};
use crate::app::AppState;
use crate::query::{self, PhotoFilter, Sort};
use crate::time::DateTime;
use axum::extract::{Path, Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;

pub async fn get_photo(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<PhotoResource>> {
    let mut conn = state.get_connection()?;
    let photo = crate::schema::photos::table
        .find(id)
        .select(crate::model::photo::Photo::as_select())
        .first(&mut conn)
        .optional()
        .map_err(crate::query::Error::from)?
        .ok_or(ApiError::PhotoNotFound)?;

    let rover = crate::repository::rover::find_by_id(&mut conn, photo.rover_id)?.ok_or(ApiError::PhotoNotFound)?;
    let camera = crate::repository::camera::find_by_id(&mut conn, photo.camera_id)?.ok_or(ApiError::PhotoNotFound)?;
    Ok(Json(dto::photo_resource(&photo, &rover, &camera, FieldSet::Full, true, true)))
}

/// The full fixed parameter set (§4.6.1): every field is optional, and an
/// absent `sol`/`earth_date` simply skips the date predicate rather than
/// erroring — only the rover-scoped endpoint requires one.
#[derive(Deserialize)]
pub struct SearchParams {
    pub rover_id: Option<i64>,
    pub rover_name: Option<String>,
    pub rovers: Option<String>,
    pub sol: Option<i32>,
    pub earth_date: Option<String>,
    pub camera: Option<String>,
    pub cameras: Option<String>,
    pub sol_min: Option<i32>,
    pub sol_max: Option<i32>,
    pub date_min: Option<String>,
    pub date_max: Option<String>,
    pub nasa_id: Option<String>,
    pub site: Option<i32>,
    pub drive: Option<i32>,
    pub sample_type: Option<String>,
    pub sort: Option<String>,
    #[serde(default)]
    pub include: Option<String>,
    #[serde(default)]
    pub field_set: FieldSet,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

fn split_csv(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|value| value.split(',').map(str::trim).filter(|part| !part.is_empty()).map(String::from).collect())
}

pub async fn search_photos(State(state): State<AppState>, Query(params): Query<SearchParams>) -> ApiResult<Json<ListEnvelope<PhotoResource>>> {
    let mut conn = state.get_connection()?;

    let sort = match &params.sort {
        Some(raw) => Sort::parse(raw).map_err(crate::query::Error::from)?,
        None => Sort::default(),
    };

    let filter = PhotoFilter {
        rover_id: params.rover_id,
        rover_name: params.rover_name.clone(),
        rovers: split_csv(&params.rovers),
        sol: params.sol,
        earth_date: params.earth_date.as_deref().and_then(DateTime::parse_upstream),
        camera: params.camera.clone(),
        cameras: split_csv(&params.cameras),
        sol_min: params.sol_min,
        sol_max: params.sol_max,
        date_min: params.date_min.as_deref().and_then(DateTime::parse_upstream),
        date_max: params.date_max.as_deref().and_then(DateTime::parse_upstream),
        nasa_id: params.nasa_id.clone(),
        site: params.site,
        drive: params.drive,
        sample_type: params.sample_type.clone(),
        sort,
        page: params.page.unwrap_or(1),
        per_page: params.per_page,
    };

    let page = query::search_photos(&mut conn, &state.config.query, &filter)?;

    let includes = split_csv(&params.include).unwrap_or_default();
    let include_rover = includes.iter().any(|i| i == "rover");
    let include_camera = includes.iter().any(|i| i == "camera");

    let mut resources = Vec::with_capacity(page.photos.len());
    for photo in &page.photos {
        let rover = crate::repository::rover::find_by_id(&mut conn, photo.rover_id)?.ok_or(ApiError::PhotoNotFound)?;
        let camera = crate::repository::camera::find_by_id(&mut conn, photo.camera_id)?.ok_or(ApiError::PhotoNotFound)?;
        resources.push(dto::photo_resource(photo, &rover, &camera, params.field_set, include_rover, include_camera));
    }

    let envelope = ListEnvelope::from_page(page, resources, "/api/v1/photos/search", "field_set=basic");
    Ok(Json(envelope))
}
