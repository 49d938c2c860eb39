//! `/rovers` and the rover-scoped photo endpoints (§6.1).

use crate::api::dto::{self, FieldSet, ListEnvelope, PhotoResource, Resource, RoverAttributes};
use crate::api::error::{ApiError, ApiResult};
use crate::app::AppState;
use crate::query::{self, PhotoFilter};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

pub async fn list_rovers(State(state): State<AppState>) -> ApiResult<Json<Vec<Resource<RoverAttributes>>>> {
    let mut conn = state.get_connection()?;
    let rovers = crate::repository::rover::all_rovers(&mut conn)?;
    Ok(Json(rovers.iter().map(Resource::from_rover).collect()))
}

pub async fn get_rover(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<Resource<RoverAttributes>>> {
    let mut conn = state.get_connection()?;
    let rover = query::resolve_rover(&mut conn, &name)?;
    Ok(Json(Resource::from_rover(&rover)))
}

#[derive(Deserialize)]
pub struct RoverPhotosParams {
    pub sol: Option<i32>,
    pub earth_date: Option<String>,
    pub camera: Option<String>,
    #[serde(default)]
    pub field_set: FieldSet,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

pub async fn rover_photos(State(state): State<AppState>, Path(name): Path<String>, Query(params): Query<RoverPhotosParams>) -> ApiResult<Json<ListEnvelope<PhotoResource>>> {
    let mut conn = state.get_connection()?;
    let rover = query::resolve_rover(&mut conn, &name)?;

    let filter = PhotoFilter {
        rover_id: Some(rover.id),
        sol: params.sol,
        earth_date: params.earth_date.as_deref().and_then(crate::time::DateTime::parse_upstream),
        camera: params.camera,
        page: params.page.unwrap_or(1),
        per_page: params.per_page,
        ..PhotoFilter::default()
    };

    let page = query::rover_scoped_photos(&mut conn, &state.config.query, &filter)?;
    render_page(&mut conn, page, &rover, params.field_set, format!("/api/v1/rovers/{name}/photos"))
}

pub async fn latest_photos(State(state): State<AppState>, Path(name): Path<String>, Query(field_set): Query<FieldSetOnly>) -> ApiResult<Json<ListEnvelope<PhotoResource>>> {
    let mut conn = state.get_connection()?;
    let rover = query::resolve_rover(&mut conn, &name)?;
    let page = query::latest_photos(&mut conn, &state.config.query, &rover)?;
    render_page(&mut conn, page, &rover, field_set.field_set, format!("/api/v1/rovers/{name}/latest_photos"))
}

#[derive(Deserialize)]
pub struct FieldSetOnly {
    #[serde(default)]
    pub field_set: FieldSet,
}

/// Resolves each photo's camera and builds the list envelope. Pulled out of
/// both rover-scoped handlers since their only difference is which query
/// function produced the page.
fn render_page(conn: &mut diesel::PgConnection, page: query::PhotoPage, rover: &crate::model::rover::Rover, field_set: FieldSet, base_path: String) -> ApiResult<Json<ListEnvelope<PhotoResource>>> {
    let mut resources = Vec::with_capacity(page.photos.len());
    for photo in &page.photos {
        let camera = crate::repository::camera::find_by_id(conn, photo.camera_id)?.ok_or(ApiError::PhotoNotFound)?;
        resources.push(dto::photo_resource(photo, rover, &camera, field_set, false, false));
    }
    let query_string = format!("field_set={}", field_set.as_str());
    let envelope = ListEnvelope::from_page(page, resources, &base_path, &query_string);
    Ok(Json(envelope))
}
