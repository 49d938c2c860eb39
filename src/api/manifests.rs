//! `GET /rovers/{name}/manifest` (§4.6.3).

use crate::api::dto::ManifestEntryDto;
use crate::api::error::ApiResult;
use crate::app::AppState;
use crate::query;
use axum::extract::{Path, State};
use axum::Json;

pub async fn manifest(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<Vec<ManifestEntryDto>>> {
    let mut conn = state.get_connection()?;
    let rover = query::resolve_rover(&mut conn, &name)?;
    let entries = query::manifest(&mut conn, &rover)?;
    Ok(Json(entries.into_iter().map(ManifestEntryDto::from).collect()))
}
