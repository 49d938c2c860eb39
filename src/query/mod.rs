//! The read side of the crate: filterable photo search, latest photos, the
//! per-rover manifest, and NASA-compare diagnostics (§4.6). Parameters are
//! the fixed named set in §6.1 rather than the teacher's free-form query
//! grammar, built as incrementally boxed Diesel queries in the same shape
//! as the teacher's `search::filter` helpers.

pub mod compare;
pub mod filter;

use crate::config::QueryConfig;
use crate::model::photo::Photo;
use crate::model::rover::Rover;
use crate::repository;
use crate::schema::{cameras, rovers};
use crate::time::DateTime;
use diesel::pg::expression::expression_methods::PgTextExpressionMethods;
use diesel::prelude::*;
use diesel::PgConnection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Query(#[from] diesel::result::Error),
    #[error("unknown rover {0}")]
    UnknownRover(String),
    #[error("exactly one of sol or earth_date is required")]
    MissingDateSelector,
    #[error("invalid sort field {0}")]
    InvalidSort(String),
    #[error("page must be a positive integer")]
    InvalidPage,
    #[error("compare range of {requested} sols exceeds the {max} sol cap")]
    CompareRangeTooLarge { requested: i64, max: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Sol,
    EarthDate,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Sort {
            field: SortField::Id,
            direction: SortDirection::Asc,
        }
    }
}

impl Sort {
    /// Parses one of the fixed allow-list tokens: `sol`, `-sol`,
    /// `earth_date`, `-earth_date`, `id`, `-id` (§4.6.1).
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let (field_str, direction) = match raw.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (raw, SortDirection::Asc),
        };
        let field = match field_str {
            "sol" => SortField::Sol,
            "earth_date" => SortField::EarthDate,
            "id" => SortField::Id,
            _ => return Err(Error::InvalidSort(raw.to_owned())),
        };
        Ok(Sort { field, direction })
    }
}

/// The fixed, named parameter set for photo search (§4.6.1), before rover
/// and camera names have been resolved to ids.
#[derive(Debug, Clone, Default)]
pub struct PhotoFilter {
    pub rover_id: Option<i64>,
    pub rover_name: Option<String>,
    pub rovers: Option<Vec<String>>,
    pub sol: Option<i32>,
    pub earth_date: Option<DateTime>,
    pub camera: Option<String>,
    pub cameras: Option<Vec<String>>,
    pub sol_min: Option<i32>,
    pub sol_max: Option<i32>,
    pub date_min: Option<DateTime>,
    pub date_max: Option<DateTime>,
    pub nasa_id: Option<String>,
    pub site: Option<i32>,
    pub drive: Option<i32>,
    pub sample_type: Option<String>,
    pub sort: Sort,
    pub page: i64,
    pub per_page: Option<i64>,
}

/// Rover/camera names resolved to ids, built once per search by
/// [`resolve_ids`] and threaded through [`filter::apply_rest`].
#[derive(Debug, Clone, Default)]
pub struct ResolvedIds {
    pub rover_id: Option<i64>,
    pub rover_ids: Option<Vec<i64>>,
    pub camera_ids: Option<Vec<i64>>,
}

pub struct PhotoPage {
    pub photos: Vec<Photo>,
    pub total_count: i64,
    pub page: i64,
    pub per_page: i64,
}

impl PhotoPage {
    pub fn total_pages(&self) -> i64 {
        if self.per_page == 0 {
            0
        } else {
            self.total_count.div_ceil(self.per_page)
        }
    }
}

fn resolve_pagination(config: &QueryConfig, page: i64, per_page: Option<i64>) -> Result<(i64, i64), Error> {
    if page < 1 {
        return Err(Error::InvalidPage);
    }
    let per_page = per_page.unwrap_or(config.default_per_page);
    if per_page < 1 {
        return Err(Error::InvalidPage);
    }
    Ok((page, per_page.min(config.max_per_page)))
}

fn resolve_ids(conn: &mut PgConnection, filter: &PhotoFilter) -> Result<ResolvedIds, Error> {
    let rover_id = match (filter.rover_id, &filter.rover_name) {
        (Some(id), _) => Some(id),
        (None, Some(name)) => {
            let rover = repository::rover::find_rover_by_name(conn, name)?.ok_or_else(|| Error::UnknownRover(name.clone()))?;
            Some(rover.id)
        }
        (None, None) => None,
    };

    let rover_ids = match &filter.rovers {
        Some(names) if !names.is_empty() => Some(rover_ids_matching_any(conn, names)?),
        _ => None,
    };

    let camera_ids = match (&filter.camera, &filter.cameras) {
        (Some(camera), _) => Some(cameras::table.filter(cameras::short_name.ilike(camera)).select(cameras::id).load(conn)?),
        (None, Some(names)) if !names.is_empty() => Some(camera_ids_matching_any(conn, names)?),
        _ => None,
    };

    Ok(ResolvedIds {
        rover_id,
        rover_ids,
        camera_ids,
    })
}

/// Ids of every rover matching one of `names`, case-insensitively (§6.1).
/// One `ilike` lookup per name rather than a single `eq_any` — the list is
/// at most a handful of names per request, and `eq_any` has no case-folding
/// counterpart that doesn't require a raw SQL fragment.
fn rover_ids_matching_any(conn: &mut PgConnection, names: &[String]) -> QueryResult<Vec<i64>> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        ids.extend(rovers::table.filter(rovers::name.ilike(name)).select(rovers::id).load::<i64>(conn)?);
    }
    Ok(ids)
}

/// Ids of every camera matching one of `names`, case-insensitively (§4.6.1
/// "case-insensitive OR").
fn camera_ids_matching_any(conn: &mut PgConnection, names: &[String]) -> QueryResult<Vec<i64>> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        ids.extend(cameras::table.filter(cameras::short_name.ilike(name)).select(cameras::id).load::<i64>(conn)?);
    }
    Ok(ids)
}

/// The core search operation (§4.6.1). Used directly by the cross-rover
/// `/photos/search` endpoint, which requires neither `sol` nor `earth_date`.
pub fn search_photos(conn: &mut PgConnection, config: &QueryConfig, filter: &PhotoFilter) -> Result<PhotoPage, Error> {
    let (page, per_page) = resolve_pagination(config, filter.page, filter.per_page)?;
    let ids = resolve_ids(conn, filter)?;

    let count_query = filter::apply_rest(filter::apply_date_predicate(crate::schema::photos::table.into_boxed(), filter), filter, &ids);
    let total_count: i64 = count_query.count().get_result(conn)?;

    let query = filter::apply_rest(filter::apply_date_predicate(crate::schema::photos::table.into_boxed(), filter), filter, &ids);
    let query = filter::apply_sort(query, filter.sort);
    let photos = query.offset((page - 1) * per_page).limit(per_page).select(Photo::as_select()).load(conn)?;

    Ok(PhotoPage {
        photos,
        total_count,
        page,
        per_page,
    })
}

/// The rover-scoped `/rovers/{name}/photos` endpoint (§4.6.1): requires
/// exactly one date selector and orders by `(camera_id, id)` rather than the
/// user-supplied `sort`.
pub fn rover_scoped_photos(conn: &mut PgConnection, config: &QueryConfig, filter: &PhotoFilter) -> Result<PhotoPage, Error> {
    if filter.sol.is_none() && filter.earth_date.is_none() {
        return Err(Error::MissingDateSelector);
    }
    let (page, per_page) = resolve_pagination(config, filter.page, filter.per_page)?;
    let ids = resolve_ids(conn, filter)?;

    let count_query = filter::apply_rest(filter::apply_date_predicate(crate::schema::photos::table.into_boxed(), filter), filter, &ids);
    let total_count: i64 = count_query.count().get_result(conn)?;

    let query = filter::apply_rest(filter::apply_date_predicate(crate::schema::photos::table.into_boxed(), filter), filter, &ids);
    let query = filter::apply_rover_scoped_default_order(query);
    let photos = query.offset((page - 1) * per_page).limit(per_page).select(Photo::as_select()).load(conn)?;

    Ok(PhotoPage {
        photos,
        total_count,
        page,
        per_page,
    })
}

/// `latest_photos(rover)` (§4.6.2): substitutes the rover's current max sol
/// into the same search machinery. Not special-cased beyond that
/// substitution — an empty rover (no photos yet) returns an empty page
/// rather than an unfiltered one.
pub fn latest_photos(conn: &mut PgConnection, config: &QueryConfig, rover: &Rover) -> Result<PhotoPage, Error> {
    let Some(max_sol) = repository::rover::max_sol(conn, rover.id)? else {
        return Ok(PhotoPage {
            photos: Vec::new(),
            total_count: 0,
            page: 1,
            per_page: config.default_per_page,
        });
    };
    let filter = PhotoFilter {
        rover_id: Some(rover.id),
        sol: Some(max_sol),
        page: 1,
        ..PhotoFilter::default()
    };
    rover_scoped_photos(conn, config, &filter)
}

pub use repository::photo::ManifestEntry;

/// `manifest(rover)` (§4.6.3): one record per `(sol, earth_date)` observed,
/// with photo count and distinct camera short names.
pub fn manifest(conn: &mut PgConnection, rover: &Rover) -> Result<Vec<ManifestEntry>, Error> {
    repository::photo::manifest(conn, rover.id).map_err(Error::from)
}

pub fn resolve_rover(conn: &mut PgConnection, name: &str) -> Result<Rover, Error> {
    repository::rover::find_rover_by_name(conn, name)?.ok_or_else(|| Error::UnknownRover(name.to_owned()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sort_parses_fixed_allow_list() {
        let sort = Sort::parse("-sol").unwrap();
        assert_eq!(sort.field, SortField::Sol);
        assert_eq!(sort.direction, SortDirection::Desc);

        let sort = Sort::parse("id").unwrap();
        assert_eq!(sort.field, SortField::Id);
        assert_eq!(sort.direction, SortDirection::Asc);

        assert!(Sort::parse("title").is_err());
    }

    #[test]
    fn pagination_rejects_nonpositive_page() {
        let config = QueryConfig {
            default_per_page: 25,
            max_per_page: 1000,
            max_compare_range_sols: 50,
            compare_list_cap: 20,
        };
        assert!(matches!(resolve_pagination(&config, 0, None), Err(Error::InvalidPage)));
        assert_eq!(resolve_pagination(&config, 1, None).unwrap(), (1, 25));
        assert_eq!(resolve_pagination(&config, 1, Some(5000)).unwrap(), (1, 1000));
    }
}
