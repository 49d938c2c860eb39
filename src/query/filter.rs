//! Boxed-query filter helpers for the photo search. Unlike the teacher's
//! `search::filter`, these are not generic over `Column` — the query engine
//! accepts a fixed, named parameter set (§4.6.1) rather than a free-form
//! query grammar (the legacy Mars-photos API this crate stays bit-compatible
//! with never exposed that grammar), so each filter is written directly
//! against the `photos` table instead of through a `Criteria<T>` parser.

use super::{PhotoFilter, ResolvedIds, Sort, SortDirection, SortField};
use crate::schema::photos;
use diesel::dsl::IntoBoxed;
use diesel::pg::Pg;
use diesel::pg::expression::expression_methods::PgTextExpressionMethods;
use diesel::prelude::*;

pub type BoxedPhotoQuery<'a> = IntoBoxed<'a, photos::table, Pg>;

/// Phase 1 (§4.6.1): the date predicate. `sol` wins when both `sol` and
/// `earth_date` are present. Neither present is a no-op, which is the
/// cross-rover search endpoint's contract — only the rover-scoped endpoint
/// requires one of the two ahead of this call.
pub fn apply_date_predicate(query: BoxedPhotoQuery<'_>, filter: &PhotoFilter) -> BoxedPhotoQuery<'_> {
    if let Some(sol) = filter.sol {
        query.filter(photos::sol.eq(sol))
    } else if let Some(earth_date) = filter.earth_date {
        query.filter(photos::earth_date.eq(earth_date))
    } else {
        query
    }
}

/// Phase 2 plus every remaining fixed parameter. Applying these on top of an
/// empty phase-1 result set is a no-op in plain SQL — conjoining predicates
/// this way already satisfies "do not apply the camera filter if the date
/// phase yields nothing" without a second round-trip.
pub fn apply_rest<'a>(mut query: BoxedPhotoQuery<'a>, filter: &PhotoFilter, ids: &ResolvedIds) -> BoxedPhotoQuery<'a> {
    if let Some(rover_id) = ids.rover_id {
        query = query.filter(photos::rover_id.eq(rover_id));
    }
    if let Some(rover_ids) = &ids.rover_ids {
        query = query.filter(photos::rover_id.eq_any(rover_ids.clone()));
    }
    if let Some(camera_ids) = &ids.camera_ids {
        query = query.filter(photos::camera_id.eq_any(camera_ids.clone()));
    }
    if let Some(sol_min) = filter.sol_min {
        query = query.filter(photos::sol.ge(sol_min));
    }
    if let Some(sol_max) = filter.sol_max {
        query = query.filter(photos::sol.lt(sol_max));
    }
    if let Some(date_min) = filter.date_min {
        query = query.filter(photos::earth_date.ge(date_min));
    }
    if let Some(date_max) = filter.date_max {
        query = query.filter(photos::earth_date.lt(date_max));
    }
    if let Some(nasa_id) = &filter.nasa_id {
        query = query.filter(photos::external_id.ilike(format!("%{nasa_id}%")));
    }
    if let Some(site) = filter.site {
        query = query.filter(photos::site.eq(site));
    }
    if let Some(drive) = filter.drive {
        query = query.filter(photos::drive.eq(drive));
    }
    if let Some(sample_type) = &filter.sample_type {
        query = query.filter(photos::sample_type.eq(sample_type.clone()));
    }
    query
}

pub fn apply_sort(query: BoxedPhotoQuery<'_>, sort: Sort) -> BoxedPhotoQuery<'_> {
    match (sort.field, sort.direction) {
        (SortField::Id, SortDirection::Asc) => query.order(photos::id.asc()),
        (SortField::Id, SortDirection::Desc) => query.order(photos::id.desc()),
        (SortField::Sol, SortDirection::Asc) => query.order(photos::sol.asc().then_order_by(photos::id.asc())),
        (SortField::Sol, SortDirection::Desc) => query.order(photos::sol.desc().then_order_by(photos::id.asc())),
        (SortField::EarthDate, SortDirection::Asc) => query.order(photos::earth_date.asc().then_order_by(photos::id.asc())),
        (SortField::EarthDate, SortDirection::Desc) => query.order(photos::earth_date.desc().then_order_by(photos::id.asc())),
    }
}

/// The rover-scoped endpoints' canonical order (§4.6.1), independent of the
/// user-supplied `sort` the generic search endpoint honors.
pub fn apply_rover_scoped_default_order(query: BoxedPhotoQuery<'_>) -> BoxedPhotoQuery<'_> {
    query.order(photos::camera_id.asc().then_order_by(photos::id.asc()))
}

#[cfg(test)]
mod test {
    use super::super::{PhotoFilter, ResolvedIds};
    use super::*;

    #[test]
    fn date_predicate_prefers_sol_over_earth_date() {
        let filter = PhotoFilter {
            sol: Some(5),
            earth_date: Some(crate::time::DateTime::now()),
            ..PhotoFilter::default()
        };
        // Smoke test: building the query must not panic regardless of which
        // branch wins; the `sol` precedence itself is exercised by the
        // query-engine integration tests in `query::test`.
        let query = photos::table.into_boxed();
        let _ = apply_date_predicate(query, &filter);
        let _ = ResolvedIds::default();
    }
}
