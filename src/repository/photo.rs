use crate::model::photo::{NewPhoto, Photo};
use crate::schema::photos;
use crate::time::DateTime;
use diesel::prelude::*;
use std::collections::HashSet;

/// Returns the subset of `ids` already present for `rover_id`. Used to build
/// the in-memory skip-set at the start of a bulk run (§4.8).
pub fn existing_external_ids(conn: &mut PgConnection, rover_id: i64, ids: &[String]) -> QueryResult<HashSet<String>> {
    photos::table
        .filter(photos::rover_id.eq(rover_id))
        .filter(photos::external_id.eq_any(ids))
        .select(photos::external_id)
        .load(conn)
        .map(|rows: Vec<String>| rows.into_iter().collect())
}

/// Loads every external id already known for `rover_id`. Used by the PDS
/// volume scraper, which preloads the whole skip-set once per volume
/// instead of paying per-row lookups (§4.4.3).
pub fn all_external_ids(conn: &mut PgConnection, rover_id: i64) -> QueryResult<HashSet<String>> {
    photos::table
        .filter(photos::rover_id.eq(rover_id))
        .select(photos::external_id)
        .load(conn)
        .map(|rows: Vec<String>| rows.into_iter().collect())
}

/// Inserts `batch` in a single statement; rows whose `external_id` collides
/// with an existing row are dropped via `ON CONFLICT DO NOTHING` while the
/// rest of the batch still commits. Returns the external ids that were
/// actually inserted, so the caller can update its skip-set precisely.
pub fn add_photos(conn: &mut PgConnection, batch: &[NewPhoto]) -> QueryResult<Vec<String>> {
    if batch.is_empty() {
        return Ok(Vec::new());
    }
    diesel::insert_into(photos::table)
        .values(batch)
        .on_conflict(photos::external_id)
        .do_nothing()
        .returning(photos::external_id)
        .get_results(conn)
}

/// External ids already stored for one rover/sol. Used by the NASA-compare
/// diagnostics (§4.6.4) to build the "ours" side of a sol comparison.
pub fn external_ids_for_sol(conn: &mut PgConnection, rover_id: i64, sol: i32) -> QueryResult<HashSet<String>> {
    photos::table
        .filter(photos::rover_id.eq(rover_id))
        .filter(photos::sol.eq(sol))
        .select(photos::external_id)
        .load(conn)
        .map(|rows: Vec<String>| rows.into_iter().collect())
}

/// Looks up a single photo by its upstream id, used by the NASA-compare
/// per-photo diagnostic to fetch the stored raw record.
pub fn find_by_external_id(conn: &mut PgConnection, rover_id: i64, external_id: &str) -> QueryResult<Option<Photo>> {
    photos::table
        .filter(photos::rover_id.eq(rover_id))
        .filter(photos::external_id.eq(external_id))
        .select(Photo::as_select())
        .first(conn)
        .optional()
}

pub fn latest_photos(conn: &mut PgConnection, rover_id: i64) -> QueryResult<Vec<Photo>> {
    let max_sol: Option<i32> = photos::table
        .filter(photos::rover_id.eq(rover_id))
        .select(diesel::dsl::max(photos::sol))
        .first(conn)?;
    let Some(max_sol) = max_sol else {
        return Ok(Vec::new());
    };
    photos::table
        .filter(photos::rover_id.eq(rover_id))
        .filter(photos::sol.eq(max_sol))
        .order(photos::camera_id.asc().then_order_by(photos::id.asc()))
        .select(Photo::as_select())
        .load(conn)
}

pub struct ManifestEntry {
    pub sol: i32,
    pub earth_date: DateTime,
    pub count: i64,
    pub cameras: Vec<String>,
}

/// One record per `(sol, earth_date)` the rover has photographed, sorted by
/// sol ascending, each carrying the photo count and the distinct camera
/// short names observed at that sol.
pub fn manifest(conn: &mut PgConnection, rover_id: i64) -> QueryResult<Vec<ManifestEntry>> {
    use crate::schema::cameras;

    let rows: Vec<(i32, DateTime, String)> = photos::table
        .inner_join(cameras::table)
        .filter(photos::rover_id.eq(rover_id))
        .select((photos::sol, photos::earth_date, cameras::short_name))
        .order(photos::sol.asc())
        .load(conn)?;

    let mut entries: Vec<ManifestEntry> = Vec::new();
    for (sol, earth_date, camera) in rows {
        match entries.last_mut() {
            Some(entry) if entry.sol == sol => {
                entry.count += 1;
                if !entry.cameras.contains(&camera) {
                    entry.cameras.push(camera);
                }
            }
            _ => entries.push(ManifestEntry {
                sol,
                earth_date,
                count: 1,
                cameras: vec![camera],
            }),
        }
    }
    Ok(entries)
}
