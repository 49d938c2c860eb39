//! Shared harness for integration tests: a disposable `__test` database that
//! gets dropped and recreated once per test binary, seeded with a handful of
//! rovers, cameras, and photos, and exposed through a cached `AppState` the
//! rest of the test suite can share.

use crate::app::AppState;
use crate::config;
use crate::db::{self, ConnectionPool, ConnectionResult};
use crate::model::camera::NewCamera;
use crate::model::enums::RoverStatus;
use crate::model::photo::NewPhoto;
use crate::schema::{cameras, photos, rovers};
use crate::time::DateTime;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use serde_json::json;
use std::sync::{Mutex, MutexGuard};

static TEST_STATE: Mutex<Option<AppState>> = Mutex::new(None);

/// Returns a connection to the shared test database, creating it on first use.
pub fn get_connection() -> ConnectionResult {
    get_state().connection_pool.get()
}

/// Returns the shared test `AppState`, building the database the first time
/// a test asks for it.
pub fn get_state() -> AppState {
    let mut guard = get_state_guard();
    match guard.as_ref() {
        Some(state) => state.clone(),
        None => {
            let state = recreate_database();
            *guard = Some(state.clone());
            state
        }
    }
}

/// Forces the next call to `get_state`/`get_connection` to rebuild the
/// database from scratch. Tests that mutate rows they don't own (bulk
/// ingests, job history) should call this afterwards.
pub fn reset_database() {
    *get_state_guard() = None;
}

fn get_state_guard() -> MutexGuard<'static, Option<AppState>> {
    match TEST_STATE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            eprintln!("Test database lock was poisoned, resetting");
            let mut guard = poisoned.into_inner();
            *guard = None;
            guard
        }
    }
}

const TEST_DATABASE: &str = "__test";

fn recreate_database() -> AppState {
    {
        let mut admin_conn = db::get_prod_connection().expect("must connect to the configured database");
        diesel::sql_query(format!("DROP DATABASE IF EXISTS {TEST_DATABASE}"))
            .execute(&mut admin_conn)
            .expect("must be able to drop the test database");
        diesel::sql_query(format!("CREATE DATABASE {TEST_DATABASE}"))
            .execute(&mut admin_conn)
            .expect("must be able to create the test database");
    }

    let pool = build_test_pool();
    let mut conn = pool.get().expect("must connect to the freshly created test database");
    db::run_migrations(&mut conn);
    populate_database(&mut conn).expect("test fixtures must insert cleanly");

    AppState::new(pool, config::load())
}

fn build_test_pool() -> ConnectionPool {
    let test_url = config::database_url().replacen(
        &std::env::var("POSTGRES_DB").expect("POSTGRES_DB must be set"),
        TEST_DATABASE,
        1,
    );
    Pool::builder()
        .max_size(1)
        .max_lifetime(None)
        .idle_timeout(None)
        .test_on_check_out(true)
        .build(ConnectionManager::<PgConnection>::new(test_url))
        .expect("test connection pool must be constructible")
}

/// Test fixture rovers, in insertion order. Curiosity and Perseverance stand
/// in for the JSON-feed upstream, Opportunity for the PDS upstream.
pub const CURIOSITY: &str = "curiosity";
pub const PERSEVERANCE: &str = "perseverance";
pub const OPPORTUNITY: &str = "opportunity";

fn populate_database(conn: &mut PgConnection) -> QueryResult<()> {
    let curiosity_id = insert_rover(conn, CURIOSITY, RoverStatus::Active, (2012, 8, 6))?;
    let perseverance_id = insert_rover(conn, PERSEVERANCE, RoverStatus::Active, (2021, 2, 18))?;
    let opportunity_id = insert_rover(conn, OPPORTUNITY, RoverStatus::Complete, (2004, 1, 25))?;

    let curiosity_fhaz = insert_camera(conn, curiosity_id, "FHAZ", "Front Hazard Avoidance Camera")?;
    let curiosity_mast = insert_camera(conn, curiosity_id, "MAST", "Mast Camera")?;
    let perseverance_navcam = insert_camera(conn, perseverance_id, "NAVCAM", "Navigation Camera")?;
    let opportunity_pancam = insert_camera(conn, opportunity_id, "PANCAM", "Panoramic Camera")?;

    let landing = DateTime::from_date(2012, 8, 6).unwrap();
    let photos = vec![
        NewPhoto::new("cur-1000", curiosity_id, curiosity_fhaz, 1000, landing.plus_sols(1000), landing.plus_sols(1000), json!({"id": "cur-1000"})),
        NewPhoto::new("cur-1001", curiosity_id, curiosity_mast, 1000, landing.plus_sols(1000), landing.plus_sols(1000), json!({"id": "cur-1001"})),
        NewPhoto::new("cur-1002", curiosity_id, curiosity_fhaz, 1001, landing.plus_sols(1001), landing.plus_sols(1001), json!({"id": "cur-1002"})),
        NewPhoto::new("per-1", perseverance_id, perseverance_navcam, 50, landing.plus_sols(50), landing.plus_sols(50), json!({"id": "per-1"})),
        NewPhoto::new("opp-1", opportunity_id, opportunity_pancam, 10, landing.plus_sols(10), landing.plus_sols(10), json!({"id": "opp-1"})),
    ];
    diesel::insert_into(photos::table).values(&photos).execute(conn)?;
    Ok(())
}

fn insert_rover(conn: &mut PgConnection, name: &str, status: RoverStatus, launch_ymd: (i32, u8, u8)) -> QueryResult<i64> {
    let launch_date = DateTime::from_date(launch_ymd.0, launch_ymd.1, launch_ymd.2).unwrap();
    diesel::insert_into(rovers::table)
        .values((
            rovers::name.eq(name),
            rovers::landing_date.eq(launch_date),
            rovers::launch_date.eq(launch_date),
            rovers::status.eq(status),
        ))
        .returning(rovers::id)
        .get_result(conn)
}

fn insert_camera(conn: &mut PgConnection, rover_id: i64, short_name: &str, full_name: &str) -> QueryResult<i64> {
    diesel::insert_into(cameras::table)
        .values(&NewCamera { rover_id, short_name, full_name })
        .returning(cameras::id)
        .get_result(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository;

    #[test]
    fn seeds_expected_rover_count() {
        let mut conn = get_connection().unwrap();
        let rovers = repository::rover::all_rovers(&mut conn).unwrap();
        assert_eq!(rovers.len(), 3);
    }

    #[test]
    fn seeds_curiosity_with_two_cameras() {
        let mut conn = get_connection().unwrap();
        let curiosity = repository::rover::find_rover_by_name(&mut conn, CURIOSITY).unwrap().unwrap();
        let max_sol = repository::rover::max_sol(&mut conn, curiosity.id).unwrap();
        assert_eq!(max_sol, Some(1001));
    }
}
