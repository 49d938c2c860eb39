use crate::model::job::{NewRoverJobDetail, NewScraperJob, RoverJobDetail, ScraperJob, ScraperJobUpdate};
use crate::schema::{rover_job_details, scraper_jobs};
use diesel::prelude::*;

pub fn create_job(conn: &mut PgConnection, new_job: &NewScraperJob) -> QueryResult<ScraperJob> {
    diesel::insert_into(scraper_jobs::table)
        .values(new_job)
        .get_result(conn)
}

/// Commits the job's final status and a `RoverJobDetail` row per rover
/// attempted, in a single transaction. Called once, at job completion.
pub fn record_job(conn: &mut PgConnection, job_id: i64, update: &ScraperJobUpdate, details: &[NewRoverJobDetail]) -> QueryResult<()> {
    conn.transaction(|conn| {
        diesel::update(scraper_jobs::table.find(job_id)).set(update).execute(conn)?;
        diesel::insert_into(rover_job_details::table)
            .values(details)
            .execute(conn)?;
        Ok(())
    })
}

pub fn list_jobs(conn: &mut PgConnection, limit: i64) -> QueryResult<Vec<ScraperJob>> {
    scraper_jobs::table
        .select(ScraperJob::as_select())
        .order(scraper_jobs::started_at.desc())
        .limit(limit)
        .load(conn)
}

pub fn find_job(conn: &mut PgConnection, job_id: i64) -> QueryResult<Option<ScraperJob>> {
    scraper_jobs::table.find(job_id).select(ScraperJob::as_select()).first(conn).optional()
}

pub fn job_details(conn: &mut PgConnection, job_id: i64) -> QueryResult<Vec<RoverJobDetail>> {
    rover_job_details::table
        .filter(rover_job_details::job_id.eq(job_id))
        .select(RoverJobDetail::as_select())
        .load(conn)
}

/// The most recent detail row recorded for `rover_name`, used by the
/// `/scraper/{rover}/progress` admin endpoint.
pub fn latest_rover_detail(conn: &mut PgConnection, rover_name: &str) -> QueryResult<Option<RoverJobDetail>> {
    rover_job_details::table
        .filter(rover_job_details::rover_name.eq(rover_name))
        .order(rover_job_details::id.desc())
        .select(RoverJobDetail::as_select())
        .first(conn)
        .optional()
}
