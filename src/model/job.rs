use crate::model::enums::JobStatus;
use crate::schema::{rover_job_details, scraper_jobs};
use crate::time::DateTime;
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::Serialize;
use serde_json::Value;

#[derive(Insertable)]
#[diesel(table_name = scraper_jobs)]
#[diesel(check_for_backend(Pg))]
pub struct NewScraperJob {
    pub started_at: DateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = scraper_jobs)]
#[diesel(check_for_backend(Pg))]
pub struct ScraperJobUpdate {
    pub finished_at: Option<DateTime>,
    pub status: JobStatus,
    pub total_rovers_attempted: i32,
    pub total_rovers_succeeded: i32,
    pub total_photos_added: i32,
    pub cancelled_at_sol: Option<i32>,
}

/// One invocation of the scraper subsystem (single-sol, bulk, or scheduled
/// sweep), kept as an audit trail after completion. The job-history API
/// pages over this table directly.
#[derive(Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = scraper_jobs)]
#[diesel(check_for_backend(Pg))]
pub struct ScraperJob {
    pub id: i64,
    pub started_at: DateTime,
    pub finished_at: Option<DateTime>,
    pub status: JobStatus,
    pub total_rovers_attempted: i32,
    pub total_rovers_succeeded: i32,
    pub total_photos_added: i32,
    pub cancelled_at_sol: Option<i32>,
}

/// A bounded `{sol, external_id}` pair recorded for observability; stored as
/// `added_photo_summaries` JSON arrays, capped at `config.job_history.max_enumerated_items`.
#[derive(Clone, Serialize, serde::Deserialize)]
pub struct PhotoSummary {
    pub sol: i32,
    pub external_id: String,
}

#[derive(Insertable)]
#[diesel(table_name = rover_job_details)]
#[diesel(check_for_backend(Pg))]
pub struct NewRoverJobDetail<'a> {
    pub job_id: i64,
    pub rover_name: &'a str,
    pub start_sol: i32,
    pub end_sol: Option<i32>,
    pub sols_attempted: i32,
    pub sols_succeeded: i32,
    pub photos_added: i32,
    pub failed_sols: Vec<i32>,
    pub error_message: Option<&'a str>,
    pub duration_ms: i64,
    pub status: JobStatus,
    pub added_photo_summaries: Value,
}

/// Per-rover outcome within a job: sol range attempted, success/failure
/// counts, and a capped list of failed sols and added-photo summaries.
#[derive(Associations, Clone, Identifiable, Queryable, Selectable)]
#[diesel(belongs_to(ScraperJob, foreign_key = job_id))]
#[diesel(table_name = rover_job_details)]
#[diesel(check_for_backend(Pg))]
pub struct RoverJobDetail {
    pub id: i64,
    pub job_id: i64,
    pub rover_name: String,
    pub start_sol: i32,
    pub end_sol: Option<i32>,
    pub sols_attempted: i32,
    pub sols_succeeded: i32,
    pub photos_added: i32,
    pub failed_sols: Vec<i32>,
    pub error_message: Option<String>,
    pub duration_ms: i64,
    pub status: JobStatus,
    pub added_photo_summaries: Value,
}
