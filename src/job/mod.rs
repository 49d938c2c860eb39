//! Records every scraper invocation (single sol, bulk, or scheduled sweep)
//! as a `ScraperJob` with one `RoverJobDetail` per rover attempted. Detail
//! rows accumulate in memory over the life of the run and are committed
//! atomically, alongside the job's final status, when the run finishes.

use crate::model::job::{NewRoverJobDetail, NewScraperJob, PhotoSummary, ScraperJobUpdate};
use crate::model::enums::JobStatus;
use crate::repository;
use crate::time::DateTime;
use diesel::PgConnection;
use diesel::QueryResult;

pub struct RoverRun {
    rover_name: String,
    start_sol: i32,
    end_sol: Option<i32>,
    sols_attempted: i32,
    sols_succeeded: i32,
    photos_added: i32,
    failed_sols: Vec<i32>,
    error_message: Option<String>,
    added_photo_summaries: Vec<PhotoSummary>,
    started_at: std::time::Instant,
    duration_ms: i64,
    max_enumerated_items: usize,
}

impl RoverRun {
    fn new(rover_name: &str, start_sol: i32, max_enumerated_items: usize) -> Self {
        Self {
            rover_name: rover_name.to_owned(),
            start_sol,
            end_sol: None,
            sols_attempted: 0,
            sols_succeeded: 0,
            photos_added: 0,
            failed_sols: Vec::new(),
            error_message: None,
            added_photo_summaries: Vec::new(),
            started_at: std::time::Instant::now(),
            duration_ms: 0,
            max_enumerated_items,
        }
    }

    pub fn record_sol(&mut self, sol: i32, inserted: i32, success: bool, error: Option<String>, inserted_ids: &[String]) {
        self.sols_attempted += 1;
        self.end_sol = Some(sol);
        if success {
            self.sols_succeeded += 1;
            self.photos_added += inserted;
            for external_id in inserted_ids {
                if self.added_photo_summaries.len() < self.max_enumerated_items {
                    self.added_photo_summaries.push(PhotoSummary {
                        sol,
                        external_id: external_id.clone(),
                    });
                }
            }
        } else {
            if self.failed_sols.len() < self.max_enumerated_items {
                self.failed_sols.push(sol);
            }
            if self.error_message.is_none() {
                self.error_message = error;
            }
        }
    }

    fn status(&self) -> JobStatus {
        match (self.sols_succeeded, self.sols_attempted) {
            (succeeded, attempted) if succeeded == attempted && attempted > 0 => JobStatus::Success,
            (0, attempted) if attempted > 0 => JobStatus::Failed,
            _ => JobStatus::Partial,
        }
    }

    fn finish(mut self) -> NewRoverJobDetailOwned {
        self.duration_ms = self.started_at.elapsed().as_millis() as i64;
        let status = self.status();
        NewRoverJobDetailOwned {
            rover_name: self.rover_name,
            start_sol: self.start_sol,
            end_sol: self.end_sol,
            sols_attempted: self.sols_attempted,
            sols_succeeded: self.sols_succeeded,
            photos_added: self.photos_added,
            failed_sols: self.failed_sols,
            error_message: self.error_message,
            duration_ms: self.duration_ms,
            status,
            added_photo_summaries: self.added_photo_summaries,
        }
    }
}

struct NewRoverJobDetailOwned {
    rover_name: String,
    start_sol: i32,
    end_sol: Option<i32>,
    sols_attempted: i32,
    sols_succeeded: i32,
    photos_added: i32,
    failed_sols: Vec<i32>,
    error_message: Option<String>,
    duration_ms: i64,
    status: JobStatus,
    added_photo_summaries: Vec<PhotoSummary>,
}

pub struct JobRecorder {
    job_id: i64,
    details: Vec<NewRoverJobDetailOwned>,
    max_enumerated_items: usize,
    cancelled_at_sol: Option<i32>,
}

impl JobRecorder {
    pub fn start(conn: &mut PgConnection, max_enumerated_items: usize) -> QueryResult<Self> {
        let job = repository::job::create_job(conn, &NewScraperJob { started_at: DateTime::now() })?;
        Ok(Self {
            job_id: job.id,
            details: Vec::new(),
            max_enumerated_items,
            cancelled_at_sol: None,
        })
    }

    pub fn job_id(&self) -> i64 {
        self.job_id
    }

    pub fn begin_rover(&self, rover_name: &str, start_sol: i32) -> RoverRun {
        RoverRun::new(rover_name, start_sol, self.max_enumerated_items)
    }

    pub fn finish_rover(&mut self, run: RoverRun) {
        self.details.push(run.finish());
    }

    pub fn mark_cancelled(&mut self, sol: i32) {
        self.cancelled_at_sol = Some(sol);
    }

    /// Commits the job's overall status and every accumulated per-rover
    /// detail in one transaction. Overall status is `partial` if cancelled
    /// or if any rover is partial/failed while at least one succeeded;
    /// `failed` if every rover failed; `success` otherwise.
    pub fn commit(self, conn: &mut PgConnection) -> QueryResult<()> {
        let total_rovers_attempted = self.details.len() as i32;
        let total_rovers_succeeded = self.details.iter().filter(|d| d.status == JobStatus::Success).count() as i32;
        let total_photos_added = self.details.iter().map(|d| d.photos_added).sum();

        let status = if self.cancelled_at_sol.is_some() {
            JobStatus::Partial
        } else if total_rovers_succeeded == total_rovers_attempted && total_rovers_attempted > 0 {
            JobStatus::Success
        } else if total_rovers_succeeded == 0 {
            JobStatus::Failed
        } else {
            JobStatus::Partial
        };

        let update = ScraperJobUpdate {
            finished_at: Some(DateTime::now()),
            status,
            total_rovers_attempted,
            total_rovers_succeeded,
            total_photos_added,
            cancelled_at_sol: self.cancelled_at_sol,
        };

        let details: Vec<NewRoverJobDetail> = self
            .details
            .iter()
            .map(|detail| NewRoverJobDetail {
                job_id: self.job_id,
                rover_name: &detail.rover_name,
                start_sol: detail.start_sol,
                end_sol: detail.end_sol,
                sols_attempted: detail.sols_attempted,
                sols_succeeded: detail.sols_succeeded,
                photos_added: detail.photos_added,
                failed_sols: detail.failed_sols.clone(),
                error_message: detail.error_message.as_deref(),
                duration_ms: detail.duration_ms,
                status: detail.status,
                added_photo_summaries: serde_json::to_value(&detail.added_photo_summaries).unwrap_or(serde_json::Value::Null),
            })
            .collect();

        repository::job::record_job(conn, self.job_id, &update, &details)
    }
}
