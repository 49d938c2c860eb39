//! The bulk-ingest pipeline: the algorithmic core shared by every scraper.
//! Pre-loads a skip-set of known external ids, resolves each candidate's
//! camera, batches rows into transactional flushes, and reports per-sol/
//! per-batch counts for the job recorder.

use crate::config::IngestConfig;
use crate::model::photo::NewPhoto;
use crate::repository;
use crate::time::DateTime;
use diesel::PgConnection;
use diesel::QueryResult;
use serde_json::Value;
use std::collections::HashSet;
use tracing::info;

/// A photo as produced by a scraper, before camera resolution. Carries
/// `camera_short_name` instead of `camera_id`; the pipeline resolves (and,
/// if necessary, auto-creates) the camera row as each candidate is ingested.
pub struct Candidate {
    pub external_id: String,
    pub camera_short_name: String,
    pub sol: i32,
    pub earth_date: DateTime,
    pub taken_utc: DateTime,
    pub raw: Value,
    pub build: Box<dyn FnOnce(NewPhoto) -> NewPhoto>,
}

impl Candidate {
    pub fn new(external_id: impl Into<String>, camera_short_name: impl Into<String>, sol: i32, earth_date: DateTime, taken_utc: DateTime, raw: Value) -> Self {
        Self {
            external_id: external_id.into(),
            camera_short_name: camera_short_name.into(),
            sol,
            earth_date,
            taken_utc,
            raw,
            build: Box::new(|photo| photo),
        }
    }

    /// Applies extra fields (image URLs, telemetry, …) once the photo's
    /// `rover_id`/`camera_id` are known, without every scraper needing to
    /// know about camera resolution itself.
    pub fn enrich(mut self, f: impl FnOnce(NewPhoto) -> NewPhoto + 'static) -> Self {
        self.build = Box::new(f);
        self
    }
}

#[derive(Default, Clone, Copy)]
pub struct SolOutcome {
    pub inserted: i32,
    pub skipped: i32,
}

/// Owns the in-memory skip-set and intra-batch pending set for one bulk
/// run; its lifetime equals the run (§4.7, §4.8).
pub struct Ingester<'c> {
    conn: &'c mut PgConnection,
    rover_id: i64,
    config: IngestConfig,
    skip_set: HashSet<String>,
    camera_cache: std::collections::HashMap<String, i64>,
    pending: Vec<NewPhoto>,
    rows_since_progress_log: usize,
    total_inserted: i64,
}

impl<'c> Ingester<'c> {
    pub fn new(conn: &'c mut PgConnection, rover_id: i64, config: IngestConfig) -> QueryResult<Self> {
        let skip_set = repository::photo::all_external_ids(conn, rover_id)?;
        Ok(Self {
            conn,
            rover_id,
            config,
            skip_set,
            camera_cache: std::collections::HashMap::new(),
            pending: Vec::new(),
            rows_since_progress_log: 0,
            total_inserted: 0,
        })
    }

    fn resolve_camera(&mut self, short_name: &str) -> QueryResult<i64> {
        if let Some(id) = self.camera_cache.get(short_name) {
            return Ok(*id);
        }
        let camera = repository::camera::find_or_create_camera(self.conn, self.rover_id, short_name)?;
        self.camera_cache.insert(short_name.to_owned(), camera.id);
        Ok(camera.id)
    }

    /// Feeds one candidate through normalize/skip/resolve-camera/attach.
    /// Flushes the pending batch once it reaches `config.batch_size`.
    pub fn ingest_one(&mut self, candidate: Candidate) -> QueryResult<bool> {
        if self.skip_set.contains(&candidate.external_id) || self.pending.iter().any(|p| p.external_id == candidate.external_id) {
            return Ok(false);
        }

        let camera_id = self.resolve_camera(&candidate.camera_short_name)?;
        let base = NewPhoto::new(
            candidate.external_id.clone(),
            self.rover_id,
            camera_id,
            candidate.sol,
            candidate.earth_date,
            candidate.taken_utc,
            candidate.raw,
        );
        self.pending.push((candidate.build)(base));

        if self.pending.len() >= self.config.batch_size {
            self.flush()?;
        }
        Ok(true)
    }

    fn flush(&mut self) -> QueryResult<Vec<String>> {
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }
        let inserted_ids = repository::photo::add_photos(self.conn, &self.pending)?;
        self.pending.clear();
        self.total_inserted += inserted_ids.len() as i64;
        self.rows_since_progress_log += inserted_ids.len();
        for external_id in &inserted_ids {
            self.skip_set.insert(external_id.clone());
        }
        if self.rows_since_progress_log >= self.config.progress_interval {
            info!("ingested {} rows so far for rover {}", self.total_inserted, self.rover_id);
            self.rows_since_progress_log = 0;
        }
        Ok(inserted_ids)
    }

    /// Processes every candidate for one sol, then forces a flush so the
    /// caller gets an accurate `{inserted, skipped}` outcome and the list of
    /// external ids actually inserted (for the job recorder's summaries).
    /// `skipped` counts distinct external ids, not candidate occurrences —
    /// a feed that repeats the same id twice in one sol must not inflate the
    /// skip count beyond the number of ids actually skipped (§4.8).
    pub fn ingest_sol(&mut self, candidates: impl IntoIterator<Item = Candidate>) -> QueryResult<(SolOutcome, Vec<String>)> {
        let mut skipped_ids = HashSet::new();
        for candidate in candidates {
            let external_id = candidate.external_id.clone();
            if !self.ingest_one(candidate)? {
                skipped_ids.insert(external_id);
            }
        }
        let inserted_ids = self.flush()?;
        let outcome = SolOutcome {
            inserted: inserted_ids.len() as i32,
            skipped: skipped_ids.len() as i32,
        };
        Ok((outcome, inserted_ids))
    }

    /// Flushes any remaining pending rows. Must be called once the
    /// candidate stream (or cancellation) ends.
    pub fn finish(mut self) -> QueryResult<i64> {
        self.flush()?;
        Ok(self.total_inserted)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn candidate_enrich_applies_build_function() {
        let now = DateTime::now();
        let candidate = Candidate::new("abc", "FHAZ", 1, now, now, Value::Null)
            .enrich(|photo| photo.with_telemetry(Some(1.0), Some(2.0), None));
        let photo = (candidate.build)(NewPhoto::new("abc", 1, 1, 1, now, now, Value::Null));
        assert_eq!(photo.mast_az, Some(1.0));
    }
}
