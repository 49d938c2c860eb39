//! Per-rover scraper adapters. Each adapter translates one upstream
//! representation into [`crate::ingest::Candidate`] values and feeds them
//! through the shared ingest pipeline; selection is a keyed match over the
//! lowercased rover name, never a dynamically-populated registry.

pub mod common;
pub mod curiosity;
pub mod pds_volume;
pub mod perseverance;

use crate::config::{Config, IngestConfig};
use crate::job::{JobRecorder, RoverRun};
use crate::model::rover::Rover;
use crate::repository;
use crate::resilience::ResilientClient;
use async_trait::async_trait;
use diesel::PgConnection;
use diesel::QueryResult;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Resilience(#[from] crate::resilience::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Parse(#[from] crate::pds::ParseError),
    #[error(transparent)]
    Query(#[from] diesel::result::Error),
}

/// Outcome of ingesting exactly one sol, per §4.4: `{sol, inserted, skipped}`.
/// Success/failure is conveyed by the surrounding `Result`, not this struct.
pub struct SolOutcome {
    pub sol: i32,
    pub inserted: i32,
    pub skipped: i32,
    pub inserted_ids: Vec<String>,
}

/// Bundles everything a scraper needs to reach the database and the network
/// without every trait method growing a long parameter list.
pub struct ScraperContext<'a> {
    pub conn: &'a mut PgConnection,
    pub client: &'a ResilientClient,
    pub ingest_config: IngestConfig,
}

/// The capability set every rover adapter implements (§4.4). `bulk_scrape`
/// writes its outcome directly into the caller's `RoverRun` rather than
/// returning a separate summary, since JSON-feed scrapers record one entry
/// per sol while the PDS volume scraper reports one aggregate entry for the
/// whole sol range it scans.
#[async_trait]
pub trait Scraper: Send + Sync {
    fn rover_name(&self) -> &'static str;

    async fn scrape_sol(&self, ctx: &mut ScraperContext<'_>, rover: &Rover, sol: i32) -> Result<SolOutcome, Error>;

    async fn bulk_scrape(&self, ctx: &mut ScraperContext<'_>, rover: &Rover, start: i32, end: i32, run: &mut RoverRun) -> Result<(), Error>;

    /// The external ids upstream reports for one sol, with no database
    /// connection and no ingestion — used only by the NASA-compare
    /// diagnostics (§4.6.4) to fetch a live comparison set.
    async fn upstream_ids(&self, client: &ResilientClient, sol: i32) -> Result<Vec<String>, Error>;

    /// The raw upstream record for one external id at one sol, or `None` if
    /// upstream no longer reports it. Used only by the per-photo
    /// NASA-compare diagnostic.
    async fn upstream_record(&self, client: &ResilientClient, sol: i32, external_id: &str) -> Result<Option<serde_json::Value>, Error>;
}

/// Keyed registry mapping a lowercase rover name to its scraper. An unknown
/// key is a caller error (400 at the API boundary), never a panic. Takes
/// `config` so each scraper is built from the one `Config` loaded at
/// startup rather than re-reading `config.toml` itself.
pub fn registry(rover_name: &str, config: &Config) -> Option<Box<dyn Scraper>> {
    match rover_name.to_lowercase().as_str() {
        "curiosity" => Some(Box::new(curiosity::CuriosityScraper::new(config)?)),
        "perseverance" => Some(Box::new(perseverance::PerseveranceScraper::new(config)?)),
        "opportunity" => Some(Box::new(pds_volume::PdsVolumeScraper::opportunity(config)?)),
        "spirit" => Some(Box::new(pds_volume::PdsVolumeScraper::spirit(config)?)),
        _ => None,
    }
}

/// Runs a single sol for `rover`, recording a one-rover job. Used by
/// `POST /scraper/{rover}?sol=N`. Callers resolve `scraper`/`rover` first
/// (via [`registry`] / [`crate::repository::rover::find_rover_by_name`]) so
/// an unknown rover name surfaces as [`crate::query::Error::UnknownRover`]
/// at the API boundary instead of a query-layer error here.
pub async fn run_sol(conn: &mut PgConnection, config: &Config, client: &ResilientClient, scraper: &dyn Scraper, rover: &Rover, sol: i32) -> Result<i64, Error> {
    let mut recorder = JobRecorder::start(conn, config.job_history.max_enumerated_items)?;
    let mut run = recorder.begin_rover(scraper.rover_name(), sol);
    let mut ctx = ScraperContext {
        conn,
        client,
        ingest_config: config.ingest.clone(),
    };
    match scraper.scrape_sol(&mut ctx, rover, sol).await {
        Ok(outcome) => run.record_sol(sol, outcome.inserted, true, None, &outcome.inserted_ids),
        Err(err) => {
            warn!("sol {sol} failed for {}: {err}", scraper.rover_name());
            run.record_sol(sol, 0, false, Some(err.to_string()), &[]);
        }
    }
    recorder.finish_rover(run);
    recorder.commit(ctx.conn)?;
    Ok(recorder.job_id())
}

/// Runs `[start, end]` for `rover` as a single job. Used by
/// `POST /scraper/{rover}/bulk?startSol=A&endSol=B`.
pub async fn run_bulk(conn: &mut PgConnection, config: &Config, client: &ResilientClient, scraper: &dyn Scraper, rover: &Rover, start: i32, end: i32) -> Result<i64, Error> {
    let mut recorder = JobRecorder::start(conn, config.job_history.max_enumerated_items)?;
    let mut run = recorder.begin_rover(scraper.rover_name(), start);
    let mut ctx = ScraperContext {
        conn,
        client,
        ingest_config: config.ingest.clone(),
    };
    if let Err(err) = scraper.bulk_scrape(&mut ctx, rover, start, end, &mut run).await {
        warn!("bulk scrape {start}..={end} failed for {}: {err}", scraper.rover_name());
    }
    recorder.finish_rover(run);
    recorder.commit(ctx.conn)?;
    Ok(recorder.job_id())
}

/// Runs one named PDS volume for `rover` as its own job. Used by `POST
/// /scraper/opportunity/volume/{volumeName}` (and the Spirit equivalent);
/// bypasses [`run_bulk`] since a volume has no `(start, end)` sol range.
pub async fn run_volume(conn: &mut PgConnection, config: &Config, client: &ResilientClient, scraper: &pds_volume::PdsVolumeScraper, rover: &Rover, volume_name: &str) -> Result<i64, Error> {
    let mut recorder = JobRecorder::start(conn, config.job_history.max_enumerated_items)?;
    let mut run = recorder.begin_rover(scraper.rover_name(), 0);
    let mut ctx = ScraperContext {
        conn,
        client,
        ingest_config: config.ingest.clone(),
    };
    if let Err(err) = scraper.scrape_named_volume(&mut ctx, rover, volume_name, &mut run).await {
        warn!("volume {volume_name} failed for {}: {err}", scraper.rover_name());
    }
    recorder.finish_rover(run);
    recorder.commit(ctx.conn)?;
    Ok(recorder.job_id())
}

/// Runs every configured PDS volume for `rover` as a single job. Used by
/// `POST /scraper/opportunity/all` (and the Spirit equivalent).
pub async fn run_all_volumes(conn: &mut PgConnection, config: &Config, client: &ResilientClient, scraper: &pds_volume::PdsVolumeScraper, rover: &Rover) -> Result<i64, Error> {
    let mut recorder = JobRecorder::start(conn, config.job_history.max_enumerated_items)?;
    let mut run = recorder.begin_rover(scraper.rover_name(), 0);
    let mut ctx = ScraperContext {
        conn,
        client,
        ingest_config: config.ingest.clone(),
    };
    if let Err(err) = scraper.scrape_all_volumes(&mut ctx, rover, &mut run).await {
        warn!("full volume scrape failed for {}: {err}", scraper.rover_name());
    }
    recorder.finish_rover(run);
    recorder.commit(ctx.conn)?;
    Ok(recorder.job_id())
}

/// The one entry point an external scheduler needs (§4.10): scrape the last
/// `k` sols of every active rover, one job per rover, run concurrently as
/// independent tasks (§4.7 — parallel across rovers, serial within one).
pub async fn run_incremental_sweep(pool: crate::db::ConnectionPool, config: std::sync::Arc<Config>, client: std::sync::Arc<ResilientClient>, k: i32) -> QueryResult<Vec<i64>> {
    let active_rovers: Vec<Rover> = {
        let mut conn = pool.get().expect("database connection pool must not be exhausted at sweep start");
        repository::rover::all_rovers(&mut conn)?
            .into_iter()
            .filter(|rover| rover.status == crate::model::enums::RoverStatus::Active)
            .collect()
    };

    let mut tasks = Vec::new();
    for rover in active_rovers {
        let pool = pool.clone();
        let config = config.clone();
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            let Some(scraper) = registry(&rover.name, &config) else {
                return None;
            };
            let mut conn = pool.get().ok()?;
            let max_sol = repository::rover::max_sol(&mut conn, rover.id).ok()?.unwrap_or(-1);
            let start = (max_sol + 1).max(0);
            let end = start + k - 1;
            run_bulk(&mut conn, &config, &client, scraper.as_ref(), &rover, start, end).await.ok()
        }));
    }

    let mut job_ids = Vec::new();
    for task in tasks {
        if let Ok(Some(job_id)) = task.await {
            job_ids.push(job_id);
        }
    }
    Ok(job_ids)
}
