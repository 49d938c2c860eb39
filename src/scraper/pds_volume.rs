//! The Opportunity/Spirit scraper: both rovers are retired, their imagery
//! frozen in per-camera PDS archive volumes, so they share one generic
//! implementation parameterized only by which volumes to walk (§4.4.3).
//! This is the one generalization the distilled "OpportunityScraper" /
//! "SpiritScraper" split invites; `opportunity()`/`spirit()` are thin
//! constructors over the same type.

use super::{Error, Scraper, ScraperContext, SolOutcome};
use crate::config::{Config, PdsVolume};
use crate::ingest::{Candidate, Ingester};
use crate::job::RoverRun;
use crate::model::rover::Rover;
use crate::pds::{PdsParser, PdsRow};
use crate::time::DateTime;
use async_trait::async_trait;
use futures::TryStreamExt;
use tokio_util::io::{StreamReader, SyncIoBridge};
use tracing::warn;

pub struct PdsVolumeScraper {
    rover_name: &'static str,
    volumes: Vec<PdsVolume>,
}

impl PdsVolumeScraper {
    pub fn opportunity(config: &Config) -> Option<Self> {
        Self::for_rover("opportunity", config)
    }

    pub fn spirit(config: &Config) -> Option<Self> {
        Self::for_rover("spirit", config)
    }

    fn for_rover(rover_name: &'static str, config: &Config) -> Option<Self> {
        let volumes = config.rover_source(rover_name)?.pds.as_ref()?.volumes.clone();
        Some(Self { rover_name, volumes })
    }

    /// Walks every configured volume with no sol restriction, recording one
    /// aggregate detail entry. Used by the dedicated `POST
    /// /scraper/opportunity/all` endpoint, which bypasses the generic
    /// `bulk_scrape(start, end)` entirely.
    pub async fn scrape_all_volumes(&self, ctx: &mut ScraperContext<'_>, rover: &Rover, run: &mut RoverRun) -> Result<(), Error> {
        let mut inserted = 0;
        let mut inserted_ids = Vec::new();
        for volume in &self.volumes {
            let (volume_inserted, mut volume_ids) = self.scrape_one_volume(ctx, rover, volume, None).await?;
            inserted += volume_inserted;
            inserted_ids.append(&mut volume_ids);
        }
        run.record_sol(0, inserted, true, None, &inserted_ids);
        Ok(())
    }

    /// Walks the single named volume (matched by camera short name). Used
    /// by `POST /scraper/opportunity/volume/{volumeName}`.
    pub async fn scrape_named_volume(&self, ctx: &mut ScraperContext<'_>, rover: &Rover, volume_name: &str, run: &mut RoverRun) -> Result<(), Error> {
        let Some(volume) = self.volumes.iter().find(|v| v.camera.eq_ignore_ascii_case(volume_name)) else {
            warn!("no configured PDS volume named {volume_name} for {}", self.rover_name);
            run.record_sol(0, 0, false, Some(format!("unknown PDS volume {volume_name}")), &[]);
            return Ok(());
        };
        let (inserted, inserted_ids) = self.scrape_one_volume(ctx, rover, volume, None).await?;
        run.record_sol(0, inserted, true, None, &inserted_ids);
        Ok(())
    }

    /// Streams and ingests a single volume, optionally restricted to a sol
    /// range. Returns the number of rows inserted and their external ids;
    /// callers aggregate across volumes before recording into a `RoverRun`.
    async fn scrape_one_volume(&self, ctx: &mut ScraperContext<'_>, rover: &Rover, volume: &PdsVolume, sol_range: Option<(i32, i32)>) -> Result<(i32, Vec<String>), Error> {
        let Some(response) = ctx.client.get(&volume.index_url).await? else {
            return Ok((0, Vec::new()));
        };

        let byte_stream = response.bytes_stream().map_err(|err| std::io::Error::other(err));
        let async_reader = StreamReader::new(byte_stream);
        let sync_reader = SyncIoBridge::new(async_reader);
        let (tx, mut rx) = tokio::sync::mpsc::channel::<Result<PdsRow, crate::pds::ParseError>>(256);
        let volume_url = volume.index_url.clone();
        tokio::task::spawn_blocking(move || {
            let parser = PdsParser::new(std::io::BufReader::new(sync_reader), volume_url);
            for row in parser {
                if tx.blocking_send(row).is_err() {
                    break;
                }
            }
        });

        let mut ingester = Ingester::new(ctx.conn, rover.id, ctx.ingest_config.clone())?;
        let mut inserted = 0i32;
        let mut inserted_ids = Vec::new();

        while let Some(row) = rx.recv().await {
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    warn!("skipping unparseable PDS row in {}: {err}", volume.index_url);
                    continue;
                }
            };
            if let Some((start, end)) = sol_range {
                if row.sol < start || row.sol > end {
                    continue;
                }
            }

            let Some(taken_utc) = DateTime::parse_upstream(&row.start_time) else {
                warn!("skipping PDS row {} with unparseable start_time", row.product_id);
                continue;
            };
            let earth_date = rover.earth_date_for_sol(row.sol);
            let raw = serde_json::json!({
                "product_id": row.product_id,
                "sol": row.sol,
                "start_time": row.start_time,
                "instrument_id": row.instrument_id,
                "lines": row.lines,
                "line_samples": row.line_samples,
                "mast_azimuth": row.mast_azimuth,
                "mast_elevation": row.mast_elevation,
                "filter_name": row.filter_name,
                "browse_url": row.browse_url,
            });

            let width = row.line_samples;
            let height = row.lines;
            let filter_name = row.filter_name.clone();
            let mast_az = row.mast_azimuth;
            let mast_el = row.mast_elevation;
            let browse_url = row.browse_url.clone();
            let candidate = Candidate::new(row.product_id.clone(), row.camera_short_name.clone(), row.sol, earth_date, taken_utc, raw).enrich(move |photo| {
                let mut photo = photo.with_images(browse_url.clone(), None, None, browse_url).with_telemetry(mast_az, mast_el, None);
                photo.width = width;
                photo.height = height;
                photo.filter_name = filter_name;
                photo
            });

            if ingester.ingest_one(candidate)? {
                inserted += 1;
                inserted_ids.push(row.product_id);
            }
        }

        ingester.finish()?;
        Ok((inserted, inserted_ids))
    }

    /// Streams a single volume with no database connection, collecting the
    /// product ids for one sol. Used only by [`Scraper::upstream_ids`].
    async fn stream_volume_ids(client: &crate::resilience::ResilientClient, volume: &PdsVolume, sol: i32) -> Result<Vec<String>, Error> {
        let Some(response) = client.get(&volume.index_url).await? else {
            return Ok(Vec::new());
        };

        let byte_stream = response.bytes_stream().map_err(std::io::Error::other);
        let async_reader = StreamReader::new(byte_stream);
        let sync_reader = SyncIoBridge::new(async_reader);
        let (tx, mut rx) = tokio::sync::mpsc::channel::<Result<PdsRow, crate::pds::ParseError>>(256);
        let volume_url = volume.index_url.clone();
        tokio::task::spawn_blocking(move || {
            let parser = PdsParser::new(std::io::BufReader::new(sync_reader), volume_url);
            for row in parser {
                if tx.blocking_send(row).is_err() {
                    break;
                }
            }
        });

        let mut ids = Vec::new();
        while let Some(row) = rx.recv().await {
            if let Ok(row) = row {
                if row.sol == sol {
                    ids.push(row.product_id);
                }
            }
        }
        Ok(ids)
    }

    /// As [`Self::stream_volume_ids`], but returns the full row matching
    /// `product_id` as JSON instead of the id list. Used by
    /// [`Scraper::upstream_record`].
    async fn stream_volume_record(client: &crate::resilience::ResilientClient, volume: &PdsVolume, sol: i32, product_id: &str) -> Result<Option<serde_json::Value>, Error> {
        let Some(response) = client.get(&volume.index_url).await? else {
            return Ok(None);
        };

        let byte_stream = response.bytes_stream().map_err(std::io::Error::other);
        let async_reader = StreamReader::new(byte_stream);
        let sync_reader = SyncIoBridge::new(async_reader);
        let (tx, mut rx) = tokio::sync::mpsc::channel::<Result<PdsRow, crate::pds::ParseError>>(256);
        let volume_url = volume.index_url.clone();
        tokio::task::spawn_blocking(move || {
            let parser = PdsParser::new(std::io::BufReader::new(sync_reader), volume_url);
            for row in parser {
                if tx.blocking_send(row).is_err() {
                    break;
                }
            }
        });

        while let Some(row) = rx.recv().await {
            let Ok(row) = row else { continue };
            if row.sol == sol && row.product_id == product_id {
                return Ok(Some(serde_json::json!({
                    "product_id": row.product_id,
                    "sol": row.sol,
                    "start_time": row.start_time,
                    "instrument_id": row.instrument_id,
                    "lines": row.lines,
                    "line_samples": row.line_samples,
                    "mast_azimuth": row.mast_azimuth,
                    "mast_elevation": row.mast_elevation,
                    "filter_name": row.filter_name,
                    "browse_url": row.browse_url,
                })));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl Scraper for PdsVolumeScraper {
    fn rover_name(&self) -> &'static str {
        self.rover_name
    }

    /// Walks every volume looking for the single sol, aggregating across
    /// cameras. Expensive (downloads every volume) but matches the uniform
    /// `Scraper` surface; admin tooling should prefer the volume-specific
    /// endpoints for routine backfills.
    async fn scrape_sol(&self, ctx: &mut ScraperContext<'_>, rover: &Rover, sol: i32) -> Result<SolOutcome, Error> {
        let mut inserted = 0;
        let mut inserted_ids = Vec::new();
        for volume in &self.volumes {
            let (volume_inserted, mut volume_ids) = self.scrape_one_volume(ctx, rover, volume, Some((sol, sol))).await?;
            inserted += volume_inserted;
            inserted_ids.append(&mut volume_ids);
        }
        Ok(SolOutcome {
            sol,
            inserted,
            skipped: 0,
            inserted_ids,
        })
    }

    async fn bulk_scrape(&self, ctx: &mut ScraperContext<'_>, rover: &Rover, start: i32, end: i32, run: &mut RoverRun) -> Result<(), Error> {
        let mut inserted = 0;
        let mut inserted_ids = Vec::new();
        for volume in &self.volumes {
            let (volume_inserted, mut volume_ids) = self.scrape_one_volume(ctx, rover, volume, Some((start, end))).await?;
            inserted += volume_inserted;
            inserted_ids.append(&mut volume_ids);
        }
        run.record_sol(start, inserted, true, None, &inserted_ids);
        Ok(())
    }

    async fn upstream_ids(&self, client: &crate::resilience::ResilientClient, sol: i32) -> Result<Vec<String>, Error> {
        let mut ids = Vec::new();
        for volume in &self.volumes {
            ids.extend(Self::stream_volume_ids(client, volume, sol).await?);
        }
        Ok(ids)
    }

    async fn upstream_record(&self, client: &crate::resilience::ResilientClient, sol: i32, external_id: &str) -> Result<Option<serde_json::Value>, Error> {
        for volume in &self.volumes {
            if let Some(record) = Self::stream_volume_record(client, volume, sol, external_id).await? {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}
