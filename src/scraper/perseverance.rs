//! Perseverance's upstream feed: a single endpoint that answers either a
//! "latest" query (for discovering the current max remote sol) or a
//! per-sol query, with richer telemetry than Curiosity's (§4.4.2, §6.3).

use super::common::bulk_scrape_sol_range;
use super::{Error, Scraper, ScraperContext, SolOutcome};
use crate::ingest::{Candidate, Ingester};
use crate::job::RoverRun;
use crate::model::rover::Rover;
use crate::time::DateTime;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct Feed {
    #[serde(default)]
    latest_sol: Option<i32>,
    #[serde(default)]
    images: Vec<Value>,
}

#[derive(Deserialize)]
struct Image {
    id: i64,
    camera: Camera,
    sample_type: Option<String>,
    date_taken_utc: String,
    #[serde(default)]
    date_taken_mars: Option<String>,
    image_files: ImageFiles,
    #[serde(default)]
    extended: Extended,
}

#[derive(Deserialize)]
struct Camera {
    instrument: String,
}

#[derive(Deserialize)]
struct ImageFiles {
    small: Option<String>,
    medium: Option<String>,
    large: Option<String>,
    full_res: Option<String>,
}

#[derive(Deserialize, Default)]
struct Extended {
    #[serde(rename = "mastAz")]
    mast_az: Option<f64>,
    #[serde(rename = "mastEl")]
    mast_el: Option<f64>,
    xyz: Option<[f64; 3]>,
    dimension: Option<[i32; 2]>,
}

pub struct PerseveranceScraper {
    base_url: String,
}

impl PerseveranceScraper {
    pub fn new(config: &crate::config::Config) -> Option<Self> {
        let base_url = config.rover_source("perseverance")?.json_feed.as_ref()?.feed_base_url.clone();
        Some(Self { base_url })
    }

    fn sol_url(&self, sol: i32) -> String {
        format!("{}?feed=raw_images&category=mars2020&feedtype=json&sol={sol}", self.base_url)
    }

    fn latest_url(&self) -> String {
        format!("{}?feed=raw_images&category=mars2020&feedtype=json&latest=true", self.base_url)
    }

    /// Discovers the current max remote sol via the "latest" query, used
    /// when a bulk run is asked for without an explicit end sol (§4.4.2).
    pub async fn discover_latest_sol(&self, client: &crate::resilience::ResilientClient) -> Result<Option<i32>, Error> {
        let Some(response) = client.get(&self.latest_url()).await? else {
            return Ok(None);
        };
        let feed: Feed = response.json().await.map_err(crate::resilience::Error::from)?;
        Ok(feed.latest_sol)
    }
}

#[async_trait]
impl Scraper for PerseveranceScraper {
    fn rover_name(&self) -> &'static str {
        "perseverance"
    }

    async fn scrape_sol(&self, ctx: &mut ScraperContext<'_>, rover: &Rover, sol: i32) -> Result<SolOutcome, Error> {
        let Some(response) = ctx.client.get(&self.sol_url(sol)).await? else {
            return Ok(SolOutcome { sol, inserted: 0, skipped: 0, inserted_ids: Vec::new() });
        };
        let feed: Feed = response.json().await.map_err(crate::resilience::Error::from)?;

        let mut ingester = Ingester::new(ctx.conn, rover.id, ctx.ingest_config.clone())?;
        let mut candidates = Vec::with_capacity(feed.images.len());
        for raw in feed.images {
            let image: Image = match serde_json::from_value(raw.clone()) {
                Ok(image) => image,
                Err(err) => {
                    tracing::warn!("skipping malformed perseverance image on sol {sol}: {err}");
                    continue;
                }
            };
            // §4.4.2: only "Full" samples are ingested to match the downstream contract.
            if image.sample_type.as_deref() != Some("Full") {
                continue;
            }
            let Some(taken_utc) = DateTime::parse_upstream(&image.date_taken_utc) else {
                tracing::warn!("skipping perseverance image {} with unparseable date_taken_utc", image.id);
                continue;
            };
            let earth_date = rover.earth_date_for_sol(sol);

            let mut candidate = Candidate::new(image.id.to_string(), image.camera.instrument.clone(), sol, earth_date, taken_utc, raw);
            let mars_local_time = image.date_taken_mars.clone();
            let sample_type = image.sample_type.clone();
            let images = image.image_files;
            let extended = image.extended;
            candidate = candidate.enrich(move |photo| {
                let mut photo = photo
                    .with_images(images.small.clone(), images.small, images.medium, images.large.or(images.full_res))
                    .with_telemetry(extended.mast_az, extended.mast_el, extended.xyz);
                photo.mars_local_time = mars_local_time;
                photo.sample_type = sample_type;
                if let Some([width, height]) = extended.dimension {
                    photo.width = Some(width);
                    photo.height = Some(height);
                }
                photo
            });
            candidates.push(candidate);
        }

        let (outcome, inserted_ids) = ingester.ingest_sol(candidates)?;
        Ok(SolOutcome {
            sol,
            inserted: outcome.inserted,
            skipped: outcome.skipped,
            inserted_ids,
        })
    }

    async fn bulk_scrape(&self, ctx: &mut ScraperContext<'_>, rover: &Rover, start: i32, end: i32, run: &mut RoverRun) -> Result<(), Error> {
        bulk_scrape_sol_range(self, ctx, rover, start, end, run).await
    }

    async fn upstream_ids(&self, client: &crate::resilience::ResilientClient, sol: i32) -> Result<Vec<String>, Error> {
        let Some(response) = client.get(&self.sol_url(sol)).await? else {
            return Ok(Vec::new());
        };
        let feed: Feed = response.json().await.map_err(crate::resilience::Error::from)?;
        Ok(feed
            .images
            .into_iter()
            .filter_map(|raw| serde_json::from_value::<Image>(raw).ok())
            .filter(|image| image.sample_type.as_deref() == Some("Full"))
            .map(|image| image.id.to_string())
            .collect())
    }

    async fn upstream_record(&self, client: &crate::resilience::ResilientClient, sol: i32, external_id: &str) -> Result<Option<serde_json::Value>, Error> {
        let Some(response) = client.get(&self.sol_url(sol)).await? else {
            return Ok(None);
        };
        let feed: Feed = response.json().await.map_err(crate::resilience::Error::from)?;
        Ok(feed.images.into_iter().find(|raw| {
            serde_json::from_value::<Image>(raw.clone())
                .map(|image| image.id.to_string() == external_id)
                .unwrap_or(false)
        }))
    }
}
