//! Curiosity's upstream feed: one JSON document per sol, keyed by a
//! zero-padded 5-digit sol number (§4.4.1, §6.3).

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
    images: Vec<Value>,
}

#[derive(Deserialize)]
struct Image {
    id: i64,
    camera: Camera,
    date_taken: String,
    earth_date: String,
    img_src: String,
    sample_type: Option<String>,
    url_list: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct Camera {
    name: String,
}

pub struct CuriosityScraper {
    base_url: String,
}

impl CuriosityScraper {
    pub fn new(config: &crate::config::Config) -> Option<Self> {
        let base_url = config.rover_source("curiosity")?.json_feed.as_ref()?.feed_base_url.clone();
        Some(Self { base_url })
    }
}

#[async_trait]
impl Scraper for CuriosityScraper {
    fn rover_name(&self) -> &'static str {
        "curiosity"
    }

    async fn scrape_sol(&self, ctx: &mut ScraperContext<'_>, rover: &Rover, sol: i32) -> Result<SolOutcome, Error> {
        let url = format!("{}/{sol:05}/images.json", self.base_url.trim_end_matches('/'));
        let Some(response) = ctx.client.get(&url).await? else {
            return Ok(SolOutcome { sol, inserted: 0, skipped: 0, inserted_ids: Vec::new() });
        };
        let feed: Feed = response.json().await.map_err(crate::resilience::Error::from)?;

        let mut ingester = Ingester::new(ctx.conn, rover.id, ctx.ingest_config.clone())?;
        let mut candidates = Vec::with_capacity(feed.images.len());
        for raw in feed.images {
            let image: Image = match serde_json::from_value(raw.clone()) {
                Ok(image) => image,
                Err(err) => {
                    tracing::warn!("skipping malformed curiosity image on sol {sol}: {err}");
                    continue;
                }
            };
            let Some(taken_utc) = DateTime::parse_upstream(&image.date_taken) else {
                tracing::warn!("skipping curiosity image {} with unparseable date_taken", image.id);
                continue;
            };
            let earth_date = DateTime::parse_upstream(&image.earth_date).unwrap_or_else(|| rover.earth_date_for_sol(sol));

            let mut candidate = Candidate::new(image.id.to_string(), image.camera.name.clone(), sol, earth_date, taken_utc, raw);
            let thumbnail = image.url_list.as_ref().and_then(|urls| urls.first().cloned()).unwrap_or_else(|| image.img_src.clone());
            let full = image.img_src.clone();
            let sample_type = image.sample_type.clone();
            candidate = candidate.enrich(move |photo| {
                let mut photo = photo.with_images(Some(thumbnail), None, None, Some(full));
                photo.sample_type = sample_type;
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
        let url = format!("{}/{sol:05}/images.json", self.base_url.trim_end_matches('/'));
        let Some(response) = client.get(&url).await? else {
            return Ok(Vec::new());
        };
        let feed: Feed = response.json().await.map_err(crate::resilience::Error::from)?;
        Ok(feed
            .images
            .into_iter()
            .filter_map(|raw| serde_json::from_value::<Image>(raw).ok())
            .map(|image| image.id.to_string())
            .collect())
    }

    async fn upstream_record(&self, client: &crate::resilience::ResilientClient, sol: i32, external_id: &str) -> Result<Option<serde_json::Value>, Error> {
        let url = format!("{}/{sol:05}/images.json", self.base_url.trim_end_matches('/'));
        let Some(response) = client.get(&url).await? else {
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
