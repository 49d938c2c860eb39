//! Shared helpers used by the JSON-feed scrapers. The PDS volume scraper
//! does not use these — its sols come from a continuous row stream rather
//! than a fetch-per-sol loop.

use super::{Error, Scraper, ScraperContext};
use crate::job::RoverRun;
use crate::model::rover::Rover;
use tracing::warn;

/// Calls `scraper.scrape_sol` once per sol in `start..=end`, in ascending
/// order (§5 ordering guarantee), recording each outcome into `run` and
/// pausing politely between requests. A failed sol does not stop the loop
/// (§4.4 error isolation).
pub async fn bulk_scrape_sol_range(scraper: &dyn Scraper, ctx: &mut ScraperContext<'_>, rover: &Rover, start: i32, end: i32, run: &mut RoverRun) -> Result<(), Error> {
    for sol in start..=end {
        match scraper.scrape_sol(ctx, rover, sol).await {
            Ok(outcome) => run.record_sol(sol, outcome.inserted, true, None, &outcome.inserted_ids),
            Err(err) => {
                warn!("sol {sol} failed for {}: {err}", scraper.rover_name());
                run.record_sol(sol, 0, false, Some(err.to_string()), &[]);
            }
        }
        ctx.client.politeness_pause().await;
    }
    Ok(())
}
