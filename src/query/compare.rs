//! NASA-compare diagnostics (§4.6.4): reconciles what the store holds
//! against a live upstream fetch, for a single sol, a single photo, or a
//! bounded range of sols. Unlike every other query operation this one
//! touches the network, so it takes the same `ResilientClient` the
//! scrapers do, plus a caller-resolved `Scraper` (callers resolve
//! `scraper`/`rover` first via `scraper::registry` /
//! `repository::rover::find_rover_by_name`, the same contract
//! `scraper::run_sol` follows).

use super::Error;
use crate::config::QueryConfig;
use crate::model::rover::Rover;
use crate::repository;
use crate::resilience::ResilientClient;
use crate::scraper::Scraper;
use diesel::PgConnection;
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareStatus {
    Match,
    Missing,
    Extra,
    Divergent,
}

pub struct SolComparison {
    pub sol: i32,
    pub nasa_count: usize,
    pub our_count: usize,
    pub missing: Vec<String>,
    pub extra: Vec<String>,
    pub match_percent: f64,
    pub status: CompareStatus,
    pub truncated: bool,
}

fn compare_id_sets(nasa_ids: HashSet<String>, our_ids: HashSet<String>, cap: usize) -> (Vec<String>, Vec<String>, f64, CompareStatus, bool) {
    let mut missing: Vec<String> = nasa_ids.difference(&our_ids).cloned().collect();
    let mut extra: Vec<String> = our_ids.difference(&nasa_ids).cloned().collect();
    missing.sort();
    extra.sort();

    let truncated = missing.len() > cap || extra.len() > cap;
    missing.truncate(cap);
    extra.truncate(cap);

    let match_percent = if nasa_ids.is_empty() {
        if our_ids.is_empty() { 100.0 } else { 0.0 }
    } else {
        let matched = nasa_ids.intersection(&our_ids).count();
        matched as f64 / nasa_ids.len() as f64 * 100.0
    };

    let status = match (missing.is_empty(), extra.is_empty()) {
        (true, true) => CompareStatus::Match,
        (false, true) => CompareStatus::Missing,
        (true, false) => CompareStatus::Extra,
        (false, false) => CompareStatus::Divergent,
    };

    (missing, extra, match_percent, status, truncated)
}

/// Fetches the live upstream id set for `rover`/`sol` and diffs it against
/// the stored external ids for that sol.
pub async fn compare_sol(
    conn: &mut PgConnection,
    config: &QueryConfig,
    client: &ResilientClient,
    scraper: &dyn Scraper,
    rover: &Rover,
    sol: i32,
) -> Result<SolComparison, Error> {
    let nasa_ids: HashSet<String> = scraper.upstream_ids(client, sol).await.map_err(wrap_scraper_error)?.into_iter().collect();
    let our_ids = repository::photo::external_ids_for_sol(conn, rover.id, sol)?;

    let nasa_count = nasa_ids.len();
    let our_count = our_ids.len();
    let (missing, extra, match_percent, status, truncated) = compare_id_sets(nasa_ids, our_ids, config.compare_list_cap);

    Ok(SolComparison {
        sol,
        nasa_count,
        our_count,
        missing,
        extra,
        match_percent,
        status,
        truncated,
    })
}

pub struct FieldDiff {
    pub field: String,
    pub ours: Option<Value>,
    pub nasa: Option<Value>,
}

pub struct PhotoComparison {
    pub nasa_id: String,
    pub in_ours: bool,
    pub in_nasa: bool,
    pub field_diffs: Vec<FieldDiff>,
}

/// Compares the stored raw record for `nasa_id` against the live record at
/// the same sol, field by field. A photo present in only one side still
/// returns a result (with `field_diffs` empty and the presence booleans
/// reflecting the asymmetry) rather than an error.
pub async fn compare_photo(conn: &mut PgConnection, client: &ResilientClient, scraper: &dyn Scraper, rover: &Rover, nasa_id: &str) -> Result<PhotoComparison, Error> {
    let ours = repository::photo::find_by_external_id(conn, rover.id, nasa_id)?;
    let in_ours = ours.is_some();

    let Some(ours) = ours else {
        return Ok(PhotoComparison {
            nasa_id: nasa_id.to_owned(),
            in_ours: false,
            in_nasa: false,
            field_diffs: Vec::new(),
        });
    };

    let nasa_raw = scraper.upstream_record(client, ours.sol, nasa_id).await.map_err(wrap_scraper_error)?;
    let in_nasa = nasa_raw.is_some();

    let field_diffs = match &nasa_raw {
        Some(nasa_raw) => diff_json_objects(&ours.raw, nasa_raw),
        None => Vec::new(),
    };

    Ok(PhotoComparison {
        nasa_id: nasa_id.to_owned(),
        in_ours,
        in_nasa,
        field_diffs,
    })
}

/// Field-by-field diff of two raw JSON objects. Only keys that differ (by
/// value, including presence on only one side) are reported.
fn diff_json_objects(ours: &Value, nasa: &Value) -> Vec<FieldDiff> {
    let (Value::Object(ours_map), Value::Object(nasa_map)) = (ours, nasa) else {
        return Vec::new();
    };

    let mut fields: Vec<&String> = Vec::new();
    for key in ours_map.keys().chain(nasa_map.keys()) {
        if !fields.contains(&key) {
            fields.push(key);
        }
    }

    fields
        .into_iter()
        .filter_map(|field| {
            let ours_value = ours_map.get(field).cloned();
            let nasa_value = nasa_map.get(field).cloned();
            (ours_value != nasa_value).then(|| FieldDiff {
                field: field.clone(),
                ours: ours_value,
                nasa: nasa_value,
            })
        })
        .collect()
}

pub struct RangeComparison {
    pub sols: Vec<SolComparison>,
}

/// Compares every sol in `[start, end]`, capped at `config.max_compare_range_sols`.
pub async fn compare_range(
    conn: &mut PgConnection,
    config: &QueryConfig,
    client: &ResilientClient,
    scraper: &dyn Scraper,
    rover: &Rover,
    start: i32,
    end: i32,
) -> Result<RangeComparison, Error> {
    let requested = i64::from(end - start + 1);
    if requested > config.max_compare_range_sols {
        return Err(Error::CompareRangeTooLarge {
            requested,
            max: config.max_compare_range_sols,
        });
    }

    let mut sols = Vec::new();
    for sol in start..=end {
        sols.push(compare_sol(conn, config, client, scraper, rover, sol).await?);
    }
    Ok(RangeComparison { sols })
}

fn wrap_scraper_error(err: crate::scraper::Error) -> Error {
    Error::Query(diesel::result::Error::QueryBuilderError(Box::new(err)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn compare_id_sets_classifies_every_status() {
        let cap = 10;

        let nasa: HashSet<String> = ["a", "b"].into_iter().map(String::from).collect();
        let ours: HashSet<String> = ["a", "b"].into_iter().map(String::from).collect();
        let (missing, extra, pct, status, truncated) = compare_id_sets(nasa, ours, cap);
        assert!(missing.is_empty() && extra.is_empty());
        assert_eq!(pct, 100.0);
        assert_eq!(status, CompareStatus::Match);
        assert!(!truncated);

        let nasa: HashSet<String> = ["a", "b"].into_iter().map(String::from).collect();
        let ours: HashSet<String> = ["a"].into_iter().map(String::from).collect();
        let (missing, extra, pct, status, _) = compare_id_sets(nasa, ours, cap);
        assert_eq!(missing, vec!["b".to_string()]);
        assert!(extra.is_empty());
        assert_eq!(pct, 50.0);
        assert_eq!(status, CompareStatus::Missing);

        let nasa: HashSet<String> = ["a"].into_iter().map(String::from).collect();
        let ours: HashSet<String> = ["a", "b"].into_iter().map(String::from).collect();
        let (_, extra, _, status, _) = compare_id_sets(nasa, ours, cap);
        assert_eq!(extra, vec!["b".to_string()]);
        assert_eq!(status, CompareStatus::Extra);

        let nasa: HashSet<String> = ["a", "c"].into_iter().map(String::from).collect();
        let ours: HashSet<String> = ["a", "b"].into_iter().map(String::from).collect();
        let (missing, extra, _, status, _) = compare_id_sets(nasa, ours, cap);
        assert_eq!(missing, vec!["c".to_string()]);
        assert_eq!(extra, vec!["b".to_string()]);
        assert_eq!(status, CompareStatus::Divergent);
    }

    #[test]
    fn compare_id_sets_truncates_and_flags() {
        let nasa: HashSet<String> = (0..5).map(|i| format!("id{i}")).collect();
        let ours: HashSet<String> = HashSet::new();
        let (missing, _, _, _, truncated) = compare_id_sets(nasa, ours, 2);
        assert_eq!(missing.len(), 2);
        assert!(truncated);
    }

    #[test]
    fn diff_json_objects_reports_only_differing_fields() {
        let ours = serde_json::json!({"a": 1, "b": 2});
        let nasa = serde_json::json!({"a": 1, "b": 3, "c": 4});
        let diffs = diff_json_objects(&ours, &nasa);
        let fields: Vec<&str> = diffs.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains(&"b"));
        assert!(fields.contains(&"c"));
    }
}
