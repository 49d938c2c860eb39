use crate::model::camera::Camera;
use crate::model::rover::Rover;
use crate::schema::photos;
use crate::time::DateTime;
use diesel::pg::Pg;
use diesel::prelude::*;
use serde_json::Value;

/// A candidate photo as produced by a scraper, before it has passed through
/// the ingest pipeline's skip-set and camera resolution. Built incrementally
/// with the `with_*` setters since most optional fields are populated only
/// by some upstream sources (Perseverance's telemetry, PDS's mast angles).
#[derive(Clone, Insertable)]
#[diesel(table_name = photos)]
#[diesel(check_for_backend(Pg))]
pub struct NewPhoto {
    pub external_id: String,
    pub rover_id: i64,
    pub camera_id: i64,
    pub sol: i32,
    pub earth_date: DateTime,
    pub taken_utc: DateTime,
    pub mars_local_time: Option<String>,
    pub received_utc: Option<DateTime>,
    pub thumbnail_url: Option<String>,
    pub small_url: Option<String>,
    pub medium_url: Option<String>,
    pub full_url: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub sample_type: Option<String>,
    pub site: Option<i32>,
    pub drive: Option<i32>,
    pub xyz: Option<Vec<f64>>,
    pub mast_az: Option<f64>,
    pub mast_el: Option<f64>,
    pub filter_name: Option<String>,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub credit: Option<String>,
    pub raw: Value,
}

impl NewPhoto {
    pub fn new(
        external_id: impl Into<String>,
        rover_id: i64,
        camera_id: i64,
        sol: i32,
        earth_date: DateTime,
        taken_utc: DateTime,
        raw: Value,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            rover_id,
            camera_id,
            sol,
            earth_date,
            taken_utc,
            mars_local_time: None,
            received_utc: None,
            thumbnail_url: None,
            small_url: None,
            medium_url: None,
            full_url: None,
            width: None,
            height: None,
            sample_type: None,
            site: None,
            drive: None,
            xyz: None,
            mast_az: None,
            mast_el: None,
            filter_name: None,
            title: None,
            caption: None,
            credit: None,
            raw,
        }
    }

    pub fn with_images(
        mut self,
        thumbnail: Option<String>,
        small: Option<String>,
        medium: Option<String>,
        full: Option<String>,
    ) -> Self {
        self.thumbnail_url = thumbnail;
        self.small_url = small;
        self.medium_url = medium;
        self.full_url = full;
        self
    }

    pub fn with_telemetry(mut self, mast_az: Option<f64>, mast_el: Option<f64>, xyz: Option<[f64; 3]>) -> Self {
        self.mast_az = mast_az;
        self.mast_el = mast_el;
        self.xyz = xyz.map(|xyz| xyz.to_vec());
        self
    }
}

/// One persisted image record. `external_id` is the upstream identifier
/// (the JSON feed's `id`, or the PDS index's `PRODUCT_ID`) and is unique
/// across the entire table, not just within a rover — the database's
/// unique index is the final arbiter of duplicate detection during ingest.
#[derive(Clone, Associations, Identifiable, Queryable, Selectable)]
#[diesel(belongs_to(Rover))]
#[diesel(belongs_to(Camera))]
#[diesel(table_name = photos)]
#[diesel(check_for_backend(Pg))]
pub struct Photo {
    pub id: i64,
    pub external_id: String,
    pub rover_id: i64,
    pub camera_id: i64,
    pub sol: i32,
    pub earth_date: DateTime,
    pub taken_utc: DateTime,
    pub mars_local_time: Option<String>,
    pub received_utc: Option<DateTime>,
    pub thumbnail_url: Option<String>,
    pub small_url: Option<String>,
    pub medium_url: Option<String>,
    pub full_url: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub sample_type: Option<String>,
    pub site: Option<i32>,
    pub drive: Option<i32>,
    pub xyz: Option<Vec<f64>>,
    pub mast_az: Option<f64>,
    pub mast_el: Option<f64>,
    pub filter_name: Option<String>,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub credit: Option<String>,
    pub raw: Value,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}
