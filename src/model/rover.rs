use crate::model::enums::RoverStatus;
use crate::schema::rovers;
use crate::time::DateTime;
use diesel::pg::Pg;
use diesel::prelude::*;

/// A rover is reference data seeded outside this crate (landing date, launch
/// date, status); scrapers and queries only ever read rows here, never
/// insert or update them.
#[derive(Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = rovers)]
#[diesel(check_for_backend(Pg))]
pub struct Rover {
    pub id: i64,
    pub name: String,
    pub landing_date: DateTime,
    pub launch_date: DateTime,
    pub status: RoverStatus,
}

impl Rover {
    /// `earth_date` derived from `landing_date + sol × (88775.244 / 86400)` days.
    pub fn earth_date_for_sol(&self, sol: i32) -> DateTime {
        self.landing_date.plus_sols(sol)
    }
}
