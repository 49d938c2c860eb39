use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Timestamptz;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use time::error::ComponentRange;
use time::serde::rfc3339;
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime};
use tracing::info;

/// A Martian solar day is this many SI seconds longer than an Earth day.
pub const SOL_TO_EARTH_DAY_RATIO: f64 = 88_775.244 / 86_400.0;

pub struct Timer<'a> {
    name: &'a str,
    start: std::time::Instant,
}

impl<'a> Timer<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            start: std::time::Instant::now(),
        }
    }
}

impl<'a> Drop for Timer<'a> {
    fn drop(&mut self) {
        let elapsed_time = self.start.elapsed();
        let time_in_s = elapsed_time.as_secs_f32();
        match elapsed_time.as_nanos().ilog10() {
            0..3 => info!("{} took {:.1}ns", self.name, time_in_s * 1e9),
            3..6 => info!("{} took {:.1}μs", self.name, time_in_s * 1e6),
            6..9 => info!("{} took {:.1}ms", self.name, time_in_s * 1e3),
            9..12 => info!("{} took {:.1}s", self.name, time_in_s),
            12.. => info!("{} took {:.0}s", self.name, time_in_s),
        }
    }
}

/// A wrapper for `time::OffsetDateTime` that serializes/deserializes according to RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Timestamptz)]
pub struct DateTime(#[serde(with = "rfc3339")] OffsetDateTime);

impl DateTime {
    pub fn now() -> Self {
        OffsetDateTime::now_utc().into()
    }

    pub fn today() -> Self {
        Self::now().date().midnight().assume_utc().into()
    }

    pub fn from_date(year: i32, month: u8, day: u8) -> Result<Self, ComponentRange> {
        Month::try_from(month)
            .and_then(|month| Date::from_calendar_date(year, month, day))
            .map(Date::midnight)
            .map(PrimitiveDateTime::assume_utc)
            .map(Self::from)
    }

    /// The Earth calendar date this instant falls on, UTC.
    pub fn date(&self) -> Date {
        self.0.date()
    }

    /// Parses an upstream timestamp that may be a full RFC 3339 instant
    /// (`date_taken_utc`, `start_time`) or a bare calendar date (`earth_date`),
    /// which is treated as UTC midnight.
    pub fn parse_upstream(value: &str) -> Option<Self> {
        OffsetDateTime::parse(value, &time::format_description::well_known::Rfc3339)
            .map(Self::from)
            .ok()
            .or_else(|| {
                let parts: Vec<&str> = value.split('-').collect();
                let [year, month, day] = parts.as_slice() else {
                    return None;
                };
                Self::from_date(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?).ok()
            })
    }

    /// Returns the instant `sols` Martian solar days after this one.
    ///
    /// Used to derive `earth_date` from a rover's landing date and a sol count when
    /// upstream does not supply its own earth date (data model invariant on `Photo::sol`).
    pub fn plus_sols(&self, sols: i32) -> Self {
        let earth_days = f64::from(sols) * SOL_TO_EARTH_DAY_RATIO;
        (self.0 + Duration::seconds_f64(earth_days * 86_400.0)).into()
    }
}

impl Deref for DateTime {
    type Target = OffsetDateTime;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DateTime {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<OffsetDateTime> for DateTime {
    fn from(value: OffsetDateTime) -> Self {
        DateTime(value)
    }
}

impl<DB: Backend> ToSql<Timestamptz, DB> for DateTime
where
    OffsetDateTime: ToSql<Timestamptz, DB>,
{
    fn to_sql<'a>(&'a self, out: &mut Output<'a, '_, DB>) -> serialize::Result {
        self.0.to_sql(out)
    }
}

impl<DB: Backend> FromSql<Timestamptz, DB> for DateTime
where
    OffsetDateTime: FromSql<Timestamptz, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> deserialize::Result<Self> {
        OffsetDateTime::from_sql(bytes).map(DateTime)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sol_offset_is_slightly_longer_than_an_earth_day() {
        let landing = DateTime::from_date(2012, 8, 6).unwrap();
        let one_sol_later = landing.plus_sols(1);
        let delta = *one_sol_later - *landing;
        assert!(delta > Duration::days(1));
        assert!(delta < Duration::days(1) + Duration::minutes(40));
    }
}
