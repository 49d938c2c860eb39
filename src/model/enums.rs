use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::SmallInt;
use diesel::{AsExpression, FromSqlRow};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, ToPrimitive, AsExpression, FromSqlRow, Serialize, Deserialize,
)]
#[diesel(sql_type = SmallInt)]
#[serde(rename_all = "snake_case")]
pub enum RoverStatus {
    Active,
    Complete,
}

impl<DB: Backend> ToSql<SmallInt, DB> for RoverStatus
where
    i16: ToSql<SmallInt, DB>,
{
    fn to_sql<'a>(&'a self, out: &mut Output<'a, '_, DB>) -> serialize::Result {
        // Calling to_sql directly on the temporary returned by to_usize doesn't compile, hence the array.
        const VALUES: [i16; 2] = [0, 1];
        VALUES[self.to_usize().unwrap()].to_sql(out)
    }
}

impl<DB: Backend> FromSql<SmallInt, DB> for RoverStatus
where
    i16: FromSql<SmallInt, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> deserialize::Result<Self> {
        let database_value = i16::from_sql(bytes)?;
        RoverStatus::from_i16(database_value).ok_or(DeserializeRoverStatusError.into())
    }
}

#[derive(Debug, Error)]
#[error("Failed to deserialize rover status")]
struct DeserializeRoverStatusError;

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, FromPrimitive, ToPrimitive, AsExpression, FromSqlRow, Serialize, Deserialize,
)]
#[diesel(sql_type = SmallInt)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Success,
    Failed,
    Partial,
}

impl<DB: Backend> ToSql<SmallInt, DB> for JobStatus
where
    i16: ToSql<SmallInt, DB>,
{
    fn to_sql<'a>(&'a self, out: &mut Output<'a, '_, DB>) -> serialize::Result {
        const VALUES: [i16; 3] = [0, 1, 2];
        VALUES[self.to_usize().unwrap()].to_sql(out)
    }
}

impl<DB: Backend> FromSql<SmallInt, DB> for JobStatus
where
    i16: FromSql<SmallInt, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> deserialize::Result<Self> {
        let database_value = i16::from_sql(bytes)?;
        JobStatus::from_i16(database_value).ok_or(DeserializeJobStatusError.into())
    }
}

#[derive(Debug, Error)]
#[error("Failed to deserialize job status")]
struct DeserializeJobStatusError;
