use crate::model::rover::Rover;
use crate::schema::cameras;
use diesel::pg::Pg;
use diesel::prelude::*;

#[derive(Insertable)]
#[diesel(table_name = cameras)]
#[diesel(check_for_backend(Pg))]
pub struct NewCamera<'a> {
    pub rover_id: i64,
    pub short_name: &'a str,
    pub full_name: &'a str,
}

/// A camera is scoped to a single rover: the same short name (e.g. `FHAZ`)
/// on two different rovers is two distinct rows, since each rover's camera
/// set was installed independently. `(rover_id, short_name)` is unique.
#[derive(Clone, Associations, Identifiable, Queryable, Selectable)]
#[diesel(belongs_to(Rover))]
#[diesel(table_name = cameras)]
#[diesel(check_for_backend(Pg))]
pub struct Camera {
    pub id: i64,
    pub rover_id: i64,
    pub short_name: String,
    pub full_name: String,
}
