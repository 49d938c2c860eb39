use crate::model::camera::{Camera, NewCamera};
use crate::schema::cameras;
use diesel::prelude::*;
use tracing::warn;

pub fn find_by_id(conn: &mut PgConnection, camera_id: i64) -> QueryResult<Option<Camera>> {
    cameras::table.find(camera_id).select(Camera::as_select()).first(conn).optional()
}

/// Returns the existing `(rover_id, short_name)` camera row, or creates one
/// using `short_name` as a placeholder full name. Creation emits a warning,
/// per the "unknown camera" policy in §4.4.
pub fn find_or_create_camera(conn: &mut PgConnection, rover_id: i64, short_name: &str) -> QueryResult<Camera> {
    let existing = cameras::table
        .filter(cameras::rover_id.eq(rover_id))
        .filter(cameras::short_name.eq(short_name))
        .select(Camera::as_select())
        .first(conn)
        .optional()?;

    if let Some(camera) = existing {
        return Ok(camera);
    }

    warn!("unknown camera {short_name} for rover {rover_id}, auto-creating");
    let new_camera = NewCamera {
        rover_id,
        short_name,
        full_name: short_name,
    };
    diesel::insert_into(cameras::table)
        .values(&new_camera)
        .on_conflict((cameras::rover_id, cameras::short_name))
        .do_update()
        .set(cameras::full_name.eq(cameras::full_name))
        .get_result(conn)
}
