pub mod camera;
pub mod job;
pub mod photo;
pub mod rover;

pub use camera::find_or_create_camera;
pub use job::record_job;
pub use photo::{add_photos, existing_external_ids, latest_photos, manifest};
pub use rover::find_rover_by_name;
