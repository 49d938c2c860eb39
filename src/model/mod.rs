pub mod camera;
pub mod enums;
pub mod job;
pub mod photo;
pub mod rover;

pub trait TableName {
    fn table_name() -> &'static str;
}
