pub mod models;
pub mod repository;

pub use repository::{SqliteWheelRepository, WheelRepository};
