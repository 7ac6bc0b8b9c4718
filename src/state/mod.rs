pub mod sweeper;
pub mod wheel_store;

pub use sweeper::CacheSweeper;
pub use wheel_store::WheelStore;
