pub mod capturer;
pub mod overlay;
pub mod staging;
pub mod step;
