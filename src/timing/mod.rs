/// Expected drawing durations.
pub mod estimate;
