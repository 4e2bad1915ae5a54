/// Fixed-latency stroke playback.
pub mod player;
