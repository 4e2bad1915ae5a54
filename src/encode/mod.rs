//! Turning a staged frame sequence into a video.

/// Sequence verification, playback-rate selection and assembly.
pub mod assemble;
/// `ffmpeg`-based MP4 sink.
pub mod ffmpeg;
/// Frame sink trait and the in-memory sink.
pub mod sink;
