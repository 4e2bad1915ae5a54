use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

use crate::capture::staging::{FrameStage, StagedFrame};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};

/// Lower bound for a duration-derived playback rate.
pub const MIN_PLAYBACK_FPS: f64 = 5.0;
/// Upper bound for a duration-derived playback rate.
pub const MAX_PLAYBACK_FPS: f64 = 30.0;

/// How the output playback rate is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameRate {
    /// Use this rate as given.
    Explicit(f64),
    /// Fit all frames into this duration, clamped to the playback bounds.
    TargetDuration(Duration),
}

/// `frame_count / target`, before clamping. `None` when there is nothing to divide.
pub fn raw_playback_fps(frame_count: u64, target: Duration) -> Option<f64> {
    let secs = target.as_secs_f64();
    if frame_count == 0 || secs <= 0.0 {
        return None;
    }
    Some(frame_count as f64 / secs)
}

/// Resolve `rate` into a concrete playback rate for `frame_count` frames.
pub fn effective_fps(rate: FrameRate, frame_count: u64, fallback_fps: f64) -> ReelResult<f64> {
    match rate {
        FrameRate::Explicit(fps) => {
            if !fps.is_finite() || fps <= 0.0 {
                return Err(ReelError::validation(format!(
                    "explicit fps must be finite and > 0, got {fps}"
                )));
            }
            Ok(fps)
        }
        FrameRate::TargetDuration(target) => Ok(raw_playback_fps(frame_count, target)
            .map(|fps| fps.clamp(MIN_PLAYBACK_FPS, MAX_PLAYBACK_FPS))
            .unwrap_or(fallback_fps)),
    }
}

/// Check that `frames` (sorted) are exactly `0..len` with no gaps.
pub fn verify_sequence(frames: &[StagedFrame]) -> ReelResult<()> {
    for (expected, frame) in (0u64..).zip(frames) {
        if frame.index != FrameIndex(expected) {
            return Err(ReelError::FrameSequence {
                expected,
                found: Some(frame.index.0),
            });
        }
    }
    Ok(())
}

/// Outcome of a successful assembly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssemblyReport {
    pub frames: u64,
    pub fps: f64,
    /// Playback length of the output.
    pub duration_secs: f64,
}

/// Encodes a staged frame sequence through a [`FrameSink`] and then clears the stage.
#[derive(Clone, Debug)]
pub struct VideoAssembler {
    stage: FrameStage,
    /// Rate used when a target duration cannot produce one; normally the capture fps.
    fallback_fps: f64,
}

impl VideoAssembler {
    pub fn new(stage: FrameStage, fallback_fps: f64) -> Self {
        Self {
            stage,
            fallback_fps,
        }
    }

    pub fn stage(&self) -> &FrameStage {
        &self.stage
    }

    /// Assemble every staged frame into `sink`.
    ///
    /// The staging area is cleared afterwards whether or not encoding succeeded; cleanup failures
    /// are logged and never replace the encoding result.
    #[tracing::instrument(
        level = "info",
        skip(self, sink),
        fields(dir = %self.stage.dir().display())
    )]
    pub fn assemble(
        &self,
        rate: FrameRate,
        sink: &mut dyn FrameSink,
    ) -> ReelResult<AssemblyReport> {
        let result = self.encode_staged(rate, sink);
        if let Err(e) = self.stage.clear() {
            tracing::warn!(error = %e, "failed to clean up staged frames");
        }
        match &result {
            Ok(report) => tracing::info!(
                frames = report.frames,
                fps = report.fps,
                duration_secs = report.duration_secs,
                "video assembled"
            ),
            Err(e) => tracing::error!(error = %e, "video assembly failed"),
        }
        result
    }

    /// Assemble into an MP4 at `out` using the system `ffmpeg`.
    pub fn export_mp4(&self, out: &Path, rate: FrameRate) -> ReelResult<AssemblyReport> {
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out));
        self.assemble(rate, &mut sink)
    }

    fn encode_staged(
        &self,
        rate: FrameRate,
        sink: &mut dyn FrameSink,
    ) -> ReelResult<AssemblyReport> {
        let frames = self.stage.list()?;
        verify_sequence(&frames)?;
        let Some(first) = frames.first() else {
            return Err(ReelError::FrameSequence {
                expected: 0,
                found: None,
            });
        };

        let count = frames.len() as u64;
        let fps_f = effective_fps(rate, count, self.fallback_fps)?;
        let fps = Fps::from_f64(fps_f)?;

        let first_img = load_frame(first)?;
        let (width, height) = first_img.dimensions();
        sink.begin(SinkConfig { width, height, fps })?;
        sink.push_frame(first.index, &first_img)?;
        drop(first_img);
        for frame in &frames[1..] {
            let img = load_frame(frame)?;
            sink.push_frame(frame.index, &img)?;
        }
        sink.end()?;

        Ok(AssemblyReport {
            frames: count,
            fps: fps.as_f64(),
            duration_secs: fps.frames_to_secs(count),
        })
    }
}

fn load_frame(frame: &StagedFrame) -> ReelResult<image::RgbaImage> {
    let img = image::open(&frame.path)
        .with_context(|| format!("read staged frame '{}'", frame.path.display()))?;
    Ok(img.into_rgba8())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/assemble.rs"]
mod tests;
