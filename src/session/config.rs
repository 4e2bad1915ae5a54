use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::capture::capturer::CaptureConfig;
use crate::encode::assemble::FrameRate;
use crate::foundation::core::DrawingSpace;
use crate::foundation::error::{ReelError, ReelResult};
use crate::motion::player::MotionTiming;
use crate::timing::estimate::DurationEstimator;

/// Which duration the exported video is stretched to when no explicit target is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationSource {
    /// The estimator's tally for the played curves.
    #[default]
    Estimated,
    /// Wall-clock time the playback actually took.
    Measured,
}

/// Everything a drawing session needs, loadable from JSON. Missing fields take defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub canvas: DrawingSpace,
    pub point_delay_ms: u64,
    pub substeps: u32,
    pub down_settle_ms: u64,
    pub up_settle_ms: u64,
    pub stroke_settle_ms: u64,
    pub instruction_settle_ms: u64,
    pub step_pause_ms: u64,
    pub capture_fps: u32,
    pub overlay: bool,
    pub staging_dir: PathBuf,
    /// Fixed output rate; bypasses duration fitting and clamping.
    pub output_fps: Option<f64>,
    /// Fixed target duration; takes precedence over `duration_source`.
    pub target_duration_secs: Option<f64>,
    pub duration_source: DurationSource,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let timing = MotionTiming::default();
        let estimator = DurationEstimator::new(timing);
        Self {
            canvas: DrawingSpace::default(),
            point_delay_ms: millis(timing.point_delay),
            substeps: timing.substeps,
            down_settle_ms: millis(timing.down_settle),
            up_settle_ms: millis(timing.up_settle),
            stroke_settle_ms: millis(timing.stroke_settle),
            instruction_settle_ms: millis(estimator.instruction_settle),
            step_pause_ms: millis(estimator.step_pause),
            capture_fps: 30,
            overlay: true,
            staging_dir: PathBuf::from("temp_frames"),
            output_fps: None,
            target_duration_secs: None,
            duration_source: DurationSource::Estimated,
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl SessionConfig {
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        let cfg: Self = serde_json::from_str(s).context("parse session config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read session config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ReelError::validation("canvas width/height must be non-zero"));
        }
        if self.substeps == 0 {
            return Err(ReelError::validation("substeps must be non-zero"));
        }
        if self.capture_fps == 0 {
            return Err(ReelError::validation("capture_fps must be non-zero"));
        }
        if self.staging_dir.as_os_str().is_empty() {
            return Err(ReelError::validation("staging_dir must not be empty"));
        }
        if let Some(fps) = self.output_fps
            && (!fps.is_finite() || fps <= 0.0)
        {
            return Err(ReelError::validation(format!(
                "output_fps must be finite and > 0, got {fps}"
            )));
        }
        if let Some(secs) = self.target_duration_secs
            && (secs <= 0.0 || Duration::try_from_secs_f64(secs).is_err())
        {
            return Err(ReelError::validation(format!(
                "target_duration_secs must be > 0 and representable as a duration, got {secs}"
            )));
        }
        Ok(())
    }

    pub fn motion_timing(&self) -> MotionTiming {
        MotionTiming {
            point_delay: Duration::from_millis(self.point_delay_ms),
            substeps: self.substeps,
            down_settle: Duration::from_millis(self.down_settle_ms),
            up_settle: Duration::from_millis(self.up_settle_ms),
            stroke_settle: Duration::from_millis(self.stroke_settle_ms),
        }
    }

    pub fn estimator(&self) -> DurationEstimator {
        DurationEstimator {
            instruction_settle: Duration::from_millis(self.instruction_settle_ms),
            step_pause: Duration::from_millis(self.step_pause_ms),
            ..DurationEstimator::new(self.motion_timing())
        }
    }

    pub fn capture_config(&self) -> ReelResult<CaptureConfig> {
        Ok(CaptureConfig {
            tick: CaptureConfig::tick_for_fps(self.capture_fps)?,
            overlay: self.overlay,
            staging_dir: self.staging_dir.clone(),
        })
    }

    /// The output rate rule for a session that was estimated at `estimated` and took `measured`.
    pub fn frame_rate(&self, estimated: Duration, measured: Duration) -> FrameRate {
        if let Some(fps) = self.output_fps {
            return FrameRate::Explicit(fps);
        }
        let fixed = self
            .target_duration_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok());
        let target = match (fixed, self.duration_source) {
            (Some(target), _) => target,
            (None, DurationSource::Estimated) => estimated,
            (None, DurationSource::Measured) => measured,
        };
        FrameRate::TargetDuration(target)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
