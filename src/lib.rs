//! strokereel replays sparse drawing strokes as paced pointer input and records the result.
//!
//! The pipeline has three stages:
//!
//! - [`SplineInterpolator`] turns a [`Stroke`] into a dense Catmull-Rom [`DenseCurve`]
//! - [`MotionPlayer`] walks the curve, emitting pointer events to a [`DrawingSurface`]
//! - [`FrameCapturer`] samples the surface in the background, and [`VideoAssembler`] encodes the
//!   staged frames into a [`FrameSink`] at a clamped playback rate
//!
//! [`DrawingSession`] wires the stages together for a whole [`SessionScript`].
#![forbid(unsafe_code)]

mod foundation;

/// Background frame capture, step overlays and frame staging.
pub mod capture;
/// Video assembly and frame sinks.
pub mod encode;
/// Sparse stroke to dense curve interpolation.
pub mod interp;
/// Paced pointer playback.
pub mod motion;
/// Session configuration and orchestration.
pub mod session;
/// Stroke and instruction input model.
pub mod stroke;
/// Drawing surface contract and implementations.
pub mod surface;
/// Duration estimates.
pub mod timing;

pub use crate::foundation::core::{DrawingSpace, Fps, FrameIndex, Point, Vec2};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::capture::capturer::{CaptureConfig, CaptureReport, FrameCapturer};
pub use crate::capture::overlay::OverlayRenderer;
pub use crate::capture::staging::{FrameStage, StagedFrame};
pub use crate::capture::step::{StepInfo, StepSlot};
pub use crate::encode::assemble::{
    AssemblyReport, FrameRate, MAX_PLAYBACK_FPS, MIN_PLAYBACK_FPS, VideoAssembler, effective_fps,
    raw_playback_fps,
};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::interp::spline::{DenseCurve, SplineInterpolator};
pub use crate::motion::player::{
    MotionPlayer, MotionTiming, Pacer, PlayerState, RecordingPacer, StrokeStats, ThreadPacer,
};
pub use crate::session::config::{DurationSource, SessionConfig};
pub use crate::session::driver::{DrawingSession, SessionReport};
pub use crate::stroke::model::{SpeedHint, Stroke, StrokeDef, StrokeMeta};
pub use crate::stroke::script::{Instruction, InstructionDef, SessionScript};
pub use crate::surface::event::{DrawingSurface, PointerState, RenderEvent};
pub use crate::surface::raster::{RasterSurface, RasterSurfaceOpts};
pub use crate::surface::recording::RecordingSurface;
pub use crate::timing::estimate::DurationEstimator;
