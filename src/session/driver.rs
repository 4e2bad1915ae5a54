use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::capture::capturer::{CaptureReport, FrameCapturer};
use crate::capture::step::{StepInfo, StepSlot};
use crate::encode::assemble::{AssemblyReport, VideoAssembler};
use crate::encode::sink::FrameSink;
use crate::foundation::error::ReelResult;
use crate::interp::spline::{DenseCurve, SplineInterpolator};
use crate::motion::player::{MotionPlayer, MotionTiming, Pacer};
use crate::session::config::SessionConfig;
use crate::stroke::model::Stroke;
use crate::stroke::script::{Instruction, SessionScript};
use crate::surface::event::DrawingSurface;
use crate::timing::estimate::DurationEstimator;

const STARTING_DESCRIPTION: &str = "Starting drawing session...";

/// Totals for one replayed session.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SessionReport {
    pub instructions: usize,
    pub strokes: usize,
    /// Strokes whose curve had to be replaced by the fallback stroke's.
    pub fallback_curves: usize,
    pub events: usize,
    /// Estimator tally over the curves actually played.
    pub estimated: Duration,
    /// Wall-clock time from the opening of the capture bracket to the end of playback.
    pub measured: Duration,
    pub capture: CaptureReport,
}

/// Replays a [`SessionScript`] onto a surface while capturing frames in the background.
pub struct DrawingSession {
    cfg: SessionConfig,
    surface: Arc<dyn DrawingSurface>,
    step: StepSlot,
    capturer: FrameCapturer,
    interpolator: SplineInterpolator,
    timing: MotionTiming,
    estimator: DurationEstimator,
}

impl DrawingSession {
    pub fn new(surface: Arc<dyn DrawingSurface>, cfg: SessionConfig) -> ReelResult<Self> {
        cfg.validate()?;
        if surface.space() != cfg.canvas {
            tracing::warn!(
                surface = ?surface.space(),
                canvas = ?cfg.canvas,
                "surface extent differs from configured canvas; clamping to the surface"
            );
        }
        let step = StepSlot::new();
        let capturer =
            FrameCapturer::new(Arc::clone(&surface), step.clone(), cfg.capture_config()?)?;
        Ok(Self {
            timing: cfg.motion_timing(),
            estimator: cfg.estimator(),
            interpolator: SplineInterpolator::default(),
            cfg,
            surface,
            step,
            capturer,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.cfg
    }

    pub fn step_slot(&self) -> &StepSlot {
        &self.step
    }

    pub fn capturer(&self) -> &FrameCapturer {
        &self.capturer
    }

    /// Play every instruction of `script`, capturing frames throughout.
    ///
    /// The capture bracket is always closed before this returns, including on error.
    #[tracing::instrument(
        level = "info",
        skip_all,
        fields(instructions = script.instructions.len())
    )]
    pub fn run(
        &mut self,
        script: &SessionScript,
        pacer: &mut dyn Pacer,
    ) -> ReelResult<SessionReport> {
        let instructions = script.instructions(self.surface.space());

        self.capturer.begin_session()?;
        self.step.publish(StepInfo::new(0, STARTING_DESCRIPTION));
        match self.capturer.capture_now() {
            Ok(_) => {}
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, "starting frame not captured");
            }
            Err(e) => return Err(e),
        }
        self.capturer.start()?;

        let started = Instant::now();
        let played = self.play_all(&instructions, pacer);
        let measured = started.elapsed();
        let stopped = self.capturer.stop();

        let mut report = played?;
        stopped?;
        report.measured = measured;
        report.capture = self.capturer.session_report();

        tracing::info!(
            instructions = report.instructions,
            strokes = report.strokes,
            frames = self.capturer.frame_count(),
            estimated_secs = report.estimated.as_secs_f64(),
            measured_secs = measured.as_secs_f64(),
            "session finished"
        );
        Ok(report)
    }

    /// Encode the frames staged by the last [`run`](Self::run) into `sink`.
    pub fn export(
        &self,
        report: &SessionReport,
        sink: &mut dyn FrameSink,
    ) -> ReelResult<AssemblyReport> {
        let rate = self.cfg.frame_rate(report.estimated, report.measured);
        self.assembler().assemble(rate, sink)
    }

    pub fn assembler(&self) -> VideoAssembler {
        VideoAssembler::new(self.capturer.stage().clone(), f64::from(self.cfg.capture_fps))
    }

    fn play_all(
        &self,
        instructions: &[Instruction],
        pacer: &mut dyn Pacer,
    ) -> ReelResult<SessionReport> {
        let mut report = SessionReport::default();
        let mut dense_counts: Vec<Vec<usize>> = Vec::with_capacity(instructions.len());
        let mut player = MotionPlayer::new(&*self.surface, self.timing)?;

        for instruction in instructions {
            tracing::info!(
                step = instruction.step_number,
                strokes = instruction.strokes.len(),
                description = %instruction.description,
                "starting instruction"
            );
            self.step.publish(StepInfo::new(
                instruction.step_number,
                instruction.description.clone(),
            ));
            pacer.pause(self.estimator.instruction_settle);

            let mut counts = Vec::with_capacity(instruction.strokes.len());
            for stroke in &instruction.strokes {
                let curve = self.curve_for(stroke, &mut report)?;
                let stats = player.play(stroke.index, &curve, pacer)?;
                counts.push(curve.len());
                report.strokes += 1;
                report.events += stats.events;
            }
            tracing::debug!(
                step = instruction.step_number,
                estimated_secs = self.estimator.instruction(&counts).as_secs_f64(),
                "instruction played"
            );
            dense_counts.push(counts);
            report.instructions += 1;

            pacer.pause(self.estimator.step_pause);
        }

        report.estimated = self.estimator.session(&dense_counts);
        Ok(report)
    }

    fn curve_for(&self, stroke: &Stroke, report: &mut SessionReport) -> ReelResult<DenseCurve> {
        match self.interpolator.interpolate(stroke) {
            Ok(curve) => Ok(curve),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, "interpolation failed, drawing fallback stroke");
                report.fallback_curves += 1;
                self.interpolator
                    .interpolate(&Stroke::fallback(stroke.index, self.surface.space()))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/driver.rs"]
mod tests;
