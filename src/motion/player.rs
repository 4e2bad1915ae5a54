use std::time::Duration;

use crate::foundation::error::{ReelError, ReelResult};
use crate::interp::spline::DenseCurve;
use crate::surface::event::{DrawingSurface, PointerState, RenderEvent};

/// Fixed pacing constants for stroke playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionTiming {
    /// Advance delay per dense point (`D`).
    pub point_delay: Duration,
    /// Linear sub-steps between consecutive dense points.
    pub substeps: u32,
    /// Pause after pointer-down before the first move.
    pub down_settle: Duration,
    /// Pause after the last move before pointer-up.
    pub up_settle: Duration,
    /// Pause after pointer-up before the stroke counts as finished.
    pub stroke_settle: Duration,
}

impl Default for MotionTiming {
    fn default() -> Self {
        Self {
            point_delay: Duration::from_millis(50),
            substeps: 2,
            down_settle: Duration::from_millis(100),
            up_settle: Duration::from_millis(50),
            stroke_settle: Duration::from_millis(500),
        }
    }
}

impl MotionTiming {
    pub fn validate(&self) -> ReelResult<()> {
        if self.substeps == 0 {
            return Err(ReelError::validation("motion substeps must be non-zero"));
        }
        Ok(())
    }

    /// Pause between two sub-steps: `point_delay / substeps`.
    pub fn substep_delay(&self) -> Duration {
        self.point_delay / self.substeps.max(1)
    }

    /// Sum of the fixed per-stroke settle delays.
    pub fn settle_total(&self) -> Duration {
        self.down_settle + self.up_settle + self.stroke_settle
    }
}

/// Realizes the pauses between pointer emissions.
pub trait Pacer: Send {
    fn pause(&mut self, d: Duration);
}

/// Blocks the calling thread for the requested duration.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, d: Duration) {
        if !d.is_zero() {
            std::thread::sleep(d);
        }
    }
}

/// Accumulates requested pauses without sleeping.
#[derive(Clone, Debug, Default)]
pub struct RecordingPacer {
    pauses: Vec<Duration>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> &[Duration] {
        &self.pauses
    }

    pub fn total(&self) -> Duration {
        self.pauses.iter().sum()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&mut self, d: Duration) {
        self.pauses.push(d);
    }
}

/// Playback state machine: `Idle -> Down -> Moving -> Up -> Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerState {
    #[default]
    Idle,
    Down,
    Moving,
    Up,
}

/// Summary of one played stroke.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StrokeStats {
    pub events: usize,
    /// Sum of all pauses requested from the pacer.
    pub nominal: Duration,
}

/// Walks a dense curve, emitting sub-stepped pointer events to a surface at a fixed pace.
pub struct MotionPlayer<'a> {
    surface: &'a dyn DrawingSurface,
    timing: MotionTiming,
    state: PlayerState,
}

impl<'a> MotionPlayer<'a> {
    pub fn new(surface: &'a dyn DrawingSurface, timing: MotionTiming) -> ReelResult<Self> {
        timing.validate()?;
        Ok(Self {
            surface,
            timing,
            state: PlayerState::Idle,
        })
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn timing(&self) -> MotionTiming {
        self.timing
    }

    /// Play `curve` to completion. There is no cancellation once the pointer is down.
    ///
    /// A failing dispatch surfaces as [`ReelError::SurfaceStall`] and is not retried.
    pub fn play(
        &mut self,
        stroke_index: usize,
        curve: &DenseCurve,
        pacer: &mut dyn Pacer,
    ) -> ReelResult<StrokeStats> {
        let pts = curve.points();
        let (Some(&first), Some(&last)) = (pts.first(), pts.last()) else {
            return Err(ReelError::invalid_stroke(stroke_index, "empty dense curve"));
        };

        let mut stats = StrokeStats::default();

        self.emit(stroke_index, first, PointerState::Down, &mut stats)?;
        self.state = PlayerState::Down;
        wait(pacer, self.timing.down_settle, &mut stats);

        let step = self.timing.substep_delay();
        let substeps = self.timing.substeps;
        for pair in pts.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            for s in 1..=substeps {
                wait(pacer, step, &mut stats);
                let at = from.lerp(to, f64::from(s) / f64::from(substeps));
                self.emit(stroke_index, at, PointerState::Move, &mut stats)?;
                self.state = PlayerState::Moving;
            }
        }

        wait(pacer, self.timing.up_settle, &mut stats);
        self.emit(stroke_index, last, PointerState::Up, &mut stats)?;
        self.state = PlayerState::Up;
        wait(pacer, self.timing.stroke_settle, &mut stats);
        self.state = PlayerState::Idle;

        tracing::debug!(
            stroke_index,
            dense = pts.len(),
            events = stats.events,
            nominal_ms = stats.nominal.as_millis() as u64,
            "stroke played"
        );
        Ok(stats)
    }

    fn emit(
        &self,
        stroke_index: usize,
        at: kurbo::Point,
        state: PointerState,
        stats: &mut StrokeStats,
    ) -> ReelResult<()> {
        self.surface
            .dispatch(RenderEvent::new(at, state))
            .map_err(|e| ReelError::surface_stall(stroke_index, e))?;
        stats.events += 1;
        Ok(())
    }
}

fn wait(pacer: &mut dyn Pacer, d: Duration, stats: &mut StrokeStats) {
    pacer.pause(d);
    stats.nominal += d;
}

#[cfg(test)]
#[path = "../../tests/unit/motion/player.rs"]
mod tests;
