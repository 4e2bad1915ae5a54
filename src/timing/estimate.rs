use std::time::Duration;

use crate::motion::player::MotionTiming;

/// Pure wall-clock estimates for strokes, instructions and whole sessions.
///
/// - stroke: `(n - 1) * D + down_settle + up_settle + stroke_settle`
/// - instruction: sum of strokes + `instruction_settle`
/// - session: sum of instructions + one `step_pause` per instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DurationEstimator {
    pub timing: MotionTiming,
    /// Settle time when an instruction starts (tool selection).
    pub instruction_settle: Duration,
    /// Pause after each instruction.
    pub step_pause: Duration,
}

impl Default for DurationEstimator {
    fn default() -> Self {
        Self::new(MotionTiming::default())
    }
}

impl DurationEstimator {
    pub fn new(timing: MotionTiming) -> Self {
        Self {
            timing,
            instruction_settle: Duration::from_millis(500),
            step_pause: Duration::from_millis(500),
        }
    }

    /// Expected duration of one stroke whose dense curve has `dense_points` points.
    pub fn stroke(&self, dense_points: usize) -> Duration {
        if dense_points == 0 {
            return Duration::ZERO;
        }
        let advances = u32::try_from(dense_points - 1).unwrap_or(u32::MAX);
        self.timing.point_delay.saturating_mul(advances) + self.timing.settle_total()
    }

    /// Expected duration of one instruction, given the dense point count of each stroke.
    pub fn instruction(&self, dense_points: &[usize]) -> Duration {
        dense_points
            .iter()
            .map(|&n| self.stroke(n))
            .sum::<Duration>()
            + self.instruction_settle
    }

    /// Expected duration of a whole session, one slice of dense point counts per instruction.
    pub fn session<S: AsRef<[usize]>>(&self, instructions: &[S]) -> Duration {
        instructions
            .iter()
            .map(|strokes| self.instruction(strokes.as_ref()) + self.step_pause)
            .sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/estimate.rs"]
mod tests;
