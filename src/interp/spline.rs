use crate::foundation::core::Point;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::{axis_distance, catmull_rom, reflect};
use crate::stroke::model::{SpeedHint, Stroke};

/// Samples closer than this (per axis, in pixels) to the previous sample are dropped.
pub const DEDUP_THRESHOLD_PX: f64 = 1.0;

/// Densely interpolated, deduplicated point sequence for one stroke.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct DenseCurve {
    points: Vec<Point>,
}

impl DenseCurve {
    /// Wrap points that are already dense, e.g. a recorded path.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

/// Stage 1: sparse waypoints + speed hints to a dense Catmull-Rom curve.
#[derive(Clone, Copy, Debug)]
pub struct SplineInterpolator {
    pub min_steps: usize,
    pub max_steps: usize,
    pub dedup_threshold: f64,
}

impl Default for SplineInterpolator {
    fn default() -> Self {
        Self {
            min_steps: 2,
            max_steps: 8,
            dedup_threshold: DEDUP_THRESHOLD_PX,
        }
    }
}

impl SplineInterpolator {
    /// Samples per segment for `hint`: `clamp(hint * 2, min_steps, max_steps)`.
    pub fn steps_for(&self, hint: SpeedHint) -> usize {
        (usize::from(hint.get()) * 2).clamp(self.min_steps, self.max_steps.max(self.min_steps))
    }

    #[tracing::instrument(level = "debug", skip_all, fields(stroke_index = stroke.index))]
    pub fn interpolate(&self, stroke: &Stroke) -> ReelResult<DenseCurve> {
        let pts = &stroke.waypoints;
        let n = pts.len();
        if n < 2 {
            return Err(ReelError::invalid_stroke(
                stroke.index,
                format!("need at least 2 waypoints, got {n}"),
            ));
        }

        let mut out: Vec<Point> = Vec::with_capacity(n * self.max_steps);
        for i in 0..n - 1 {
            let p1 = pts[i];
            let p2 = pts[i + 1];
            let p0 = if i == 0 { reflect(p1, p2) } else { pts[i - 1] };
            let p3 = if i + 2 < n { pts[i + 2] } else { reflect(p2, p1) };

            let hint = stroke.hints.get(i).copied().unwrap_or_default();
            let steps = self.steps_for(hint);
            for k in 0..steps {
                let t = k as f64 / (steps - 1) as f64;
                let p = catmull_rom(p0, p1, p2, p3, t);
                match out.last() {
                    Some(&last) if axis_distance(p, last) <= self.dedup_threshold => {}
                    _ => out.push(p),
                }
            }
        }

        // Land exactly on the final waypoint even when its sample was absorbed.
        let end = pts[n - 1];
        let len = out.len();
        if let Some(last) = out.last_mut()
            && *last != end
        {
            if len > 1 {
                *last = end;
            } else {
                out.push(end);
            }
        }

        tracing::debug!(waypoints = n, dense = out.len(), "interpolated stroke");
        Ok(DenseCurve { points: out })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interp/spline.rs"]
mod tests;
