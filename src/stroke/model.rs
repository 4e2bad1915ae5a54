use crate::foundation::core::{DrawingSpace, Point};
use crate::foundation::error::{ReelError, ReelResult};

/// Wire shape of one stroke as produced upstream: `{x: [...], y: [...], t?: [...]}`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeDef {
    /// Waypoint x coordinates.
    #[serde(default)]
    pub x: Vec<f64>,
    /// Waypoint y coordinates, same length as `x`.
    #[serde(default)]
    pub y: Vec<f64>,
    /// Optional per-segment speed hints (`len(x) - 1` entries). Fractional values are truncated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<Vec<f64>>,
    /// Free-form label, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Coarse per-segment speed hint in `1..=5`. Higher means denser, slower apparent motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpeedHint(u8);

impl SpeedHint {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    /// Medium value used to pad missing hints.
    pub const DEFAULT: SpeedHint = SpeedHint(2);

    /// Build a hint, clamping into `1..=5`.
    pub fn clamped(v: i64) -> Self {
        Self(v.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    /// Build a hint from a wire value: truncated toward zero, then clamped. Non-finite values
    /// give the default.
    pub fn from_wire(v: f64) -> Self {
        if v.is_finite() {
            Self::clamped(v.trunc() as i64)
        } else {
            Self::DEFAULT
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for SpeedHint {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Opaque pass-through metadata. Never interpreted by the pipeline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StrokeMeta {
    pub tool: Option<String>,
    pub color: Option<String>,
    pub description: String,
}

/// A validated stroke: at least two in-bounds waypoints and exactly one hint per segment.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    /// Position of this stroke within its instruction (for error context).
    pub index: usize,
    pub waypoints: Vec<Point>,
    pub hints: Vec<SpeedHint>,
    pub meta: StrokeMeta,
}

const DESCRIPTION_MAX_CHARS: usize = 20;
const FALLBACK_WAYPOINTS: [(f64, f64); 2] = [(400.0, 250.0), (450.0, 275.0)];

impl Stroke {
    /// Build a stroke from explicit waypoints, normalizing the hint array to `len - 1` entries.
    pub fn new(index: usize, waypoints: Vec<Point>, hints: Vec<SpeedHint>) -> ReelResult<Self> {
        if waypoints.len() < 2 {
            return Err(ReelError::invalid_stroke(
                index,
                format!("need at least 2 waypoints, got {}", waypoints.len()),
            ));
        }
        if let Some(bad) = waypoints.iter().position(|p| !p.is_finite()) {
            return Err(ReelError::invalid_stroke(
                index,
                format!("waypoint {bad} is not finite"),
            ));
        }
        let hints = normalize_hints(hints, waypoints.len() - 1);
        Ok(Self {
            index,
            waypoints,
            hints,
            meta: StrokeMeta::default(),
        })
    }

    /// Validate a wire stroke against `space`.
    ///
    /// Mismatched coordinate arrays and fewer than two waypoints are rejected; hints are padded
    /// or truncated; coordinates are clamped into the drawing space.
    pub fn from_def(index: usize, def: &StrokeDef, space: DrawingSpace) -> ReelResult<Self> {
        if def.x.len() != def.y.len() {
            return Err(ReelError::invalid_stroke(
                index,
                format!(
                    "coordinate arrays differ in length (x: {}, y: {})",
                    def.x.len(),
                    def.y.len()
                ),
            ));
        }

        let waypoints: Vec<Point> = def
            .x
            .iter()
            .zip(&def.y)
            .map(|(&x, &y)| Point::new(x, y))
            .collect();
        if waypoints.iter().any(|p| !p.is_finite()) {
            return Err(ReelError::invalid_stroke(index, "non-finite coordinate"));
        }
        let waypoints = waypoints.into_iter().map(|p| space.clamp(p)).collect();

        let hints = def
            .t
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|&h| SpeedHint::from_wire(h))
            .collect();

        let mut stroke = Self::new(index, waypoints, hints)?;
        stroke.meta.description = def
            .description
            .as_deref()
            .unwrap_or("stroke")
            .chars()
            .take(DESCRIPTION_MAX_CHARS)
            .collect();
        Ok(stroke)
    }

    /// The stroke substituted for malformed input.
    ///
    /// Its waypoints are laid out on the default space and scaled to `space`, so they stay
    /// distinct and in bounds on any canvas.
    pub fn fallback(index: usize, space: DrawingSpace) -> Self {
        let reference = DrawingSpace::default();
        let sx = f64::from(space.width) / f64::from(reference.width);
        let sy = f64::from(space.height) / f64::from(reference.height);
        Self {
            index,
            waypoints: FALLBACK_WAYPOINTS
                .iter()
                .map(|&(x, y)| space.clamp(Point::new(x * sx, y * sy)))
                .collect(),
            hints: vec![SpeedHint::DEFAULT],
            meta: StrokeMeta {
                description: "fallback stroke".to_owned(),
                ..StrokeMeta::default()
            },
        }
    }

    /// Like [`Stroke::from_def`], substituting [`Stroke::fallback`] on invalid input.
    pub fn from_def_or_fallback(index: usize, def: &StrokeDef, space: DrawingSpace) -> Self {
        match Self::from_def(index, def, space) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(stroke_index = index, error = %e, "substituting fallback stroke");
                Self::fallback(index, space)
            }
        }
    }

    pub fn with_meta(mut self, meta: StrokeMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Number of inter-waypoint segments.
    pub fn segments(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }
}

fn normalize_hints(mut hints: Vec<SpeedHint>, segments: usize) -> Vec<SpeedHint> {
    if hints.len() != segments {
        tracing::debug!(
            got = hints.len(),
            expected = segments,
            "speed hint count mismatch, padding with default"
        );
    }
    hints.resize(segments, SpeedHint::DEFAULT);
    hints
}

#[cfg(test)]
#[path = "../../tests/unit/stroke/model.rs"]
mod tests;
