use crate::foundation::error::{ReelError, ReelResult};

pub use kurbo::{Point, Vec2};

/// Absolute 0-based index of a staged capture frame within one session.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// The index following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Resolution used when converting a fractional playback rate into a rational.
    const MILLI: u32 = 1000;

    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if den == 0 {
            return Err(ReelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ReelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert a fractional rate (e.g. `12.5`) into a rational with millihertz precision.
    pub fn from_f64(fps: f64) -> ReelResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(ReelError::validation(format!(
                "fps must be finite and > 0, got {fps}"
            )));
        }
        let num = (fps * f64::from(Self::MILLI)).round();
        if num < 1.0 || num > f64::from(u32::MAX) {
            return Err(ReelError::validation(format!("fps {fps} is out of range")));
        }
        let num = num as u32;
        let g = gcd(num, Self::MILLI);
        Self::new(num / g, Self::MILLI / g)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

/// Fixed extent of the drawing coordinate space (origin top-left).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DrawingSpace {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for DrawingSpace {
    fn default() -> Self {
        Self {
            width: 850,
            height: 500,
        }
    }
}

impl DrawingSpace {
    /// Create a validated, non-empty drawing space.
    pub fn new(width: u32, height: u32) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::validation(
                "drawing space width/height must be non-zero",
            ));
        }
        Ok(Self { width, height })
    }

    /// Clamp a point into `[0, width] x [0, height]`.
    pub fn clamp(self, p: Point) -> Point {
        Point::new(
            p.x.clamp(0.0, f64::from(self.width)),
            p.y.clamp(0.0, f64::from(self.height)),
        )
    }

    /// Return `true` when `p` lies inside the (inclusive) extent.
    pub fn contains(self, p: Point) -> bool {
        (0.0..=f64::from(self.width)).contains(&p.x)
            && (0.0..=f64::from(self.height)).contains(&p.y)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
