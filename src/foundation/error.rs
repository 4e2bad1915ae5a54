pub type ReelResult<T> = Result<T, ReelError>;

#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid stroke #{stroke_index}: {reason}")]
    InvalidStroke { stroke_index: usize, reason: String },

    #[error("capture tick for frame {frame_index} failed: {reason}")]
    CaptureTick { frame_index: u64, reason: String },

    #[error("frame sequence error: expected frame {expected}, found {}", found_label(.found))]
    FrameSequence { expected: u64, found: Option<u64> },

    #[error("rendering surface stalled on stroke #{stroke_index}: {reason}")]
    SurfaceStall { stroke_index: usize, reason: String },

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn found_label(found: &Option<u64>) -> String {
    match found {
        Some(idx) => format!("frame {idx}"),
        None => "end of sequence".to_owned(),
    }
}

impl ReelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_stroke(stroke_index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidStroke {
            stroke_index,
            reason: reason.into(),
        }
    }

    pub fn capture_tick(frame_index: u64, reason: impl std::fmt::Display) -> Self {
        Self::CaptureTick {
            frame_index,
            reason: reason.to_string(),
        }
    }

    pub fn surface_stall(stroke_index: usize, reason: impl std::fmt::Display) -> Self {
        Self::SurfaceStall {
            stroke_index,
            reason: reason.to_string(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Errors the session recovers from locally (fallback stroke, skipped tick).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidStroke { .. } | Self::CaptureTick { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
