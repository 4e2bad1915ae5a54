use crate::foundation::core::{DrawingSpace, Point};
use crate::foundation::error::ReelResult;

/// Pointer state carried by a [`RenderEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerState {
    Down,
    Move,
    Up,
}

/// One pointer emission sent to the surface, in drawing-space coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct RenderEvent {
    pub position: Point,
    pub state: PointerState,
}

impl RenderEvent {
    pub fn new(position: Point, state: PointerState) -> Self {
        Self { position, state }
    }
}

/// The external drawable surface.
///
/// The motion driver writes events while the frame capturer concurrently reads snapshots, so
/// both methods take `&self`; implementations synchronize internally.
pub trait DrawingSurface: Send + Sync {
    /// Extent of the coordinate space accepted by [`DrawingSurface::dispatch`].
    fn space(&self) -> DrawingSpace;

    /// Deliver one pointer event. May block; errors are treated as a stalled surface.
    fn dispatch(&self, event: RenderEvent) -> ReelResult<()>;

    /// Read back the current surface contents as straight-alpha RGBA8.
    fn snapshot(&self) -> ReelResult<image::RgbaImage>;
}
