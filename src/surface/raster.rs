use parking_lot::Mutex;
use resvg::tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

use crate::foundation::core::{DrawingSpace, Point};
use crate::foundation::error::{ReelError, ReelResult};
use crate::surface::event::{DrawingSurface, PointerState, RenderEvent};

/// Options for [`RasterSurface`].
#[derive(Clone, Copy, Debug)]
pub struct RasterSurfaceOpts {
    /// Background color (straight RGBA8).
    pub paper_rgba: [u8; 4],
    /// Ink color (straight RGBA8).
    pub ink_rgba: [u8; 4],
    /// Line width in pixels.
    pub line_width: f32,
}

impl Default for RasterSurfaceOpts {
    fn default() -> Self {
        Self {
            paper_rgba: [255, 255, 255, 255],
            ink_rgba: [20, 20, 24, 255],
            line_width: 3.0,
        }
    }
}

struct RasterState {
    pixmap: Pixmap,
    pen: Option<Point>,
}

/// Reference in-process surface: a single-ink tiny-skia raster that draws line segments between
/// consecutive pointer positions while the pointer is down.
pub struct RasterSurface {
    space: DrawingSpace,
    opts: RasterSurfaceOpts,
    state: Mutex<RasterState>,
}

impl RasterSurface {
    pub fn new(space: DrawingSpace, opts: RasterSurfaceOpts) -> ReelResult<Self> {
        let mut pixmap = Pixmap::new(space.width, space.height)
            .ok_or_else(|| ReelError::validation("failed to allocate raster surface pixmap"))?;
        let [r, g, b, a] = opts.paper_rgba;
        pixmap.fill(Color::from_rgba8(r, g, b, a));
        Ok(Self {
            space,
            opts,
            state: Mutex::new(RasterState { pixmap, pen: None }),
        })
    }

    fn paint(&self) -> Paint<'static> {
        let [r, g, b, a] = self.opts.ink_rgba;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;
        paint
    }

    fn dot(&self, pixmap: &mut Pixmap, at: Point) {
        let radius = (self.opts.line_width * 0.5).max(0.5);
        if let Some(path) = PathBuilder::from_circle(at.x as f32, at.y as f32, radius) {
            pixmap.fill_path(
                &path,
                &self.paint(),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn segment(&self, pixmap: &mut Pixmap, from: Point, to: Point) {
        if from == to {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        let Some(path) = pb.finish() else {
            return;
        };
        let stroke = Stroke {
            width: self.opts.line_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &self.paint(), &stroke, Transform::identity(), None);
    }
}

impl DrawingSurface for RasterSurface {
    fn space(&self) -> DrawingSpace {
        self.space
    }

    fn dispatch(&self, event: RenderEvent) -> ReelResult<()> {
        let at = self.space.clamp(event.position);
        let mut guard = self.state.lock();
        let state = &mut *guard;
        match event.state {
            PointerState::Down => {
                self.dot(&mut state.pixmap, at);
                state.pen = Some(at);
            }
            PointerState::Move => {
                if let Some(from) = state.pen {
                    self.segment(&mut state.pixmap, from, at);
                    state.pen = Some(at);
                }
            }
            PointerState::Up => {
                if let Some(from) = state.pen.take() {
                    self.segment(&mut state.pixmap, from, at);
                }
            }
        }
        Ok(())
    }

    fn snapshot(&self) -> ReelResult<image::RgbaImage> {
        let guard = self.state.lock();
        let (w, h) = (guard.pixmap.width(), guard.pixmap.height());
        let mut data = Vec::with_capacity(rgba_len(w, h));
        for px in guard.pixmap.pixels() {
            let c = px.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        drop(guard);
        image::RgbaImage::from_raw(w, h, data)
            .ok_or_else(|| ReelError::validation("raster snapshot buffer size mismatch"))
    }
}

/// Byte length of a `w` x `h` RGBA8 buffer.
fn rgba_len(w: u32, h: u32) -> usize {
    w as usize * h as usize * 4
}

#[cfg(test)]
#[path = "../../tests/unit/surface/raster.rs"]
mod tests;
