//! The drawable surface contract and the in-crate implementations of it.

/// Pointer events and the [`event::DrawingSurface`] trait.
pub mod event;
/// Reference tiny-skia raster surface.
pub mod raster;
/// Recording test double.
pub mod recording;
