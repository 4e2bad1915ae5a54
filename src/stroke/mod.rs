//! Stroke input model: wire shapes from the upstream producer and their validated forms.

/// Strokes, speed hints and fallback substitution.
pub mod model;
/// Instructions and session scripts.
pub mod script;
