/// Catmull-Rom stroke densification.
pub mod spline;
