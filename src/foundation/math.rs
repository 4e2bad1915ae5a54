use kurbo::Point;

/// Evaluate a uniform Catmull-Rom segment between `p1` and `p2` at `t` in `[0, 1]`.
pub(crate) fn catmull_rom(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let t2 = t * t;
    let t3 = t2 * t;
    let (a, b, c, d) = (p0.to_vec2(), p1.to_vec2(), p2.to_vec2(), p3.to_vec2());

    let v = (b * 2.0
        + (c - a) * t
        + (a * 2.0 - b * 5.0 + c * 4.0 - d) * t2
        + (b * 3.0 - a - c * 3.0 + d) * t3)
        * 0.5;
    v.to_point()
}

/// Linear extrapolation of `from` one step past `anchor` (i.e. `2 * anchor - from`).
pub(crate) fn reflect(anchor: Point, from: Point) -> Point {
    anchor + (anchor - from)
}

/// Per-axis (Chebyshev) distance between two points.
pub(crate) fn axis_distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
