use super::*;

fn def(x: &[f64], y: &[f64], t: Option<&[f64]>) -> StrokeDef {
    StrokeDef {
        x: x.to_vec(),
        y: y.to_vec(),
        t: t.map(<[f64]>::to_vec),
        description: None,
    }
}

#[test]
fn speed_hint_clamps_into_range() {
    assert_eq!(SpeedHint::clamped(0).get(), 1);
    assert_eq!(SpeedHint::clamped(3).get(), 3);
    assert_eq!(SpeedHint::clamped(99).get(), 5);
    assert_eq!(SpeedHint::default().get(), 2);
}

#[test]
fn wire_hints_truncate_then_clamp() {
    assert_eq!(SpeedHint::from_wire(3.0).get(), 3);
    assert_eq!(SpeedHint::from_wire(2.5).get(), 2);
    assert_eq!(SpeedHint::from_wire(0.9).get(), 1);
    assert_eq!(SpeedHint::from_wire(-4.0).get(), 1);
    assert_eq!(SpeedHint::from_wire(12.7).get(), 5);
    assert_eq!(SpeedHint::from_wire(f64::NAN), SpeedHint::DEFAULT);
}

#[test]
fn new_requires_two_finite_waypoints() {
    let one = Stroke::new(0, vec![Point::new(1.0, 1.0)], vec![]);
    assert!(matches!(one, Err(ReelError::InvalidStroke { stroke_index: 0, .. })));

    let nan = Stroke::new(
        4,
        vec![Point::new(1.0, 1.0), Point::new(f64::NAN, 2.0)],
        vec![],
    );
    assert!(matches!(nan, Err(ReelError::InvalidStroke { stroke_index: 4, .. })));
}

#[test]
fn hints_are_padded_and_truncated_to_segment_count() {
    let space = DrawingSpace::default();
    let three = def(&[0.0, 10.0, 20.0], &[0.0, 0.0, 0.0], Some(&[4.0]));
    let padded = Stroke::from_def(0, &three, space).unwrap();
    assert_eq!(padded.hints, vec![SpeedHint::clamped(4), SpeedHint::DEFAULT]);

    let two = def(&[0.0, 10.0], &[0.0, 0.0], Some(&[1.0, 5.0, 5.0]));
    let truncated = Stroke::from_def(0, &two, space).unwrap();
    assert_eq!(truncated.hints, vec![SpeedHint::clamped(1)]);

    let missing =
        Stroke::from_def(0, &def(&[0.0, 10.0, 20.0], &[0.0, 0.0, 0.0], None), space).unwrap();
    assert_eq!(missing.hints, vec![SpeedHint::DEFAULT; 2]);
}

#[test]
fn from_def_clamps_coordinates_into_space() {
    let space = DrawingSpace::default();
    let s = Stroke::from_def(0, &def(&[-20.0, 900.0], &[10.0, 600.0], None), space).unwrap();
    assert_eq!(s.waypoints, vec![Point::new(0.0, 10.0), Point::new(850.0, 500.0)]);
}

#[test]
fn from_def_rejects_mismatched_arrays() {
    let mismatched = def(&[0.0, 1.0, 2.0], &[0.0, 1.0], None);
    let err = Stroke::from_def(2, &mismatched, DrawingSpace::default()).unwrap_err();
    assert!(matches!(err, ReelError::InvalidStroke { stroke_index: 2, .. }));
}

#[test]
fn description_defaults_and_is_truncated() {
    let space = DrawingSpace::default();
    let plain = Stroke::from_def(0, &def(&[0.0, 1.0], &[0.0, 1.0], None), space).unwrap();
    assert_eq!(plain.meta.description, "stroke");

    let mut long = def(&[0.0, 1.0], &[0.0, 1.0], None);
    long.description = Some("a very long stroke description indeed".to_owned());
    let s = Stroke::from_def(0, &long, space).unwrap();
    assert_eq!(s.meta.description.chars().count(), 20);
}

#[test]
fn invalid_def_falls_back() {
    let s = Stroke::from_def_or_fallback(7, &def(&[5.0], &[5.0], None), DrawingSpace::default());
    assert_eq!(s.index, 7);
    assert_eq!(s.waypoints, vec![Point::new(400.0, 250.0), Point::new(450.0, 275.0)]);
    assert_eq!(s.hints, vec![SpeedHint::DEFAULT]);
    assert_eq!(s.segments(), 1);
}

#[test]
fn stroke_def_parses_wire_json() {
    let d: StrokeDef =
        serde_json::from_str(r#"{"x":[1,2,3],"y":[4,5,6],"t":[1,3],"description":"arc"}"#).unwrap();
    assert_eq!(d.x, vec![1.0, 2.0, 3.0]);
    assert_eq!(d.t, Some(vec![1.0, 3.0]));
    assert_eq!(d.description.as_deref(), Some("arc"));
}

#[test]
fn fallback_scales_into_small_spaces() {
    let small = DrawingSpace::new(64, 48).unwrap();
    let s = Stroke::fallback(0, small);
    assert_eq!(s.waypoints.len(), 2);
    assert!(s.waypoints.iter().all(|&p| small.contains(p)));
    assert_ne!(s.waypoints[0], s.waypoints[1]);

    let default = Stroke::fallback(0, DrawingSpace::default());
    assert_eq!(default.waypoints, vec![Point::new(400.0, 250.0), Point::new(450.0, 275.0)]);
}
