use super::*;
use crate::foundation::core::DrawingSpace;
use crate::interp::spline::SplineInterpolator;
use crate::motion::player::{MotionPlayer, RecordingPacer};
use crate::stroke::model::{Stroke, StrokeDef};
use crate::surface::recording::RecordingSurface;

fn stroke(xs: &[f64], ys: &[f64], hints: &[i64]) -> Stroke {
    let def = StrokeDef {
        x: xs.to_vec(),
        y: ys.to_vec(),
        t: Some(hints.iter().map(|&h| h as f64).collect()),
        description: None,
    };
    Stroke::from_def(0, &def, DrawingSpace::default()).unwrap()
}

#[test]
fn default_stroke_matches_fifty_ms_per_point_plus_settle() {
    let e = DurationEstimator::default();
    assert_eq!(e.stroke(0), Duration::ZERO);
    assert_eq!(e.stroke(1), Duration::from_millis(650));
    assert_eq!(e.stroke(10), Duration::from_millis(9 * 50 + 650));
}

#[test]
fn instruction_and_session_add_fixed_pauses() {
    let e = DurationEstimator::default();
    assert_eq!(e.instruction(&[]), Duration::from_millis(500));
    assert_eq!(
        e.instruction(&[2, 3]),
        Duration::from_millis(700 + 750 + 500)
    );
    let session = e.session(&[vec![2], vec![], vec![3, 3]]);
    let expected = (e.instruction(&[2]) + e.step_pause)
        + (e.instruction(&[]) + e.step_pause)
        + (e.instruction(&[3, 3]) + e.step_pause);
    assert_eq!(session, expected);
    assert_eq!(e.session::<Vec<usize>>(&[]), Duration::ZERO);
}

#[test]
fn estimate_matches_played_duration() {
    let interp = SplineInterpolator::default();
    let estimator = DurationEstimator::default();
    let surface = RecordingSurface::new(DrawingSpace::default());
    let mut player = MotionPlayer::new(&surface, estimator.timing).unwrap();

    let strokes = [
        stroke(&[100.0, 400.0], &[200.0, 200.0], &[2]),
        stroke(
            &[100.0, 200.0, 300.0, 420.0],
            &[300.0, 150.0, 330.0, 180.0],
            &[1, 5, 2],
        ),
        stroke(&[600.0, 700.0], &[100.0, 400.0], &[3]),
    ];
    for s in &strokes {
        let curve = interp.interpolate(s).unwrap();
        let mut pacer = RecordingPacer::new();
        let stats = player.play(0, &curve, &mut pacer).unwrap();
        let expected = estimator.timing.point_delay * (curve.len() as u32 - 1)
            + Duration::from_millis(650);
        assert_eq!(estimator.stroke(curve.len()), expected);
        assert_eq!(stats.nominal, expected);
        assert_eq!(pacer.total(), expected);
    }
}

#[test]
fn custom_timing_flows_into_stroke_estimate() {
    let timing = MotionTiming {
        point_delay: Duration::from_millis(10),
        down_settle: Duration::ZERO,
        up_settle: Duration::ZERO,
        stroke_settle: Duration::ZERO,
        ..MotionTiming::default()
    };
    let e = DurationEstimator::new(timing);
    assert_eq!(e.stroke(11), Duration::from_millis(100));
}
