use super::*;

#[test]
fn linear_is_identity() {
    for i in 0..=10 {
        let x = f64::from(i) / 10.0;
        assert_eq!(Linear.tween(x), x);
    }
}

#[test]
fn linear_handles_reproduce_linear() {
    let curve = CubicBezier::new(0.25, 0.25, 0.75, 0.75);
    for i in 0..=20 {
        let x = f64::from(i) / 20.0;
        assert!((curve.tween(x) - x).abs() < 1e-4, "x={x}");
    }
    let path = BezierPath::linear();
    for i in 0..=20 {
        let x = f64::from(i) / 20.0;
        assert!((path.tween(x) - x).abs() < 1e-4, "x={x}");
    }
}

#[test]
fn symmetric_segment_midpoint() {
    let path = BezierPath::ease_in_out();
    assert!((path.solve_for_y(0, 0.5) - 0.5).abs() < 1e-4);
}

#[test]
fn presets_hit_endpoints() {
    let presets = [
        BezierPath::linear(),
        BezierPath::ease_in_out(),
        BezierPath::s_curve_with_bump(),
        BezierPath::three_step(),
        BezierPath::multi_bounce(),
        BezierPath::wave(),
    ];
    for p in &presets {
        assert!(p.tween(0.0).abs() < 1e-9, "{p:?}");
        assert!((p.tween(1.0) - 1.0).abs() < 1e-9, "{p:?}");
    }
    for c in [
        CubicBezier::ease(),
        CubicBezier::ease_in(),
        CubicBezier::ease_out(),
        CubicBezier::ease_in_out(),
    ] {
        assert!(c.tween(0.0).abs() < 1e-9);
        assert!((c.tween(1.0) - 1.0).abs() < 1e-9);
    }
}

#[test]
fn ease_in_lags_linear() {
    let c = CubicBezier::ease_in();
    assert!(c.tween(0.3) < 0.3);
    let c = CubicBezier::ease_out();
    assert!(c.tween(0.3) > 0.3);
}

#[test]
fn path_needs_two_points() {
    let err = BezierPath::new(&[BezierPoint::new(0.0, 0.0)]).unwrap_err();
    assert!(matches!(err, ScenecraftError::Animation(_)));
    assert!(BezierPath::new(&[]).is_err());
}

#[test]
fn segment_lookup_scans_in_order() {
    let path = BezierPath::new(&[
        BezierPoint::new(0.0, 0.0),
        BezierPoint::new(0.5, 0.2),
        BezierPoint::new(1.0, 1.0),
    ])
    .unwrap();
    assert_eq!(path.segment_count(), 2);
    assert_eq!(path.find_segment(0.25), 0);
    assert_eq!(path.find_segment(0.5), 0);
    assert_eq!(path.find_segment(0.75), 1);
    assert_eq!(path.find_segment(-0.1), 0);
    assert_eq!(path.find_segment(1.5), 1);
}

#[test]
fn degenerate_segment_returns_mean_y() {
    let path = BezierPath::new(&[BezierPoint::new(0.5, 0.0), BezierPoint::new(0.5, 1.0)]).unwrap();
    assert_eq!(path.tween(0.5), 0.5);
}

#[test]
fn control_offset_mirrors_handles() {
    let p = BezierPoint::with_control_offset(0.5, 0.5, 0.1, 0.2);
    let (cin, cout) = (p.control_in.unwrap(), p.control_out.unwrap());
    assert!((cin - Point::new(0.4, 0.3)).hypot() < 1e-12);
    assert!((cout - Point::new(0.6, 0.7)).hypot() < 1e-12);
}
