use std::fmt::Debug;

use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::{ScenecraftError, ScenecraftResult};

/// Pure progress-remapping curve.
///
/// Callers clamp `x` to `[0, 1]`; implementations may return values outside that range
/// (overshoot curves).
pub trait TweenFunction: Send + Sync + Debug {
    /// Remap normalized progress.
    fn tween(&self, x: f64) -> f64;
}

/// Identity curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Linear;

impl TweenFunction for Linear {
    fn tween(&self, x: f64) -> f64 {
        x
    }
}

/// Anchor of a [`BezierPath`] with optional handles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BezierPoint {
    /// Progress coordinate.
    pub x: f64,
    /// Output coordinate.
    pub y: f64,
    /// Handle shaping the segment that ends here.
    pub control_in: Option<Point>,
    /// Handle shaping the segment that starts here.
    pub control_out: Option<Point>,
}

impl BezierPoint {
    /// Anchor without handles.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            control_in: None,
            control_out: None,
        }
    }

    /// Set the incoming handle.
    pub fn with_in(mut self, x: f64, y: f64) -> Self {
        self.control_in = Some(Point::new(x, y));
        self
    }

    /// Set the outgoing handle.
    pub fn with_out(mut self, x: f64, y: f64) -> Self {
        self.control_out = Some(Point::new(x, y));
        self
    }

    /// Anchor with handles mirrored about it by `(dx, dy)`.
    pub fn with_control_offset(x: f64, y: f64, dx: f64, dy: f64) -> Self {
        let off = Vec2::new(dx, dy);
        let p = Point::new(x, y);
        Self {
            x,
            y,
            control_in: Some(p - off),
            control_out: Some(p + off),
        }
    }

    fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BezierSegment {
    start: Point,
    c1: Point,
    c2: Point,
    end: Point,
}

const SOLVE_EPSILON: f64 = 1e-6;
const NEWTON_ITERATIONS: usize = 8;

impl BezierSegment {
    fn point_at(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        Point::new(
            a * self.start.x + b * self.c1.x + c * self.c2.x + d * self.end.x,
            a * self.start.y + b * self.c1.y + c * self.c2.y + d * self.end.y,
        )
    }

    fn dx_dt(&self, t: f64) -> f64 {
        let mt = 1.0 - t;
        3.0 * mt * mt * (self.c1.x - self.start.x)
            + 6.0 * mt * t * (self.c2.x - self.c1.x)
            + 3.0 * t * t * (self.end.x - self.c2.x)
    }

    fn contains(&self, x: f64) -> bool {
        x >= self.start.x && x <= self.end.x
    }

    /// Newton-Raphson on the normalized x axis, seeded with the linear guess.
    fn solve_for_y(&self, x: f64) -> f64 {
        let range = self.end.x - self.start.x;
        if range.abs() < SOLVE_EPSILON {
            return (self.start.y + self.end.y) / 2.0;
        }
        let target = (x - self.start.x) / range;
        let mut t = target;
        for _ in 0..NEWTON_ITERATIONS {
            let p = self.point_at(t);
            let err = (p.x - self.start.x) / range - target;
            if err.abs() < SOLVE_EPSILON {
                return p.y;
            }
            let slope = self.dx_dt(t) / range;
            if slope.abs() < SOLVE_EPSILON {
                break;
            }
            t = (t - err / slope).clamp(0.0, 1.0);
        }
        self.point_at(t).y
    }
}

/// Multi-segment cubic bezier curve through user-supplied anchors.
#[derive(Clone, Debug, PartialEq)]
pub struct BezierPath {
    segments: Vec<BezierSegment>,
}

impl BezierPath {
    /// Build one segment per consecutive pair of anchors.
    ///
    /// Missing handles coincide with their anchor. The first anchor should sit at `x = 0` and
    /// the last at `x = 1`.
    pub fn new(points: &[BezierPoint]) -> ScenecraftResult<Self> {
        if points.len() < 2 {
            return Err(ScenecraftError::animation(format!(
                "bezier path needs at least 2 points, got {}",
                points.len()
            )));
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(ScenecraftError::animation("bezier points must be finite"));
        }
        Ok(Self::from_points(points))
    }

    /// Number of cubic segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Index of the first segment whose x-range contains `x`, else the nearest end segment.
    pub fn find_segment(&self, x: f64) -> usize {
        if let Some(i) = self.segments.iter().position(|s| s.contains(x)) {
            return i;
        }
        match self.segments.first() {
            Some(first) if x < first.start.x => 0,
            _ => self.segments.len().saturating_sub(1),
        }
    }

    /// Solve the curve's y at `x` within segment `index`.
    pub fn solve_for_y(&self, index: usize, x: f64) -> f64 {
        self.segments.get(index).map_or(x, |s| s.solve_for_y(x))
    }

    fn from_points(points: &[BezierPoint]) -> Self {
        let segments = points
            .windows(2)
            .map(|w| BezierSegment {
                start: w[0].point(),
                c1: w[0].control_out.unwrap_or(w[0].point()),
                c2: w[1].control_in.unwrap_or(w[1].point()),
                end: w[1].point(),
            })
            .collect();
        Self { segments }
    }

    /// Straight line from (0,0) to (1,1).
    pub fn linear() -> Self {
        Self::from_points(&[BezierPoint::new(0.0, 0.0), BezierPoint::new(1.0, 1.0)])
    }

    /// Smooth acceleration and deceleration.
    pub fn ease_in_out() -> Self {
        Self::from_points(&[
            BezierPoint::new(0.0, 0.0).with_out(0.42, 0.0),
            BezierPoint::new(1.0, 1.0).with_in(0.58, 1.0),
        ])
    }

    /// S-curve that overshoots around the midpoint.
    pub fn s_curve_with_bump() -> Self {
        Self::from_points(&[
            BezierPoint::new(0.0, 0.0).with_out(0.2, 0.0),
            BezierPoint::new(0.5, 0.6).with_in(0.3, 0.8).with_out(0.7, 0.8),
            BezierPoint::new(1.0, 1.0).with_in(0.8, 1.0),
        ])
    }

    /// Pauses near one and two thirds.
    pub fn three_step() -> Self {
        Self::from_points(&[
            BezierPoint::new(0.0, 0.0).with_out(0.15, 0.0),
            BezierPoint::new(0.33, 0.33).with_in(0.28, 0.33).with_out(0.38, 0.33),
            BezierPoint::new(0.66, 0.66).with_in(0.61, 0.66).with_out(0.71, 0.66),
            BezierPoint::new(1.0, 1.0).with_in(0.85, 1.0),
        ])
    }

    /// Several decaying bounces.
    pub fn multi_bounce() -> Self {
        Self::from_points(&[
            BezierPoint::new(0.0, 0.0).with_out(0.1, 0.0),
            BezierPoint::new(0.25, 0.4).with_in(0.2, 0.5).with_out(0.3, 0.5),
            BezierPoint::new(0.5, 0.7).with_in(0.4, 0.9).with_out(0.6, 0.9),
            BezierPoint::new(0.75, 0.9).with_in(0.7, 1.05).with_out(0.8, 1.05),
            BezierPoint::new(1.0, 1.0).with_in(0.9, 1.1),
        ])
    }

    /// Oscillates around the middle before settling at 1.
    pub fn wave() -> Self {
        Self::from_points(&[
            BezierPoint::new(0.0, 0.0).with_out(0.1, 0.3),
            BezierPoint::new(0.25, 0.5).with_in(0.2, 0.7).with_out(0.3, 0.3),
            BezierPoint::new(0.5, 0.5).with_in(0.45, 0.7).with_out(0.55, 0.3),
            BezierPoint::new(0.75, 0.5).with_in(0.7, 0.7).with_out(0.8, 0.3),
            BezierPoint::new(1.0, 1.0).with_in(0.9, 0.7),
        ])
    }
}

impl TweenFunction for BezierPath {
    fn tween(&self, x: f64) -> f64 {
        let idx = self.find_segment(x);
        self.solve_for_y(idx, x)
    }
}

/// Single CSS-style cubic bezier from (0,0) to (1,1).
#[derive(Clone, Debug, PartialEq)]
pub struct CubicBezier {
    path: BezierPath,
}

impl CubicBezier {
    /// Curve with handles `(x1, y1)` and `(x2, y2)`.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            path: BezierPath::from_points(&[
                BezierPoint::new(0.0, 0.0).with_out(x1, y1),
                BezierPoint::new(1.0, 1.0).with_in(x2, y2),
            ]),
        }
    }

    /// CSS `ease`.
    pub fn ease() -> Self {
        Self::new(0.25, 0.1, 0.25, 1.0)
    }

    /// CSS `ease-in`.
    pub fn ease_in() -> Self {
        Self::new(0.42, 0.0, 1.0, 1.0)
    }

    /// CSS `ease-out`.
    pub fn ease_out() -> Self {
        Self::new(0.0, 0.0, 0.58, 1.0)
    }

    /// CSS `ease-in-out`.
    pub fn ease_in_out() -> Self {
        Self::new(0.42, 0.0, 0.58, 1.0)
    }
}

impl TweenFunction for CubicBezier {
    fn tween(&self, x: f64) -> f64 {
        self.path.tween(x)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
