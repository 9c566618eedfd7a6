use std::sync::Arc;

use crate::animation::tween::{Linear, TweenFunction};
use crate::effects::filter::FilterProperty;
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{ScenecraftError, ScenecraftResult};

/// Value pushed into a filter property.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum PropertyValue {
    /// Plain number.
    Scalar(f64),
    /// 2D point or offset.
    Point(Point),
    /// Rectangle.
    Rect(Rect),
}

impl PropertyValue {
    /// The scalar, if this is one.
    pub fn as_scalar(self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// The point, if this is one.
    pub fn as_point(self) -> Option<Point> {
        match self {
            Self::Point(p) => Some(p),
            _ => None,
        }
    }
}

/// Component-wise linear interpolation.
pub trait Lerp: Sized {
    /// Value at fraction `t` from `a` to `b`. `t` is not clamped.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Point {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Point::new(<f64 as Lerp>::lerp(&a.x, &b.x, t), <f64 as Lerp>::lerp(&a.y, &b.y, t))
    }
}

impl Lerp for Rect {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Rect::new(
            <f64 as Lerp>::lerp(&a.x0, &b.x0, t),
            <f64 as Lerp>::lerp(&a.y0, &b.y0, t),
            <f64 as Lerp>::lerp(&a.x1, &b.x1, t),
            <f64 as Lerp>::lerp(&a.y1, &b.y1, t),
        )
    }
}

/// Start and end values of an animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimatedRange {
    /// Scalar range.
    Scalar {
        /// Value at the window start.
        start: f64,
        /// Value at the window end.
        end: f64,
    },
    /// Point range.
    Point {
        /// Value at the window start.
        start: Point,
        /// Value at the window end.
        end: Point,
    },
    /// Rectangle range.
    Rect {
        /// Value at the window start.
        start: Rect,
        /// Value at the window end.
        end: Rect,
    },
}

impl AnimatedRange {
    fn at(&self, t: f64) -> PropertyValue {
        match self {
            Self::Scalar { start, end } => {
                PropertyValue::Scalar(<f64 as Lerp>::lerp(start, end, t))
            }
            Self::Point { start, end } => {
                PropertyValue::Point(<Point as Lerp>::lerp(start, end, t))
            }
            Self::Rect { start, end } => PropertyValue::Rect(<Rect as Lerp>::lerp(start, end, t)),
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            Self::Scalar { start, end } => start.is_finite() && end.is_finite(),
            Self::Point { start, end } => start.is_finite() && end.is_finite(),
            Self::Rect { start, end } => start.is_finite() && end.is_finite(),
        }
    }
}

/// Time-windowed interpolation of one filter property.
#[derive(Clone, Debug)]
pub struct FilterAnimator {
    id: String,
    property: FilterProperty,
    range: AnimatedRange,
    start_time: f64,
    end_time: f64,
    tween: Arc<dyn TweenFunction>,
}

impl FilterAnimator {
    /// Animate `property` over `[start_time, end_time]` seconds with `tween`.
    pub fn new(
        property: FilterProperty,
        range: AnimatedRange,
        start_time: f64,
        end_time: f64,
        tween: Arc<dyn TweenFunction>,
    ) -> ScenecraftResult<Self> {
        if !start_time.is_finite() || !end_time.is_finite() {
            return Err(ScenecraftError::animation("animator times must be finite"));
        }
        if start_time > end_time {
            return Err(ScenecraftError::animation(format!(
                "animator start {start_time} is after end {end_time}"
            )));
        }
        if !range.is_finite() {
            return Err(ScenecraftError::animation("animator values must be finite"));
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            property,
            range,
            start_time,
            end_time,
            tween,
        })
    }

    /// Linear scalar animation.
    pub fn scalar(
        property: FilterProperty,
        start: f64,
        end: f64,
        start_time: f64,
        end_time: f64,
    ) -> ScenecraftResult<Self> {
        Self::new(
            property,
            AnimatedRange::Scalar { start, end },
            start_time,
            end_time,
            Arc::new(Linear),
        )
    }

    /// Linear point animation.
    pub fn point(
        property: FilterProperty,
        start: Point,
        end: Point,
        start_time: f64,
        end_time: f64,
    ) -> ScenecraftResult<Self> {
        Self::new(
            property,
            AnimatedRange::Point { start, end },
            start_time,
            end_time,
            Arc::new(Linear),
        )
    }

    /// Replace the generated identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Replace the curve.
    pub fn with_tween(mut self, tween: Arc<dyn TweenFunction>) -> Self {
        self.tween = tween;
        self
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Target property.
    pub fn property(&self) -> FilterProperty {
        self.property
    }

    /// Start and end values.
    pub fn range(&self) -> &AnimatedRange {
        &self.range
    }

    /// Window in seconds.
    pub fn window(&self) -> (f64, f64) {
        (self.start_time, self.end_time)
    }

    /// Property value at `time` seconds.
    ///
    /// Progress is clamped to the window before the curve is applied; the curve output is used
    /// as is so overshoot curves can leave the range.
    pub fn value_at(&self, time: f64) -> PropertyValue {
        let span = self.end_time - self.start_time;
        let progress = if span > 0.0 {
            ((time - self.start_time) / span).clamp(0.0, 1.0)
        } else if time < self.start_time {
            0.0
        } else {
            1.0
        };
        self.range.at(self.tween.tween(progress))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/animator.rs"]
mod tests;
