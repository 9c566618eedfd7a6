//! Frame analysis hooks.
//!
//! Detectors inspect rendered or decoded frames and report regions of interest. Nothing in
//! the render path calls them; callers run them on frames they already hold.

use rayon::prelude::*;

use crate::foundation::core::Rect;
use crate::foundation::error::ScenecraftResult;
use crate::source::frame::Frame;

/// What an [`Observation`] describes.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    /// Bounding box of visible content.
    ContentBounds,
    /// Anything reported by a third-party detector.
    Custom(String),
}

/// A region reported by a [`Detector`].
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    /// Kind of region.
    pub kind: ObservationKind,
    /// Region in frame pixel coordinates, y-down.
    pub bounds: Rect,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Inspects one frame at a time.
pub trait Detector: Send {
    /// Observations found in `frame`, possibly none.
    fn detect(&mut self, frame: &Frame) -> ScenecraftResult<Vec<Observation>>;
}

/// Reports the bounding box of pixels whose alpha exceeds a threshold.
///
/// Confidence is the share of pixels inside the box that pass the threshold, so a solid
/// rectangle scores 1 and scattered specks score low.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContentBoundsDetector {
    alpha_threshold: u8,
}

impl ContentBoundsDetector {
    /// Detector counting pixels with alpha strictly above `alpha_threshold`.
    pub fn new(alpha_threshold: u8) -> Self {
        Self { alpha_threshold }
    }
}

#[derive(Clone, Copy)]
struct RowSpan {
    y: u32,
    x0: u32,
    x1: u32,
    count: u64,
}

impl Detector for ContentBoundsDetector {
    fn detect(&mut self, frame: &Frame) -> ScenecraftResult<Vec<Observation>> {
        let raster = frame.to_raster()?;
        let width = raster.width() as usize;
        if raster.is_empty() || width == 0 {
            return Ok(Vec::new());
        }
        let threshold = self.alpha_threshold;

        let rows: Vec<RowSpan> = raster
            .data()
            .par_chunks_exact(width * 4)
            .enumerate()
            .filter_map(|(y, row)| {
                let mut span: Option<RowSpan> = None;
                for (x, px) in row.chunks_exact(4).enumerate() {
                    if px[3] <= threshold {
                        continue;
                    }
                    let x = x as u32;
                    let s = span.get_or_insert(RowSpan {
                        y: y as u32,
                        x0: x,
                        x1: x,
                        count: 0,
                    });
                    s.x1 = x;
                    s.count += 1;
                }
                span
            })
            .collect();

        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };
        let (mut x0, mut x1, mut count) = (first.x0, first.x1, 0u64);
        let (y0, y1) = (first.y, rows.last().map_or(first.y, |r| r.y));
        for row in &rows {
            x0 = x0.min(row.x0);
            x1 = x1.max(row.x1);
            count += row.count;
        }

        let area = u64::from(x1 - x0 + 1) * u64::from(y1 - y0 + 1);
        let bounds = Rect::new(
            f64::from(x0),
            f64::from(y0),
            f64::from(x1) + 1.0,
            f64::from(y1) + 1.0,
        );
        Ok(vec![Observation {
            kind: ObservationKind::ContentBounds,
            bounds,
            confidence: count as f64 / area as f64,
        }])
    }
}

#[cfg(test)]
#[path = "../tests/unit/analysis/bounds.rs"]
mod tests;
