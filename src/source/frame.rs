use std::sync::Arc;

use crate::foundation::core::Size;
use crate::foundation::error::ScenecraftResult;
use crate::render::buffer::PixelBuffer;
use crate::render::raster::Raster;

#[derive(Clone, Debug)]
enum FrameContent {
    Image(Raster),
    Buffer(Arc<PixelBuffer>),
}

/// Immutable visual content produced by a source for one point in time.
#[derive(Clone, Debug)]
pub struct Frame {
    timestamp: Option<f64>,
    size: Size,
    content: FrameContent,
}

impl Frame {
    /// Frame backed by an image object. `timestamp` is `None` for time-independent content.
    pub fn from_raster(raster: Raster, timestamp: Option<f64>) -> Self {
        Self {
            timestamp,
            size: raster.size(),
            content: FrameContent::Image(raster),
        }
    }

    /// Frame backed by a raw pixel buffer (decoder or bridge output).
    pub fn from_buffer(buffer: Arc<PixelBuffer>, timestamp: Option<f64>) -> Self {
        Self {
            timestamp,
            size: Size::new(f64::from(buffer.width), f64::from(buffer.height)),
            content: FrameContent::Buffer(buffer),
        }
    }

    /// Presentation time in seconds, if the content is time-bound.
    pub fn timestamp(&self) -> Option<f64> {
        self.timestamp
    }

    /// Pixel dimensions.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Image object anchored at the canvas origin.
    pub fn to_raster(&self) -> ScenecraftResult<Raster> {
        match &self.content {
            FrameContent::Image(r) => Ok(r.clone().at(0, 0)),
            FrameContent::Buffer(b) => Raster::from_pixel_buffer(b),
        }
    }

    /// Raw buffer (premultiplied for image-backed frames, as decoded otherwise).
    pub fn to_pixel_buffer(&self) -> ScenecraftResult<PixelBuffer> {
        match &self.content {
            FrameContent::Image(r) => PixelBuffer::from_raw(r.width(), r.height(), r.data().to_vec(), true),
            FrameContent::Buffer(b) => Ok(b.as_ref().clone()),
        }
    }

    /// Straight-alpha bitmap for handing to image codecs.
    pub fn to_rgba_image(&self) -> ScenecraftResult<image::RgbaImage> {
        self.to_raster()?.to_rgba_image()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/frame.rs"]
mod tests;
