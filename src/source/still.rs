use std::path::Path;

use crate::assets::decode::{decode_image, read_asset};
use crate::foundation::error::ScenecraftResult;
use crate::render::raster::Raster;
use crate::source::frame::Frame;
use crate::source::{ExternalFrames, Source, SourceKind};

/// A still image: the same frame for every timestamp.
#[derive(Clone, Debug)]
pub struct ImageSource {
    frame: Frame,
}

impl ImageSource {
    /// Wrap an already decoded raster.
    pub fn new(raster: Raster) -> Self {
        Self {
            frame: Frame::from_raster(raster, None),
        }
    }

    /// Decode an image file (any format the `image` crate reads).
    pub fn open(path: &Path) -> ScenecraftResult<Self> {
        let bytes = read_asset(path)?;
        Ok(Self::new(decode_image(&bytes)?))
    }
}

impl Source for ImageSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Image
    }

    fn frame_at(&mut self, _time: f64, _external: Option<&ExternalFrames>) -> Option<Frame> {
        Some(self.frame.clone())
    }
}
