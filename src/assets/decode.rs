use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use image::AnimationDecoder;

use crate::foundation::error::{ScenecraftError, ScenecraftResult};
use crate::render::raster::Raster;

/// Delay substituted for GIF frames that declare (almost) no delay.
pub const GIF_DEFAULT_DELAY_SECS: f64 = 0.1;

/// Read an asset file into memory.
pub fn read_asset(path: &Path) -> ScenecraftResult<Vec<u8>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read asset '{}'", path.display()))?;
    Ok(bytes)
}

/// Decode encoded image bytes into a premultiplied raster.
pub fn decode_image(bytes: &[u8]) -> ScenecraftResult<Raster> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| ScenecraftError::decode(format!("decode image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Raster::from_straight(width, height, rgba.into_raw())
}

/// Decode every frame of an animated GIF with its delay in seconds.
///
/// Frames are fully composited canvas snapshots. Fails when the container holds no frames.
pub fn decode_gif(bytes: &[u8]) -> ScenecraftResult<Vec<(Raster, f64)>> {
    let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(bytes))
        .map_err(|e| ScenecraftError::decode(format!("open gif: {e}")))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| ScenecraftError::decode(format!("decode gif frames: {e}")))?;
    if frames.is_empty() {
        return Err(ScenecraftError::decode("gif contains no frames"));
    }

    let mut out = Vec::with_capacity(frames.len());
    for frame in frames {
        let (numer, denom) = frame.delay().numer_denom_ms();
        if denom == 0 {
            return Err(ScenecraftError::decode("gif frame is missing timing"));
        }
        let declared = f64::from(numer) / f64::from(denom) / 1000.0;
        let buffer = frame.into_buffer();
        let (w, h) = buffer.dimensions();
        out.push((Raster::from_straight(w, h, buffer.into_raw())?, gif_delay(declared)));
    }
    Ok(out)
}

/// Declared delay, or the clamped default when the declared one is effectively zero.
pub(crate) fn gif_delay(declared: f64) -> f64 {
    if declared.is_finite() && declared >= 1e-6 {
        declared
    } else {
        GIF_DEFAULT_DELAY_SECS
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
