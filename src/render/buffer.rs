use crate::foundation::error::{ScenecraftError, ScenecraftResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};

/// A raw RGBA8 pixel buffer, the representation exchanged with decoders, encoders and the
/// external compositing bridge.
///
/// Decoders usually hand out straight alpha; the renderer produces premultiplied pixels. The
/// `premultiplied` flag makes the convention explicit at API boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl PixelBuffer {
    /// Allocate a transparent premultiplied buffer.
    pub fn transparent(width: u32, height: u32) -> ScenecraftResult<Self> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
            premultiplied: true,
        })
    }

    /// Wrap existing bytes, checking the length against `width * height * 4`.
    pub fn from_raw(
        width: u32,
        height: u32,
        data: Vec<u8>,
        premultiplied: bool,
    ) -> ScenecraftResult<Self> {
        let len = byte_len(width, height)?;
        if data.len() != len {
            return Err(ScenecraftError::validation(format!(
                "pixel buffer expects {len} bytes for {width}x{height}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied,
        })
    }

    /// Copy of the pixels in premultiplied form.
    pub fn premultiplied_data(&self) -> Vec<u8> {
        let mut data = self.data.clone();
        if !self.premultiplied {
            premultiply_rgba8_in_place(&mut data);
        }
        data
    }

    /// Copy of the pixels in straight-alpha form.
    pub fn straight_data(&self) -> Vec<u8> {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut data);
        }
        data
    }

    /// RGBA at `(x, y)` as stored, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

pub(crate) fn byte_len(width: u32, height: u32) -> ScenecraftResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| ScenecraftError::evaluation("pixel buffer size overflow"))
}
