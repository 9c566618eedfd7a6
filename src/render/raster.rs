use std::sync::Arc;

use rayon::prelude::*;

use crate::foundation::core::{Affine, Canvas, Point, Rect, Rgba8Premul, Size};
use crate::foundation::error::{ScenecraftError, ScenecraftResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};
use crate::render::buffer::{PixelBuffer, byte_len};
use crate::render::composite::over;
use crate::render::context::{RenderSettings, Sampling};

/// Premultiplied RGBA8 pixels placed at an integer origin in canvas space.
///
/// This is the image object flowing through the render tree. Every operation returns a new
/// raster; pixel storage is shared between clones.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    data: Arc<Vec<u8>>,
}

impl Raster {
    /// Transparent raster covering `width x height` pixels at `(x, y)`.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> ScenecraftResult<Self> {
        let len = byte_len(width, height)?;
        Ok(Self {
            x,
            y,
            width,
            height,
            data: Arc::new(vec![0; len]),
        })
    }

    /// Wrap premultiplied pixels at the canvas origin.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> ScenecraftResult<Self> {
        let len = byte_len(width, height)?;
        if data.len() != len {
            return Err(ScenecraftError::validation(format!(
                "raster expects {len} bytes for {width}x{height}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            x: 0,
            y: 0,
            width,
            height,
            data: Arc::new(data),
        })
    }

    /// Premultiply straight-alpha pixels and wrap them at the canvas origin.
    pub fn from_straight(width: u32, height: u32, mut data: Vec<u8>) -> ScenecraftResult<Self> {
        premultiply_rgba8_in_place(&mut data);
        Self::from_premul(width, height, data)
    }

    /// Convert a pixel buffer, premultiplying if needed.
    pub fn from_pixel_buffer(buffer: &PixelBuffer) -> ScenecraftResult<Self> {
        Self::from_premul(buffer.width, buffer.height, buffer.premultiplied_data())
    }

    /// Raster filled with one colour.
    pub fn solid(width: u32, height: u32, color: Rgba8Premul) -> ScenecraftResult<Self> {
        let px = color.to_array();
        let count = byte_len(width, height)? / 4;
        Self::from_premul(width, height, px.repeat(count))
    }

    /// The same pixels moved to `(x, y)`.
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Top-left corner in canvas pixels.
    pub fn origin(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel size as floating-point extent.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Canvas-space rectangle covered by this raster.
    pub fn extent(&self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.x) + f64::from(self.width),
            f64::from(self.y) + f64::from(self.height),
        )
    }

    /// `true` when the raster covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Premultiplied pixel at canvas position `(x, y)`; transparent outside the extent.
    pub fn pixel_at(&self, x: i32, y: i32) -> [u8; 4] {
        let lx = i64::from(x) - i64::from(self.x);
        let ly = i64::from(y) - i64::from(self.y);
        self.local_pixel(lx, ly)
    }

    fn local_pixel(&self, lx: i64, ly: i64) -> [u8; 4] {
        if lx < 0 || ly < 0 || lx >= i64::from(self.width) || ly >= i64::from(self.height) {
            return [0; 4];
        }
        let idx = ((ly as usize) * (self.width as usize) + (lx as usize)) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Resample through `xf` into the integer bounding box of the transformed extent.
    pub fn transformed(&self, xf: Affine, settings: &RenderSettings) -> ScenecraftResult<Raster> {
        if self.is_empty() {
            return Ok(self.clone());
        }
        let [a, b, c, d, e, f] = xf.as_coeffs();
        if [a, b, c, d, e, f].iter().any(|v| !v.is_finite()) {
            return Err(ScenecraftError::evaluation("non-finite transform"));
        }
        if xf.determinant().abs() < 1e-12 {
            return Raster::new(self.x, self.y, 0, 0);
        }
        if a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0 && e.fract() == 0.0 && f.fract() == 0.0 {
            let (dx, dy) = (e as i64, f as i64);
            let x = i32::try_from(i64::from(self.x) + dx)
                .map_err(|_| ScenecraftError::evaluation("translation out of range"))?;
            let y = i32::try_from(i64::from(self.y) + dy)
                .map_err(|_| ScenecraftError::evaluation("translation out of range"))?;
            return Ok(self.clone().at(x, y));
        }

        // Snap within 1e-6 of a pixel edge so rotations by right angles keep exact sizes.
        const SNAP: f64 = 1e-6;
        let bbox = xf.transform_rect_bbox(self.extent());
        let x0 = (bbox.x0 + SNAP).floor();
        let y0 = (bbox.y0 + SNAP).floor();
        let w = ((bbox.x1 - SNAP).ceil() - x0).max(0.0);
        let h = ((bbox.y1 - SNAP).ceil() - y0).max(0.0);
        let max = f64::from(settings.max_dimension);
        if w > max || h > max {
            return Err(ScenecraftError::evaluation(format!(
                "transformed raster too large: {w}x{h} (max {max}x{max})"
            )));
        }
        let (w, h) = (w as u32, h as u32);
        let mut out = Raster::new(x0 as i32, y0 as i32, w, h)?;
        if out.is_empty() {
            return Ok(out);
        }

        let inv = xf.inverse();
        let sampling = settings.sampling;
        let (sx0, sy0) = (f64::from(self.x), f64::from(self.y));
        let row_len = (w as usize) * 4;
        let data = Arc::make_mut(&mut out.data);
        data.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(row, dst)| {
                let cy = y0 + row as f64 + 0.5;
                for col in 0..w as usize {
                    let cx = x0 + col as f64 + 0.5;
                    let p = inv * Point::new(cx, cy);
                    let px = self.sample(p.x - sx0, p.y - sy0, sampling);
                    dst[col * 4..col * 4 + 4].copy_from_slice(&px);
                }
            });
        Ok(out)
    }

    fn sample(&self, lx: f64, ly: f64, sampling: Sampling) -> [u8; 4] {
        if lx < 0.0 || ly < 0.0 || lx >= f64::from(self.width) || ly >= f64::from(self.height) {
            return [0; 4];
        }
        match sampling {
            Sampling::Nearest => self.local_pixel(lx.floor() as i64, ly.floor() as i64),
            Sampling::Bilinear => {
                let u = lx - 0.5;
                let v = ly - 0.5;
                let i0 = u.floor();
                let j0 = v.floor();
                let fx = (u - i0) as f32;
                let fy = (v - j0) as f32;
                let (i0, j0) = (i0 as i64, j0 as i64);
                let p00 = self.clamped_local(i0, j0);
                let p10 = self.clamped_local(i0 + 1, j0);
                let p01 = self.clamped_local(i0, j0 + 1);
                let p11 = self.clamped_local(i0 + 1, j0 + 1);
                let mut out = [0u8; 4];
                for ch in 0..4 {
                    let top = f32::from(p00[ch]) * (1.0 - fx) + f32::from(p10[ch]) * fx;
                    let bottom = f32::from(p01[ch]) * (1.0 - fx) + f32::from(p11[ch]) * fx;
                    out[ch] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
                }
                out
            }
        }
    }

    /// Draw `self` over `below`; the result covers the union of both extents.
    ///
    /// Fails when that union is wider or taller than `max_dimension`.
    pub fn composited_over(
        &self,
        below: &Raster,
        max_dimension: u32,
    ) -> ScenecraftResult<Raster> {
        if self.is_empty() {
            return Ok(below.clone());
        }
        if below.is_empty() {
            return Ok(self.clone());
        }
        let x0 = self.x.min(below.x);
        let y0 = self.y.min(below.y);
        let x1 = (i64::from(self.x) + i64::from(self.width))
            .max(i64::from(below.x) + i64::from(below.width));
        let y1 = (i64::from(self.y) + i64::from(self.height))
            .max(i64::from(below.y) + i64::from(below.height));
        let w = u32::try_from(x1 - i64::from(x0))
            .map_err(|_| ScenecraftError::evaluation("composite extent overflow"))?;
        let h = u32::try_from(y1 - i64::from(y0))
            .map_err(|_| ScenecraftError::evaluation("composite extent overflow"))?;
        if w > max_dimension || h > max_dimension {
            return Err(ScenecraftError::evaluation(format!(
                "composite extent too large: {w}x{h} (max {max_dimension}x{max_dimension})"
            )));
        }

        let mut out = if below.x == x0 && below.y == y0 && below.width == w && below.height == h {
            below.clone()
        } else {
            let mut canvas = Raster::new(x0, y0, w, h)?;
            canvas.blit(below, |_, s| s);
            canvas
        };
        out.blit(self, |d, s| over(d, s, 1.0));
        Ok(out)
    }

    /// Combine `src` into `self` over their overlap with `op(dst, src)`.
    fn blit(&mut self, src: &Raster, op: impl Fn([u8; 4], [u8; 4]) -> [u8; 4]) {
        let ox = i64::from(src.x) - i64::from(self.x);
        let oy = i64::from(src.y) - i64::from(self.y);
        let dst_w = self.width as usize;
        let data = Arc::make_mut(&mut self.data);
        for sy in 0..i64::from(src.height) {
            let dy = sy + oy;
            if dy < 0 || dy >= i64::from(self.height) {
                continue;
            }
            for sx in 0..i64::from(src.width) {
                let dx = sx + ox;
                if dx < 0 || dx >= dst_w as i64 {
                    continue;
                }
                let s = src.local_pixel(sx, sy);
                let di = ((dy as usize) * dst_w + dx as usize) * 4;
                let d = [data[di], data[di + 1], data[di + 2], data[di + 3]];
                data[di..di + 4].copy_from_slice(&op(d, s));
            }
        }
    }

    /// Scale every channel (and so the coverage) by `opacity`.
    pub fn with_opacity(&self, opacity: f64) -> Raster {
        let op = opacity.clamp(0.0, 1.0);
        if op >= 1.0 {
            return self.clone();
        }
        let data = self
            .data
            .iter()
            .map(|&c| (f64::from(c) * op).round() as u8)
            .collect();
        Raster {
            data: Arc::new(data),
            ..self.clone()
        }
    }

    /// Apply `f` to every pixel's straight-alpha colour (channels in `0..=1`).
    pub fn map_straight(&self, f: impl Fn([f32; 3]) -> [f32; 3] + Sync) -> Raster {
        let mut data = self.data.as_ref().clone();
        data.par_chunks_mut(4).for_each(|px| {
            let a = px[3];
            if a == 0 {
                return;
            }
            let af = f32::from(a);
            let rgb = [
                f32::from(px[0]) / af,
                f32::from(px[1]) / af,
                f32::from(px[2]) / af,
            ];
            let out = f(rgb);
            for ch in 0..3 {
                px[ch] = (out[ch].clamp(0.0, 1.0) * af).round() as u8;
            }
        });
        Raster {
            data: Arc::new(data),
            ..self.clone()
        }
    }

    /// Build a same-sized raster whose pixel at local `(x, y)` is `f(x, y)`.
    pub fn map_positions(&self, f: impl Fn(u32, u32) -> [u8; 4] + Sync) -> Raster {
        let mut data = vec![0u8; self.data.len()];
        if !self.is_empty() {
            let row_len = (self.width as usize) * 4;
            data.par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(y, row)| {
                    for x in 0..self.width {
                        let i = (x as usize) * 4;
                        row[i..i + 4].copy_from_slice(&f(x, y as u32));
                    }
                });
        }
        Raster {
            data: Arc::new(data),
            ..self.clone()
        }
    }

    /// Premultiplied pixel at local `(x, y)`, clamped to the raster edges.
    pub(crate) fn clamped_local(&self, x: i64, y: i64) -> [u8; 4] {
        if self.is_empty() {
            return [0; 4];
        }
        let x = x.clamp(0, i64::from(self.width) - 1);
        let y = y.clamp(0, i64::from(self.height) - 1);
        self.local_pixel(x, y)
    }

    /// Transparent border of `pad` pixels on every side.
    pub fn padded(&self, pad: u32) -> ScenecraftResult<Raster> {
        if pad == 0 {
            return Ok(self.clone());
        }
        let pad_i = i32::try_from(pad)
            .map_err(|_| ScenecraftError::evaluation("padding out of range"))?;
        let mut out = Raster::new(
            self.x - pad_i,
            self.y - pad_i,
            self.width + 2 * pad,
            self.height + 2 * pad,
        )?;
        out.blit(self, |_, s| s);
        Ok(out)
    }

    /// Keep only the pixels for which `keep(canvas_x, canvas_y)` holds.
    pub fn masked(&self, keep: impl Fn(i32, i32) -> bool + Sync) -> Raster {
        let (x0, y0) = (self.x, self.y);
        self.map_positions(|x, y| {
            let (cx, cy) = (x0 + x as i32, y0 + y as i32);
            if keep(cx, cy) {
                self.local_pixel(i64::from(x), i64::from(y))
            } else {
                [0; 4]
            }
        })
    }

    /// Render the canvas rectangle `(0, 0, width, height)` into a premultiplied buffer.
    pub fn to_canvas_buffer(
        &self,
        canvas: Canvas,
        clear: Option<[u8; 4]>,
    ) -> ScenecraftResult<PixelBuffer> {
        let mut buffer = PixelBuffer::transparent(canvas.width, canvas.height)?;
        let clear = clear.map(|c| Rgba8Premul::from_straight_rgba(c[0], c[1], c[2], c[3]).to_array());
        let w = canvas.width as usize;
        if w == 0 {
            return Ok(buffer);
        }
        buffer
            .data
            .par_chunks_mut(w * 4)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..w {
                    let src = self.pixel_at(x as i32, y as i32);
                    let px = match clear {
                        Some(bg) => over(bg, src, 1.0),
                        None => src,
                    };
                    row[x * 4..x * 4 + 4].copy_from_slice(&px);
                }
            });
        Ok(buffer)
    }

    /// Straight-alpha copy of the raster pixels (origin dropped).
    pub fn to_rgba_image(&self) -> ScenecraftResult<image::RgbaImage> {
        let mut data = self.data.as_ref().clone();
        unpremultiply_rgba8_in_place(&mut data);
        image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| ScenecraftError::evaluation("raster size does not match pixel data"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
