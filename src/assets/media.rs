use std::path::Path;

use crate::foundation::error::{ScenecraftError, ScenecraftResult};
use crate::source::video::{VideoDecoder, VideoDecoderFactory};

/// Opens videos with the system `ffprobe`/`ffmpeg` tools.
///
/// Requires the `media-ffmpeg` feature; without it every open fails with a validation error.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegDecoderFactory;

impl VideoDecoderFactory for FfmpegDecoderFactory {
    fn open(&self, path: &Path) -> ScenecraftResult<Box<dyn VideoDecoder>> {
        open_ffmpeg(path)
    }
}

#[cfg(feature = "media-ffmpeg")]
fn open_ffmpeg(path: &Path) -> ScenecraftResult<Box<dyn VideoDecoder>> {
    Ok(Box::new(ffmpeg::FfmpegDecoder::open(path)?))
}

#[cfg(not(feature = "media-ffmpeg"))]
fn open_ffmpeg(path: &Path) -> ScenecraftResult<Box<dyn VideoDecoder>> {
    Err(ScenecraftError::validation(format!(
        "cannot open '{}': video assets require the 'media-ffmpeg' feature",
        path.display()
    )))
}

#[cfg(feature = "media-ffmpeg")]
pub use ffmpeg::FfmpegDecoder;

#[cfg(feature = "media-ffmpeg")]
mod ffmpeg {
    use std::io::Read;
    use std::path::{Path, PathBuf};
    use std::process::{Child, ChildStdout, Command, Stdio};

    use super::{ScenecraftError, ScenecraftResult};
    use crate::foundation::core::{Affine, Size};
    use crate::render::buffer::{PixelBuffer, byte_len};
    use crate::source::video::{VideoDecoder, VideoInfo};

    /// Sequential RGBA8 reader backed by an `ffmpeg` child process.
    pub struct FfmpegDecoder {
        info: VideoInfo,
        width: u32,
        height: u32,
        child: Option<(Child, ChildStdout)>,
        decoded: u64,
    }

    impl FfmpegDecoder {
        /// Probe `path` and start decoding from the first frame.
        pub fn open(path: &Path) -> ScenecraftResult<Self> {
            let probe = probe(path)?;
            let mut decoder = Self {
                info: probe.info,
                width: probe.width,
                height: probe.height,
                child: None,
                decoded: 0,
            };
            decoder.spawn()?;
            Ok(decoder)
        }

        fn spawn(&mut self) -> ScenecraftResult<()> {
            self.kill();
            let path = self
                .info
                .path
                .clone()
                .ok_or_else(|| ScenecraftError::decode("video decoder has no source path"))?;
            let mut child = Command::new("ffmpeg")
                .args(["-v", "error", "-i"])
                .arg(&path)
                .args(["-an", "-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::null())
                .spawn()
                .map_err(|e| {
                    ScenecraftError::decode(format!("failed to spawn ffmpeg for decode: {e}"))
                })?;
            let stdout = child
                .stdout
                .take()
                .ok_or_else(|| ScenecraftError::decode("ffmpeg stdout unavailable"))?;
            self.child = Some((child, stdout));
            self.decoded = 0;
            Ok(())
        }

        fn kill(&mut self) {
            if let Some((mut child, _)) = self.child.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }

    impl Drop for FfmpegDecoder {
        fn drop(&mut self) {
            self.kill();
        }
    }

    impl VideoDecoder for FfmpegDecoder {
        fn info(&self) -> &VideoInfo {
            &self.info
        }

        fn next_frame(&mut self) -> ScenecraftResult<Option<(PixelBuffer, f64)>> {
            let len = byte_len(self.width, self.height)?;
            let Some((_, stdout)) = self.child.as_mut() else {
                return Ok(None);
            };
            let mut data = vec![0u8; len];
            match stdout.read_exact(&mut data) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    self.kill();
                    return Ok(None);
                }
                Err(e) => {
                    return Err(ScenecraftError::decode(format!("ffmpeg read failed: {e}")));
                }
            }
            let time = if self.info.frame_rate > 0.0 {
                self.decoded as f64 / self.info.frame_rate
            } else {
                0.0
            };
            self.decoded += 1;
            let buffer = PixelBuffer::from_raw(self.width, self.height, data, false)?;
            Ok(Some((buffer, time)))
        }

        fn restart(&mut self) -> ScenecraftResult<()> {
            self.spawn()
        }
    }

    struct Probe {
        info: VideoInfo,
        width: u32,
        height: u32,
    }

    fn probe(path: &Path) -> ScenecraftResult<Probe> {
        #[derive(serde::Deserialize)]
        struct SideData {
            rotation: Option<f64>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeStream {
            codec_type: Option<String>,
            width: Option<u32>,
            height: Option<u32>,
            r_frame_rate: Option<String>,
            #[serde(default)]
            side_data_list: Vec<SideData>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeOut {
            streams: Vec<ProbeStream>,
            format: Option<ProbeFormat>,
        }

        let out = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(path)
            .output()
            .map_err(|e| ScenecraftError::validation(format!("failed to run ffprobe: {e}")))?;
        if !out.status.success() {
            return Err(ScenecraftError::decode(format!(
                "ffprobe failed for '{}': {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
            .map_err(|e| ScenecraftError::decode(format!("ffprobe json parse failed: {e}")))?;
        let stream = parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| ScenecraftError::decode("no video stream found"))?;
        let (width, height) = match (stream.width, stream.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(ScenecraftError::decode("missing video dimensions from ffprobe")),
        };
        let frame_rate = stream
            .r_frame_rate
            .as_deref()
            .and_then(parse_ff_ratio)
            .ok_or_else(|| ScenecraftError::decode("missing timing: invalid r_frame_rate"))?;
        let duration = parsed
            .format
            .as_ref()
            .and_then(|f| f.duration.as_deref())
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);
        let rotation_deg = stream
            .side_data_list
            .iter()
            .find_map(|s| s.rotation)
            .unwrap_or(0.0);
        let natural_size = Size::new(f64::from(width), f64::from(height));

        // ffmpeg applies the display rotation, so quarter turns swap the decoded dimensions.
        let quarter_turn = (rotation_deg.round() as i64).rem_euclid(180) == 90;
        let (width, height) = if quarter_turn {
            (height, width)
        } else {
            (width, height)
        };

        Ok(Probe {
            info: VideoInfo {
                path: Some(PathBuf::from(path)),
                duration,
                frame_rate,
                natural_size,
                transform: Affine::rotate(-rotation_deg.to_radians()),
            },
            width,
            height,
        })
    }

    fn parse_ff_ratio(s: &str) -> Option<f64> {
        let (a, b) = s.split_once('/')?;
        let a = a.parse::<u32>().ok()?;
        let b = b.parse::<u32>().ok()?;
        if a == 0 || b == 0 {
            return None;
        }
        Some(f64::from(a) / f64::from(b))
    }
}
