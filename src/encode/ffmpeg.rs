use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{VideoWriter, WriterState, check_frame_size, even_output_size};
use crate::foundation::core::{Affine, Canvas, Fps};
use crate::foundation::error::{ScenecraftError, ScenecraftResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::buffer::PixelBuffer;

/// Options for opening a video writer.
#[derive(Clone, Debug)]
pub struct VideoWriterOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Requested frame size; floored to even dimensions on open.
    pub size: Canvas,
    /// Display transform; a rotation is written as stream metadata.
    pub transform: Affine,
    /// Output frame rate.
    pub fps: Fps,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl VideoWriterOpts {
    /// Options for an MP4 at `out_path`.
    pub fn new(out_path: impl Into<PathBuf>, size: Canvas, fps: Fps) -> Self {
        Self {
            out_path: out_path.into(),
            size,
            transform: Affine::IDENTITY,
            fps,
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Video writer that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// `ffmpeg` reads a constant-rate stream, so when timestamps skip frame slots (dropped or
/// skipped renders) the previous frame is repeated to keep the output in sync.
pub struct FfmpegVideoWriter {
    opts: VideoWriterOpts,
    size: Canvas,
    state: WriterState,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    last_time: Option<f64>,
    next_slot: u64,
}

impl FfmpegVideoWriter {
    /// Validate `opts` and prepare the output location. The encoder starts on
    /// [`VideoWriter::start`].
    pub fn open(opts: VideoWriterOpts) -> ScenecraftResult<Self> {
        let size = even_output_size(opts.size)?;
        if size != opts.size {
            tracing::debug!(
                width = size.width,
                height = size.height,
                "output size floored to even dimensions"
            );
        }
        ensure_parent_dir(&opts.out_path)?;
        if !opts.overwrite && opts.out_path.exists() {
            return Err(ScenecraftError::validation(format!(
                "output file '{}' already exists",
                opts.out_path.display()
            )));
        }
        Ok(Self {
            opts,
            size,
            state: WriterState::Idle,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            last_time: None,
            next_slot: 0,
        })
    }

    fn spawn(&mut self) -> ScenecraftResult<()> {
        if !is_ffmpeg_on_path() {
            return Err(ScenecraftError::validation(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });

        // Input frames are flattened to opaque RGBA before they reach stdin.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", self.size.width, self.size.height),
            "-r",
            &format!("{}/{}", self.opts.fps.num, self.opts.fps.den),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        if let Some(degrees) = rotation_degrees(self.opts.transform) {
            cmd.args(["-metadata:s:v:0", &format!("rotate={degrees}")]);
        }
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            ScenecraftError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ScenecraftError::encode("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ScenecraftError::encode("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        self.scratch = vec![0u8; (self.size.width as usize) * (self.size.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        Ok(())
    }

    fn write_scratch(&mut self, times: u64) -> ScenecraftResult<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ScenecraftError::encode("ffmpeg stdin is closed"));
        };
        for _ in 0..times {
            stdin.write_all(&self.scratch).map_err(|e| {
                ScenecraftError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
            })?;
        }
        Ok(())
    }

    fn wait_child(&mut self) -> ScenecraftResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ScenecraftError::encode("ffmpeg writer not started"))?;
        let status = child
            .wait()
            .map_err(|e| ScenecraftError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ScenecraftError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ScenecraftError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ScenecraftError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl VideoWriter for FfmpegVideoWriter {
    fn size(&self) -> Canvas {
        self.size
    }

    fn state(&self) -> WriterState {
        self.state
    }

    fn start(&mut self) -> ScenecraftResult<()> {
        if self.state != WriterState::Idle {
            return Err(ScenecraftError::validation(format!(
                "cannot start writer in state {:?}",
                self.state
            )));
        }
        if let Err(e) = self.spawn() {
            self.state = WriterState::Failed;
            return Err(e);
        }
        self.state = WriterState::Writing;
        tracing::debug!(path = %self.opts.out_path.display(), "ffmpeg writer started");
        Ok(())
    }

    fn is_ready_for_more_data(&self) -> bool {
        // Writes block on the pipe, so a running encoder never overruns.
        self.state == WriterState::Writing && self.stdin.is_some()
    }

    fn append(&mut self, buffer: &PixelBuffer, time: f64) -> ScenecraftResult<()> {
        if self.state != WriterState::Writing {
            return Err(ScenecraftError::encode(format!(
                "append while writer is {:?}",
                self.state
            )));
        }
        if let Some(last) = self.last_time
            && time <= last
        {
            return Err(ScenecraftError::encode(format!(
                "non-increasing timestamp {time} after {last}"
            )));
        }
        check_frame_size(buffer, self.size)?;

        let slot = (time * self.opts.fps.as_f64()).round().max(0.0) as u64;
        if slot > self.next_slot && self.last_time.is_some() {
            // Fill skipped slots with the previous frame still held in `scratch`.
            self.write_scratch(slot - self.next_slot)?;
        }
        if buffer.premultiplied {
            flatten_premul_over_bg(&mut self.scratch, &buffer.data, self.opts.bg_rgba)?;
        } else {
            flatten_premul_over_bg(&mut self.scratch, &buffer.premultiplied_data(), self.opts.bg_rgba)?;
        }
        if let Err(e) = self.write_scratch(1) {
            self.state = WriterState::Failed;
            return Err(e);
        }
        self.last_time = Some(time);
        self.next_slot = slot.max(self.next_slot) + 1;
        Ok(())
    }

    fn finish(&mut self) -> ScenecraftResult<()> {
        if self.state != WriterState::Writing {
            return Err(ScenecraftError::encode(format!(
                "finish while writer is {:?}",
                self.state
            )));
        }
        self.state = WriterState::Finalizing;
        match self.wait_child() {
            Ok(()) => {
                self.state = WriterState::Done;
                tracing::debug!(path = %self.opts.out_path.display(), "ffmpeg writer finished");
                Ok(())
            }
            Err(e) => {
                self.state = WriterState::Failed;
                Err(e)
            }
        }
    }
}

impl Drop for FfmpegVideoWriter {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Rotation of `xf` in whole degrees, or `None` when it does not rotate.
pub(crate) fn rotation_degrees(xf: Affine) -> Option<i64> {
    let [a, b, ..] = xf.as_coeffs();
    let degrees = b.atan2(a).to_degrees().round() as i64;
    let degrees = degrees.rem_euclid(360);
    (degrees != 0).then_some(degrees)
}

pub(crate) fn flatten_premul_over_bg(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> ScenecraftResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ScenecraftError::encode(
            "flatten_premul_over_bg expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for i in 0..3 {
            d[i] = (u16::from(s[i]) + mul_div255_u16(bg[i], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ScenecraftResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
