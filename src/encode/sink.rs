use std::cell::Cell;
use std::sync::{Arc, Mutex, PoisonError};

use crate::foundation::core::Canvas;
use crate::foundation::error::{ScenecraftError, ScenecraftResult};
use crate::render::buffer::PixelBuffer;

/// Lifecycle of an encoder session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WriterState {
    /// Opened, not started.
    #[default]
    Idle,
    /// Accepting frames.
    Writing,
    /// Flushing after `finish`.
    Finalizing,
    /// Output complete.
    Done,
    /// The session failed; no further frames are accepted.
    Failed,
}

/// Video encoder contract.
///
/// Ordering contract: `append` is called with strictly increasing timestamps between `start`
/// and `finish`. Appending outside [`WriterState::Writing`] is an `Encode` error; export drivers
/// log it and drop the frame.
pub trait VideoWriter: Send {
    /// Encoded frame size. Always even and non-zero.
    fn size(&self) -> Canvas;

    /// Current lifecycle state.
    fn state(&self) -> WriterState;

    /// Begin the session. Only valid from [`WriterState::Idle`].
    fn start(&mut self) -> ScenecraftResult<()>;

    /// Whether the encoder can take another frame without overrunning its buffer.
    fn is_ready_for_more_data(&self) -> bool;

    /// Encode one premultiplied frame presented at `time` seconds.
    fn append(&mut self, buffer: &PixelBuffer, time: f64) -> ScenecraftResult<()>;

    /// Flush and close the output. Only valid from [`WriterState::Writing`].
    fn finish(&mut self) -> ScenecraftResult<()>;

    /// Transparent frame of the encoded size, ready to be drawn into.
    fn allocate_buffer(&self) -> ScenecraftResult<PixelBuffer> {
        let size = self.size();
        PixelBuffer::transparent(size.width, size.height)
    }
}

/// GIF encoder contract: frames arrive in order with their display delay in seconds.
pub trait GifWriter: Send {
    /// Append a frame shown for `delay` seconds.
    fn add_frame(&mut self, buffer: &PixelBuffer, delay: f64) -> ScenecraftResult<()>;

    /// Write the trailer. No frames are accepted afterwards.
    fn finalize(&mut self) -> ScenecraftResult<()>;
}

/// Floor `size` to even dimensions, rejecting anything that collapses to zero.
pub(crate) fn even_output_size(size: Canvas) -> ScenecraftResult<Canvas> {
    let even = size.floor_even();
    if even.width == 0 || even.height == 0 {
        return Err(ScenecraftError::validation(format!(
            "output size {}x{} is too small for even-dimension encoding",
            size.width, size.height
        )));
    }
    Ok(even)
}

pub(crate) fn check_frame_size(buffer: &PixelBuffer, size: Canvas) -> ScenecraftResult<()> {
    if buffer.width != size.width || buffer.height != size.height {
        return Err(ScenecraftError::encode(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            buffer.width, buffer.height, size.width, size.height
        )));
    }
    Ok(())
}

/// Frames captured by an in-memory writer, shared with the code that inspects them.
pub type Recorded<T> = Arc<Mutex<Vec<T>>>;

fn push_recorded<T>(recorded: &Recorded<T>, item: T) {
    recorded
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(item);
}

/// Video writer that keeps every appended frame in memory.
///
/// Back-pressure can be simulated: after each append the writer reports "not ready" for a
/// configurable number of readiness polls, or forever when stalled.
#[derive(Debug)]
pub struct InMemoryVideoWriter {
    size: Canvas,
    state: WriterState,
    frames: Recorded<(f64, PixelBuffer)>,
    busy_polls: u32,
    stalled: bool,
    remaining_busy: Cell<u32>,
    last_time: Option<f64>,
}

impl InMemoryVideoWriter {
    /// Writer for frames of `size`, floored to even dimensions.
    pub fn new(size: Canvas) -> ScenecraftResult<Self> {
        Ok(Self {
            size: even_output_size(size)?,
            state: WriterState::Idle,
            frames: Arc::default(),
            busy_polls: 0,
            stalled: false,
            remaining_busy: Cell::new(0),
            last_time: None,
        })
    }

    /// Report "not ready" for `polls` readiness checks after every append.
    pub fn with_busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self
    }

    /// Never become ready again after the first append.
    pub fn stalled(mut self) -> Self {
        self.stalled = true;
        self
    }

    /// Handle on the captured `(time, frame)` pairs.
    pub fn frames(&self) -> Recorded<(f64, PixelBuffer)> {
        Arc::clone(&self.frames)
    }
}

impl VideoWriter for InMemoryVideoWriter {
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
        self.state = WriterState::Writing;
        Ok(())
    }

    fn is_ready_for_more_data(&self) -> bool {
        if self.state != WriterState::Writing {
            return false;
        }
        if self.stalled && self.last_time.is_some() {
            return false;
        }
        let busy = self.remaining_busy.get();
        if busy > 0 {
            self.remaining_busy.set(busy - 1);
            return false;
        }
        true
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
        self.last_time = Some(time);
        self.remaining_busy.set(self.busy_polls);
        push_recorded(&self.frames, (time, buffer.clone()));
        Ok(())
    }

    fn finish(&mut self) -> ScenecraftResult<()> {
        if self.state != WriterState::Writing {
            return Err(ScenecraftError::encode(format!(
                "finish while writer is {:?}",
                self.state
            )));
        }
        self.state = WriterState::Done;
        Ok(())
    }
}

/// GIF writer that keeps `(frame, delay)` pairs in memory.
#[derive(Debug, Default)]
pub struct InMemoryGifWriter {
    frames: Recorded<(PixelBuffer, f64)>,
    finalized: bool,
}

impl InMemoryGifWriter {
    /// Empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle on the captured `(frame, delay)` pairs.
    pub fn frames(&self) -> Recorded<(PixelBuffer, f64)> {
        Arc::clone(&self.frames)
    }

    /// Whether `finalize` has run.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

impl GifWriter for InMemoryGifWriter {
    fn add_frame(&mut self, buffer: &PixelBuffer, delay: f64) -> ScenecraftResult<()> {
        if self.finalized {
            return Err(ScenecraftError::encode("gif writer is already finalized"));
        }
        push_recorded(&self.frames, (buffer.clone(), delay));
        Ok(())
    }

    fn finalize(&mut self) -> ScenecraftResult<()> {
        if self.finalized {
            return Err(ScenecraftError::encode("gif writer is already finalized"));
        }
        self.finalized = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
