use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use anyhow::Context as _;

use crate::bridge::tracks::{ExternalLoopPolicy, TrackAssignment, TrackPlan, assign_track_ids};
use crate::foundation::core::Canvas;
use crate::foundation::error::{ScenecraftError, ScenecraftResult};
use crate::render::buffer::PixelBuffer;
use crate::render::context::CompositingContext;
use crate::scene::scene::Scene;
use crate::source::{ExternalFrames, TrackId};

/// One output frame requested by an external compositing engine.
#[derive(Clone, Debug, Default)]
pub struct CompositionRequest {
    /// Output time in seconds.
    pub composition_time: f64,
    /// Tracks the engine decoded for this frame; the first one is the passthrough track.
    pub required_track_ids: Vec<TrackId>,
    /// Decoded frames by track.
    pub source_frames: ExternalFrames,
}

/// Failures reported back to the engine for a single request.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The request named no tracks, so there is nothing to pass through.
    #[error("composition request lists no required tracks")]
    NoRequiredTracks,
    /// The first required track has no frame in the request.
    #[error("no source frame supplied for track {0}")]
    MissingSourceFrame(TrackId),
    /// The output buffer could not be produced.
    #[error("failed to allocate output buffer: {0}")]
    BufferAllocation(String),
}

/// Result of one request.
#[derive(Clone, Debug, PartialEq)]
pub enum BridgeOutput {
    /// The scene rendered; premultiplied buffer of the render size.
    Rendered(PixelBuffer),
    /// Nothing rendered; the first required track's frame, unchanged.
    Passthrough(Arc<PixelBuffer>),
}

impl BridgeOutput {
    /// The pixels to hand back to the engine.
    pub fn buffer(&self) -> &PixelBuffer {
        match self {
            Self::Rendered(buffer) => buffer,
            Self::Passthrough(buffer) => buffer,
        }
    }

    /// Whether this is a passthrough of the source frame.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Passthrough(_))
    }
}

/// Renders a scene per frame on behalf of an external compositing engine.
///
/// Construction switches the scene's video sources to external feeding and plans the tracks
/// the engine must supply. Calls to [`SceneBridge::handle`] are serialized by an internal lock.
pub struct SceneBridge {
    scene: Mutex<Scene>,
    ctx: Arc<CompositingContext>,
    render_size: Canvas,
    assignments: Vec<TrackAssignment>,
    plan: TrackPlan,
}

impl SceneBridge {
    /// Take ownership of `scene` and plan its tracks with the default loop policy.
    pub fn new(
        mut scene: Scene,
        ctx: Arc<CompositingContext>,
        render_size: Canvas,
    ) -> ScenecraftResult<Self> {
        let assignments = assign_track_ids(&mut scene);
        let plan = TrackPlan::build(&scene, &assignments, ExternalLoopPolicy::default())?;
        Ok(Self {
            scene: Mutex::new(scene),
            ctx,
            render_size,
            assignments,
            plan,
        })
    }

    /// Re-plan the tracks under `policy`.
    pub fn with_loop_policy(mut self, policy: ExternalLoopPolicy) -> ScenecraftResult<Self> {
        let scene = self.scene.get_mut().unwrap_or_else(PoisonError::into_inner);
        self.plan = TrackPlan::build(scene, &self.assignments, policy)?;
        Ok(self)
    }

    /// Video sources switched to external feeding, in track order.
    pub fn assignments(&self) -> &[TrackAssignment] {
        &self.assignments
    }

    /// Track schedule the engine should follow.
    pub fn plan(&self) -> &TrackPlan {
        &self.plan
    }

    /// Output size.
    pub fn render_size(&self) -> Canvas {
        self.render_size
    }

    /// Render the frame for `request`.
    ///
    /// When the scene renders nothing the first required track's frame is passed through.
    #[tracing::instrument(level = "trace", skip_all, fields(time = request.composition_time))]
    pub fn handle(&self, request: &CompositionRequest) -> Result<BridgeOutput, BridgeError> {
        let first = *request
            .required_track_ids
            .first()
            .ok_or(BridgeError::NoRequiredTracks)?;
        let source = request
            .source_frames
            .get(&first)
            .cloned()
            .ok_or(BridgeError::MissingSourceFrame(first))?;

        let frames: ExternalFrames = request
            .required_track_ids
            .iter()
            .filter_map(|id| request.source_frames.get(id).map(|b| (*id, Arc::clone(b))))
            .collect();

        let rendered = {
            let mut scene = self.scene.lock().unwrap_or_else(PoisonError::into_inner);
            scene.render(&self.ctx, request.composition_time, 0.0, Some(&frames))
        };

        match rendered {
            Some(image) => self
                .ctx
                .to_output_buffer(Some(&image), self.render_size)
                .map(BridgeOutput::Rendered)
                .map_err(|e| BridgeError::BufferAllocation(e.to_string())),
            None => {
                tracing::debug!(
                    time = request.composition_time,
                    track = %first,
                    "scene rendered nothing, passing source frame through"
                );
                Ok(BridgeOutput::Passthrough(source))
            }
        }
    }
}

type ResultFn = Box<dyn FnMut(f64, Result<BridgeOutput, BridgeError>) + Send>;

/// Runs bridge requests on a dedicated render thread, delivering results in submission order.
pub struct BridgeQueue {
    tx: Option<mpsc::Sender<CompositionRequest>>,
    worker: Option<JoinHandle<()>>,
}

impl BridgeQueue {
    /// Start the render thread. `on_result` receives each request's time and outcome.
    pub fn new(
        bridge: Arc<SceneBridge>,
        on_result: impl FnMut(f64, Result<BridgeOutput, BridgeError>) + Send + 'static,
    ) -> ScenecraftResult<Self> {
        let (tx, rx) = mpsc::channel::<CompositionRequest>();
        let mut on_result: ResultFn = Box::new(on_result);
        let worker = std::thread::Builder::new()
            .name("scenecraft-bridge".to_owned())
            .spawn(move || {
                while let Ok(request) = rx.recv() {
                    let outcome = bridge.handle(&request);
                    if let Err(e) = &outcome {
                        tracing::warn!(time = request.composition_time, error = %e, "bridge request failed");
                    }
                    on_result(request.composition_time, outcome);
                }
            })
            .context("spawn bridge render thread")?;
        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
        })
    }

    /// Queue a request.
    pub fn submit(&self, request: CompositionRequest) -> ScenecraftResult<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| ScenecraftError::validation("bridge queue is closed"))?;
        tx.send(request)
            .map_err(|_| ScenecraftError::evaluation("bridge render thread has stopped"))
    }

    /// Finish queued requests and stop the render thread.
    pub fn shutdown(mut self) -> ScenecraftResult<()> {
        self.close()
    }

    fn close(&mut self) -> ScenecraftResult<()> {
        self.tx.take();
        if let Some(handle) = self.worker.take() {
            handle
                .join()
                .map_err(|_| ScenecraftError::evaluation("bridge render thread panicked"))?;
        }
        Ok(())
    }
}

impl Drop for BridgeQueue {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bridge/session.rs"]
mod tests;
