use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::Context as _;

use crate::encode::factory::EncoderFactory;
use crate::encode::ffmpeg::VideoWriterOpts;
use crate::export::compositor::{ExportProgress, ExportReport, FrameCompositor};
use crate::export::config::ExportConfig;
use crate::foundation::core::Affine;
use crate::foundation::error::{ScenecraftError, ScenecraftResult};
use crate::render::context::CompositingContext;
use crate::scene::composition::OutputKind;
use crate::scene::scene::Scene;

/// Where an export is written.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportTarget {
    /// Output file.
    pub path: PathBuf,
    /// Container to write.
    pub kind: OutputKind,
}

impl ExportTarget {
    /// Target at `path`, with the container picked from its extension (`.gif` or video).
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_gif = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("gif"));
        let kind = if is_gif { OutputKind::Gif } else { OutputKind::Video };
        Self { path, kind }
    }
}

type ProgressFn = Box<dyn FnMut(ExportProgress) + Send>;
type CompletionFn = Box<dyn FnOnce(ScenecraftResult<ExportReport>) + Send>;

/// One queued scene export.
pub struct ExportRequest {
    scene: Scene,
    target: ExportTarget,
    progress: Option<ProgressFn>,
    completion: Option<CompletionFn>,
}

impl ExportRequest {
    /// Export `scene` to `target`.
    pub fn new(scene: Scene, target: ExportTarget) -> Self {
        Self {
            scene,
            target,
            progress: None,
            completion: None,
        }
    }

    /// Called on the worker thread after every frame.
    pub fn with_progress(mut self, progress: impl FnMut(ExportProgress) + Send + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Called on the worker thread once the export has finished or failed. The next queued
    /// export starts only after this returns.
    pub fn on_complete(
        mut self,
        completion: impl FnOnce(ScenecraftResult<ExportReport>) + Send + 'static,
    ) -> Self {
        self.completion = Some(Box::new(completion));
        self
    }
}

/// Runs scene exports one at a time, in submission order, on a dedicated worker thread.
pub struct ExportManager {
    tx: Option<mpsc::Sender<ExportRequest>>,
    worker: Option<JoinHandle<()>>,
    pending: Arc<AtomicUsize>,
    exporting: Arc<AtomicBool>,
}

impl ExportManager {
    /// Start the worker. Writers come from `factory`; frames render through `ctx`.
    pub fn new(
        ctx: Arc<CompositingContext>,
        factory: Arc<dyn EncoderFactory>,
        config: ExportConfig,
    ) -> ScenecraftResult<Self> {
        let (tx, rx) = mpsc::channel::<ExportRequest>();
        let pending = Arc::new(AtomicUsize::new(0));
        let exporting = Arc::new(AtomicBool::new(false));
        let compositor = FrameCompositor::new(ctx, config);

        let worker = {
            let pending = Arc::clone(&pending);
            let exporting = Arc::clone(&exporting);
            std::thread::Builder::new()
                .name("scenecraft-export".to_owned())
                .spawn(move || {
                    while let Ok(request) = rx.recv() {
                        // Flag before decrementing so `is_exporting() || pending() > 0` never
                        // reads false while work remains.
                        exporting.store(true, Ordering::SeqCst);
                        pending.fetch_sub(1, Ordering::SeqCst);
                        run_request(&compositor, factory.as_ref(), request);
                        exporting.store(false, Ordering::SeqCst);
                    }
                })
                .context("spawn export worker thread")?
        };

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
            pending,
            exporting,
        })
    }

    /// Queue `request` behind any exports already submitted.
    pub fn submit(&self, request: ExportRequest) -> ScenecraftResult<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| ScenecraftError::validation("export manager is shut down"))?;
        self.pending.fetch_add(1, Ordering::SeqCst);
        tx.send(request).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            ScenecraftError::evaluation("export worker has stopped")
        })
    }

    /// Whether an export is running right now.
    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::SeqCst)
    }

    /// Exports queued but not yet started.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Finish every queued export and stop the worker.
    pub fn shutdown(mut self) -> ScenecraftResult<()> {
        self.close()
    }

    fn close(&mut self) -> ScenecraftResult<()> {
        self.tx.take();
        if let Some(handle) = self.worker.take() {
            handle
                .join()
                .map_err(|_| ScenecraftError::evaluation("export worker panicked"))?;
        }
        Ok(())
    }
}

impl Drop for ExportManager {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn run_request(compositor: &FrameCompositor, factory: &dyn EncoderFactory, request: ExportRequest) {
    let ExportRequest {
        mut scene,
        target,
        progress,
        completion,
    } = request;
    let mut progress = progress.unwrap_or_else(|| Box::new(|_: ExportProgress| {}));
    tracing::info!(scene = %scene.id(), path = %target.path.display(), kind = ?target.kind, "export dequeued");

    let result = export_to_target(compositor, factory, &mut scene, &target, &mut *progress);
    if let Err(e) = &result {
        tracing::error!(scene = %scene.id(), error = %e, "export failed");
    }
    if let Some(completion) = completion {
        completion(result);
    }
}

fn export_to_target(
    compositor: &FrameCompositor,
    factory: &dyn EncoderFactory,
    scene: &mut Scene,
    target: &ExportTarget,
    progress: &mut dyn FnMut(ExportProgress),
) -> ScenecraftResult<ExportReport> {
    match target.kind {
        OutputKind::Video => {
            let config = compositor.config();
            let opts = VideoWriterOpts {
                out_path: target.path.clone(),
                size: scene.canvas(),
                transform: Affine::IDENTITY,
                fps: scene.frame_rate(),
                overwrite: config.overwrite,
                bg_rgba: config.background_rgba,
            };
            let mut writer = factory.video_writer(opts)?;
            compositor.export_video(scene, writer.as_mut(), progress)
        }
        OutputKind::Gif => {
            let mut writer = factory.gif_writer(&target.path, scene.frame_count())?;
            compositor.export_gif(scene, writer.as_mut(), progress)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/manager.rs"]
mod tests;
