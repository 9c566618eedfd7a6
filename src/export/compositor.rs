use std::sync::Arc;
use std::time::Instant;

use crate::encode::sink::{GifWriter, VideoWriter, WriterState};
use crate::export::config::ExportConfig;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ScenecraftError, ScenecraftResult};
use crate::render::buffer::PixelBuffer;
use crate::render::composite::{crossfade_in_place, over_in_place};
use crate::render::context::CompositingContext;
use crate::render::raster::Raster;
use crate::scene::composition::Composition;
use crate::scene::scene::Scene;

/// Lifecycle of one export; mirrors the encoder session it drives.
pub type ExportState = WriterState;

/// Progress of a running export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportProgress {
    /// Scene (or composition) being exported.
    pub scene_id: String,
    /// `frame_time / duration`, in `[0, 1)`.
    pub fraction: f64,
}

/// Frame accounting for a finished export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Frames the scene produced.
    pub frames_rendered: u64,
    /// Frame slots where nothing rendered.
    pub frames_skipped: u64,
    /// Rendered frames the encoder never accepted.
    pub frames_dropped: u64,
    /// Final state: `Done` or `Failed`.
    pub state: ExportState,
}

/// Counts from [`FrameCompositor::render_frames`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames handed to the callback.
    pub rendered: u64,
    /// Frame indices where the scene rendered nothing.
    pub skipped: u64,
}

/// Encoder an export streams into.
pub enum OutputSink<'a> {
    /// MP4-style writer with readiness back-pressure.
    Video(&'a mut dyn VideoWriter),
    /// GIF writer fed per-frame delays.
    Gif(&'a mut dyn GifWriter),
}

/// Walks scene frames in order and hands them to an encoder.
pub struct FrameCompositor {
    ctx: Arc<CompositingContext>,
    config: ExportConfig,
}

impl FrameCompositor {
    /// Driver rendering through `ctx` with the timing knobs of `config`.
    pub fn new(ctx: Arc<CompositingContext>, config: ExportConfig) -> Self {
        Self { ctx, config }
    }

    /// Export settings.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Render frames `0..frame_count` of `scene`, calling `on_frame(image, frame_time)` for
    /// each frame that produced an image.
    pub fn render_frames(
        &self,
        scene: &mut Scene,
        composition_time_offset: f64,
        mut on_frame: impl FnMut(Raster, f64),
    ) -> RenderStats {
        let mut stats = RenderStats::default();
        for index in 0..scene.frame_count() {
            let frame_time = scene.frame_time(index);
            match scene.render(&self.ctx, frame_time, composition_time_offset, None) {
                Some(image) => {
                    stats.rendered += 1;
                    on_frame(image, frame_time);
                }
                None => {
                    stats.skipped += 1;
                    tracing::debug!(scene = %scene.id(), index, frame_time, "frame rendered nothing, skipped");
                }
            }
        }
        stats
    }

    /// Export `scene` into a started-on-demand video writer.
    pub fn export_video(
        &self,
        scene: &mut Scene,
        writer: &mut dyn VideoWriter,
        progress: &mut dyn FnMut(ExportProgress),
    ) -> ScenecraftResult<ExportReport> {
        self.export_scene(scene, OutputSink::Video(writer), progress)
    }

    /// Export `scene` as GIF frames.
    pub fn export_gif(
        &self,
        scene: &mut Scene,
        writer: &mut dyn GifWriter,
        progress: &mut dyn FnMut(ExportProgress),
    ) -> ScenecraftResult<ExportReport> {
        self.export_scene(scene, OutputSink::Gif(writer), progress)
    }

    /// Export one scene into `sink`.
    ///
    /// Failing to start the encoder is an error. After that, frames that render nothing are
    /// skipped and frames the encoder rejects are dropped; neither aborts the export.
    #[tracing::instrument(skip_all, fields(scene = %scene.id()))]
    pub fn export_scene(
        &self,
        scene: &mut Scene,
        mut sink: OutputSink<'_>,
        progress: &mut dyn FnMut(ExportProgress),
    ) -> ScenecraftResult<ExportReport> {
        let canvas = begin(&mut sink, scene.canvas())?;
        let fps = scene.frame_rate();
        let duration = scene.duration();
        let scene_id = scene.id().to_owned();
        tracing::info!(frames = scene.frame_count(), "export started");

        let mut emitter = Emitter::new(self, fps);
        let stats = self.render_frames(scene, 0.0, |image, frame_time| {
            match self.ctx.to_output_buffer(Some(&image), canvas) {
                Ok(buffer) => emitter.emit(&mut sink, &buffer, frame_time),
                Err(e) => {
                    emitter.dropped += 1;
                    tracing::warn!(frame_time, error = %e, "frame conversion failed, dropped");
                }
            }
            progress(ExportProgress {
                scene_id: scene_id.clone(),
                fraction: frame_time / duration,
            });
        });

        let report = ExportReport {
            frames_rendered: stats.rendered,
            frames_skipped: stats.skipped,
            frames_dropped: emitter.dropped,
            state: end(&mut sink),
        };
        tracing::info!(
            rendered = report.frames_rendered,
            skipped = report.frames_skipped,
            dropped = report.frames_dropped,
            state = ?report.state,
            "export finished"
        );
        Ok(report)
    }

    /// Export every scene of `composition` on one timeline.
    ///
    /// Frames are timed at the first scene's frame rate. Each scene is rendered at its local
    /// time with its start as the composition time offset; a scene entering during its
    /// predecessor's fade transition is crossfaded over it.
    #[tracing::instrument(skip_all, fields(composition = %composition.id()))]
    pub fn export_composition(
        &self,
        composition: &mut Composition,
        mut sink: OutputSink<'_>,
        progress: &mut dyn FnMut(ExportProgress),
    ) -> ScenecraftResult<ExportReport> {
        let fps = composition
            .scenes
            .first()
            .map(Scene::frame_rate)
            .ok_or_else(|| ScenecraftError::validation("composition has no scenes"))?;
        let canvas = begin(&mut sink, composition.render_size)?;
        let duration = composition.duration();
        let frame_count = fps.secs_to_frames_floor(duration);
        let composition_id = composition.id().to_owned();
        tracing::info!(frames = frame_count, scenes = composition.scenes.len(), "export started");

        let mut emitter = Emitter::new(self, fps);
        let mut report = ExportReport::default();
        for index in 0..frame_count {
            let time = fps.frames_to_secs(index);
            match self.composite_at(composition, time, canvas) {
                Ok(Some(buffer)) => {
                    report.frames_rendered += 1;
                    emitter.emit(&mut sink, &buffer, time);
                }
                Ok(None) => {
                    report.frames_skipped += 1;
                    tracing::debug!(index, time, "no scene rendered, skipped");
                }
                Err(e) => {
                    report.frames_dropped += 1;
                    tracing::warn!(index, time, error = %e, "frame compositing failed, dropped");
                }
            }
            progress(ExportProgress {
                scene_id: composition_id.clone(),
                fraction: time / duration,
            });
        }

        report.frames_dropped += emitter.dropped;
        report.state = end(&mut sink);
        tracing::info!(
            rendered = report.frames_rendered,
            skipped = report.frames_skipped,
            dropped = report.frames_dropped,
            state = ?report.state,
            "export finished"
        );
        Ok(report)
    }

    fn composite_at(
        &self,
        composition: &mut Composition,
        time: f64,
        canvas: Canvas,
    ) -> ScenecraftResult<Option<PixelBuffer>> {
        let mut out: Option<PixelBuffer> = None;
        for active in composition.active_at(time) {
            let scene = &mut composition.scenes[active.index];
            let image = scene.render(&self.ctx, active.local_time, active.start, None);
            match out.as_mut() {
                None => {
                    if let Some(image) = image {
                        out = Some(self.ctx.to_output_buffer(Some(&image), canvas)?);
                    }
                }
                Some(below) => {
                    // An incoming scene that rendered nothing still fades the outgoing one out.
                    let above = self.ctx.to_output_buffer(image.as_ref(), canvas)?;
                    if active.opacity < 1.0 {
                        let previous = below.data.clone();
                        crossfade_in_place(
                            &mut below.data,
                            &previous,
                            &above.data,
                            active.opacity as f32,
                        )?;
                    } else {
                        over_in_place(&mut below.data, &above.data, 1.0)?;
                    }
                }
            }
        }
        Ok(out)
    }

    fn wait_until_ready(&self, writer: &dyn VideoWriter) -> bool {
        let deadline = Instant::now() + self.config.ready_timeout();
        loop {
            if writer.is_ready_for_more_data() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(self.config.ready_poll_interval());
        }
    }
}

/// Per-export emission state: GIF delay tracking and the dropped-frame count.
struct Emitter<'c> {
    compositor: &'c FrameCompositor,
    fps: Fps,
    previous_time: Option<f64>,
    dropped: u64,
}

impl<'c> Emitter<'c> {
    fn new(compositor: &'c FrameCompositor, fps: Fps) -> Self {
        Self {
            compositor,
            fps,
            previous_time: None,
            dropped: 0,
        }
    }

    fn emit(&mut self, sink: &mut OutputSink<'_>, buffer: &PixelBuffer, time: f64) {
        let result = match sink {
            OutputSink::Video(writer) => {
                if !self.compositor.wait_until_ready(&**writer) {
                    self.dropped += 1;
                    tracing::warn!(time, "encoder not ready before timeout, frame dropped");
                    return;
                }
                writer.append(buffer, time)
            }
            OutputSink::Gif(writer) => {
                let delay = match self.previous_time {
                    Some(previous) => time - previous,
                    None => self.fps.frame_duration_secs(),
                };
                writer.add_frame(buffer, delay)
            }
        };
        match result {
            Ok(()) => self.previous_time = Some(time),
            Err(e) => {
                self.dropped += 1;
                tracing::warn!(time, error = %e, "encoder rejected frame, dropped");
            }
        }
    }
}

/// Start the sink and return the canvas frames must be cropped to.
fn begin(sink: &mut OutputSink<'_>, canvas: Canvas) -> ScenecraftResult<Canvas> {
    match sink {
        OutputSink::Video(writer) => {
            if writer.state() == WriterState::Idle {
                writer.start()?;
            }
            Ok(writer.size())
        }
        OutputSink::Gif(_) => Ok(canvas),
    }
}

fn end(sink: &mut OutputSink<'_>) -> ExportState {
    let result = match sink {
        OutputSink::Video(writer) => writer.finish(),
        OutputSink::Gif(writer) => writer.finalize(),
    };
    match result {
        Ok(()) => ExportState::Done,
        Err(e) => {
            tracing::warn!(error = %e, "encoder failed to finish");
            ExportState::Failed
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/compositor.rs"]
mod tests;
