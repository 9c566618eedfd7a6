//! Export drivers.
//!
//! [`compositor::FrameCompositor`] walks a scene's frames and streams them into an encoder;
//! [`manager::ExportManager`] runs scene exports one at a time on a worker thread.

pub(crate) mod compositor;
pub(crate) mod config;
pub(crate) mod manager;
