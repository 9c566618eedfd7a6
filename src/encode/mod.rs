//! Encoder sinks.
//!
//! Export drivers hand rendered frames to a [`sink::VideoWriter`] or [`sink::GifWriter`] in
//! timeline order. [`factory::EncoderFactory`] chooses the concrete writers for an export.

pub(crate) mod factory;
pub(crate) mod ffmpeg;
pub(crate) mod gif;
pub(crate) mod sink;
