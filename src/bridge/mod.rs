//! Driving scenes from an external compositing engine.
//!
//! The engine decodes the video tracks itself and asks for one output frame at a time;
//! [`tracks`] plans which tracks it must supply and [`session`] answers its requests.

pub(crate) mod session;
pub(crate) mod tracks;
