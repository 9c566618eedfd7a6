pub(crate) mod blur;
pub(crate) mod color;
pub(crate) mod crystallize;
pub(crate) mod filter;
pub(crate) mod geometry;
pub(crate) mod glitch;
