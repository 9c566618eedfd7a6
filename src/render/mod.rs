pub(crate) mod blur;
pub(crate) mod buffer;
pub(crate) mod composite;
pub(crate) mod context;
pub(crate) mod raster;
