pub(crate) mod composition;
pub(crate) mod group;
pub(crate) mod layer;
pub(crate) mod mask;
pub(crate) mod scene;
pub(crate) mod surface;
