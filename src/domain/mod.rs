// Domain layer: board model and ports (interfaces) to the rendering side.

pub mod model;
pub mod ports;
