// Domain layer: listing models and the ports (interfaces) the feed pipeline depends on.

pub mod model;
pub mod ports;
