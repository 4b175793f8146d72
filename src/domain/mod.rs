// Domain layer: core models, conflict policies and ports (interfaces).

pub mod conflict;
pub mod model;
pub mod ports;
