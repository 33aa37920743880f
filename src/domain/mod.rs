// Domain layer: sync models and the ports the adapters implement.

pub mod model;
pub mod plan;
pub mod ports;
