// Domain layer: data model, caller identity and the ports the core talks through.

pub mod model;
pub mod ports;
pub mod session;
