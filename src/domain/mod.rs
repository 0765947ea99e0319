// Domain layer: job description tree, derived registrations and the ports the core talks through.

pub mod model;
pub mod ports;
