// Domain layer: field types, row/record models, service payloads and ports.

pub mod model;
pub mod ports;
pub mod schema;
