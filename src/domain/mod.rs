// Domain layer: the cached value model, identity derivation and ports.

pub mod identity;
pub mod model;
pub mod ports;
