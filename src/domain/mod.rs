// Domain layer: simulation records and the ports the launcher and simulator meet at.

pub mod model;
pub mod ports;
