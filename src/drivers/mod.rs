//! Actuator drivers: the two motor channels and the power relay.

pub mod motor;
pub mod relay;
