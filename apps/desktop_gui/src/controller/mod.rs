//! Controller layer: backend events and command orchestration around the
//! shared interaction controller.

pub mod events;
pub mod orchestration;
