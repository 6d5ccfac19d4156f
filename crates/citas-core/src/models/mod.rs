//! Domain models for the appointment history screen.

mod appointment;
mod clinic;

pub use appointment::*;
pub use clinic::*;
