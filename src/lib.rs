//! Backward quasi-static model of a series hybrid-electric vehicle powertrain.
//!
//! The core is [`sim::step::step`], a pure single-timestep state transition
//! from battery SOC, a commanded engine operating point and the vehicle's
//! speed and acceleration to the next SOC, the fuel flow and a feasibility
//! verdict. Everything else builds vehicles for it or drives it over cycles.

pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
/// Lookup tables with linear interpolation.
pub mod maps;
pub mod powertrain;
pub mod rescale;
/// Single-step model, controllers, drive cycles and cycle runner.
pub mod sim;
pub mod vehicle;
