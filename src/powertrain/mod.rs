//! Powertrain subsystem models for the series hybrid.

/// Traction battery model.
pub mod battery;
/// Road load and final drive.
pub mod driveline;
/// Combustion engine and its optimal operating line.
pub mod engine;
/// Engine-driven generator.
pub mod generator;
/// Traction motor.
pub mod motor;

pub use battery::{BatteryOperation, BatterySpec};
pub use driveline::{BodySpec, DrivelineProfile, LoadModel, RoadLoad, ShaftDemand};
pub use engine::{EngineOperation, EngineSpec, OptimalOperatingLine};
pub use generator::{GeneratorOperation, GeneratorSpec};
pub use motor::{MotorOperation, MotorSpec};
