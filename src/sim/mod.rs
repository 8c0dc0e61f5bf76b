/// Batch evaluation over independent timesteps.
pub mod batch;
pub mod controller;
/// Drive cycle generation.
pub mod cycle;
pub mod kpi;
pub mod runner;
pub mod step;
pub mod types;
