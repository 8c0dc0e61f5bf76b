//! Batch evaluation over many independent timesteps.
//!
//! Steps share no state, so a batch is a plain map over the single-step
//! function. Callers that want parallelism can split the slices themselves.

use crate::error::SimError;
use crate::vehicle::VehicleConfig;

use super::step::step;
use super::types::{Control, ExogenousInput, StepResult};

/// Evaluates aligned slices of states, controls and inputs element-wise.
///
/// # Errors
///
/// Returns `SimError::BatchShape` if the slices differ in length.
pub fn step_batch(
    socs: &[f64],
    controls: &[Control],
    inputs: &[ExogenousInput],
    config: &VehicleConfig,
) -> Result<Vec<StepResult>, SimError> {
    if socs.len() != controls.len() || socs.len() != inputs.len() {
        return Err(SimError::BatchShape {
            socs: socs.len(),
            controls: controls.len(),
            inputs: inputs.len(),
        });
    }
    Ok(socs
        .iter()
        .zip(controls)
        .zip(inputs)
        .map(|((&soc, control), input)| step(soc, control, input, config))
        .collect())
}

/// Evaluates every candidate control from the same state and input.
///
/// This is the inner loop of grid-search controllers such as dynamic
/// programming over the engine operating point.
pub fn evaluate_controls(
    soc: f64,
    candidates: &[Control],
    input: &ExogenousInput,
    config: &VehicleConfig,
) -> Vec<StepResult> {
    candidates
        .iter()
        .map(|control| step(soc, control, input, config))
        .collect()
}

/// Index of the feasible candidate with the lowest stage cost, if any.
pub fn cheapest_feasible(results: &[StepResult]) -> Option<usize> {
    results
        .iter()
        .enumerate()
        .filter(|(_, r)| r.feasible)
        .min_by(|(_, a), (_, b)| a.stage_cost().total_cmp(&b.stage_cost()))
        .map(|(i, _)| i)
}
