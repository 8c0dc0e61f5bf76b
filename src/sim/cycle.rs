//! Drive cycles: vehicle speed traces sampled at a fixed timestep.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::error::ConfigError;

use super::types::ExogenousInput;

/// Built-in cycle names accepted by [`DriveCycle::from_name`].
pub const CYCLE_NAMES: [&str; 3] = ["cruise", "trapezoid", "urban"];

/// A vehicle speed trace.
///
/// # Examples
///
/// ```
/// use shev_sim::sim::cycle::DriveCycle;
///
/// let cycle = DriveCycle::trapezoid(20.0, 10.0, 30.0, 10.0, 1.0).unwrap();
/// let inputs = cycle.inputs();
/// assert_eq!(inputs.len(), cycle.len());
/// assert!((inputs[0].vehicle_accel_mps2 - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DriveCycle {
    pub name: String,
    /// Sample spacing (s).
    pub dt_s: f64,
    /// Vehicle speed per sample (m/s).
    pub speeds_mps: Vec<f64>,
}

impl DriveCycle {
    /// Creates a cycle from a raw speed trace.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for a non-positive timestep, an empty trace,
    /// or negative/non-finite speeds.
    pub fn new(name: impl Into<String>, dt_s: f64, speeds_mps: Vec<f64>) -> Result<Self, ConfigError> {
        if !(dt_s > 0.0 && dt_s.is_finite()) {
            return Err(ConfigError::new("cycle.dt_s", "must be finite and > 0"));
        }
        if speeds_mps.is_empty() {
            return Err(ConfigError::new("cycle.speeds_mps", "must not be empty"));
        }
        if let Some(i) = speeds_mps.iter().position(|v| !(v.is_finite() && *v >= 0.0)) {
            return Err(ConfigError::new(
                "cycle.speeds_mps",
                format!("sample {i} must be finite and >= 0"),
            ));
        }
        Ok(Self {
            name: name.into(),
            dt_s,
            speeds_mps,
        })
    }

    /// Constant speed for `duration_s`.
    pub fn cruise(speed_mps: f64, duration_s: f64, dt_s: f64) -> Result<Self, ConfigError> {
        let n = sample_count(duration_s, dt_s)?;
        Self::new("cruise", dt_s, vec![speed_mps; n])
    }

    /// Accelerate from rest to `peak_mps`, hold, then brake back to rest.
    pub fn trapezoid(
        peak_mps: f64,
        accel_s: f64,
        hold_s: f64,
        decel_s: f64,
        dt_s: f64,
    ) -> Result<Self, ConfigError> {
        if !(dt_s > 0.0 && dt_s.is_finite()) {
            return Err(ConfigError::new("cycle.dt_s", "must be finite and > 0"));
        }
        let mut speeds = Vec::new();
        let mut trace = TraceBuilder::new(dt_s, &mut speeds);
        trace.ramp_to(peak_mps, accel_s);
        trace.hold(hold_s);
        trace.ramp_to(0.0, decel_s);
        Self::new("trapezoid", dt_s, speeds)
    }

    /// Seeded stop-and-go city driving of `duration_s`.
    ///
    /// Each micro-trip idles, accelerates to a random peak, cruises with
    /// Gaussian speed noise and brakes to rest. The same seed always yields
    /// the same trace.
    pub fn urban(duration_s: f64, dt_s: f64, seed: u64) -> Result<Self, ConfigError> {
        let n = sample_count(duration_s, dt_s)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut speeds = Vec::with_capacity(n + 64);

        while speeds.len() < n {
            let idle_s = rng.random_range(5.0..20.0);
            let peak = rng.random_range(8.0..15.0);
            let accel = rng.random_range(0.8..1.5);
            let cruise_s = rng.random_range(10.0..40.0);
            let decel = rng.random_range(1.0..1.8);

            let mut trace = TraceBuilder::new(dt_s, &mut speeds);
            trace.hold(idle_s);
            trace.ramp_to(peak, peak / accel);
            let cruise_steps = (cruise_s / dt_s).round() as usize;
            for _ in 0..cruise_steps {
                let v = (peak + gaussian_noise(&mut rng, 0.3)).max(0.0);
                trace.push(v);
            }
            trace.ramp_to(0.0, peak / decel);
        }
        speeds.truncate(n);
        Self::new("urban", dt_s, speeds)
    }

    /// Looks up a built-in cycle by name.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for an unknown name or invalid timing.
    pub fn from_name(name: &str, duration_s: f64, dt_s: f64, seed: u64) -> Result<Self, ConfigError> {
        match name {
            "cruise" => Self::cruise(20.0, duration_s, dt_s),
            "trapezoid" => {
                let ramp = (duration_s * 0.2).max(dt_s);
                Self::trapezoid(25.0, ramp, (duration_s - 2.0 * ramp).max(0.0), ramp, dt_s)
            }
            "urban" => Self::urban(duration_s, dt_s, seed),
            other => Err(ConfigError::new(
                "simulation.cycle",
                format!("unknown cycle '{other}' (expected one of {})", CYCLE_NAMES.join(", ")),
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.speeds_mps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speeds_mps.is_empty()
    }

    pub fn duration_s(&self) -> f64 {
        self.len() as f64 * self.dt_s
    }

    /// Distance covered assuming each speed holds for one sample (m).
    pub fn distance_m(&self) -> f64 {
        self.speeds_mps.iter().sum::<f64>() * self.dt_s
    }

    /// Exogenous inputs with forward-difference acceleration.
    ///
    /// The last sample has zero acceleration.
    pub fn inputs(&self) -> Vec<ExogenousInput> {
        let v = &self.speeds_mps;
        (0..v.len())
            .map(|k| {
                let accel = match v.get(k + 1) {
                    Some(next) => (next - v[k]) / self.dt_s,
                    None => 0.0,
                };
                ExogenousInput::new(v[k], accel)
            })
            .collect()
    }
}

fn sample_count(duration_s: f64, dt_s: f64) -> Result<usize, ConfigError> {
    if !(dt_s > 0.0 && dt_s.is_finite()) {
        return Err(ConfigError::new("cycle.dt_s", "must be finite and > 0"));
    }
    if !(duration_s >= dt_s && duration_s.is_finite()) {
        return Err(ConfigError::new("cycle.duration_s", "must be finite and >= dt_s"));
    }
    Ok((duration_s / dt_s).round() as usize)
}

/// Appends piecewise-linear segments to a speed trace.
struct TraceBuilder<'a> {
    dt_s: f64,
    speeds: &'a mut Vec<f64>,
}

impl<'a> TraceBuilder<'a> {
    fn new(dt_s: f64, speeds: &'a mut Vec<f64>) -> Self {
        Self { dt_s, speeds }
    }

    fn current(&self) -> f64 {
        self.speeds.last().copied().unwrap_or(0.0)
    }

    fn push(&mut self, v: f64) {
        self.speeds.push(v);
    }

    fn hold(&mut self, seconds: f64) {
        let v = self.current();
        let steps = (seconds / self.dt_s).round() as usize;
        self.speeds.extend(std::iter::repeat_n(v, steps));
    }

    fn ramp_to(&mut self, target: f64, seconds: f64) {
        let start = self.current();
        let steps = ((seconds / self.dt_s).round() as usize).max(1);
        for i in 1..=steps {
            self.speeds.push(start + (target - start) * i as f64 / steps as f64);
        }
    }
}

/// Gaussian noise with the Box-Muller transform.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos() * std_dev
}
