//! Scenario files: vehicle body, ratings, strategy tuning and run settings.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::rescale::{RatingWarning, Ratings, rescale};
use crate::sim::controller::RuleBasedController;
use crate::sim::cycle::{CYCLE_NAMES, DriveCycle};
use crate::vehicle::VehicleConfig;

/// Controller names accepted in `simulation.controller`.
pub const CONTROLLERS: [&str; 2] = ["rule-based", "electric-only"];

/// One simulation scenario as read from a TOML file or preset.
///
/// All fields have defaults matching the `compact` preset. Load from TOML
/// with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::compact`] for the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Run timing, cycle and controller selection.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Rule-based controller tuning.
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// Vehicle body and final drive.
    #[serde(default)]
    pub body: BodyConfig,
    /// Optional component ratings; any set value rescales the reference vehicle.
    #[serde(default)]
    pub ratings: Ratings,
}

/// Run timing, cycle and controller selection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Timestep duration (s, must be > 0).
    pub dt_s: f64,
    /// Cycle duration (s, must be >= dt_s).
    pub duration_s: f64,
    /// Battery SOC at the first step, as a fraction.
    pub initial_soc: f64,
    /// Controller type: `"rule-based"` or `"electric-only"`.
    pub controller: String,
    /// Drive cycle: `"cruise"`, `"trapezoid"` or `"urban"`.
    pub cycle: String,
    /// Seed for the stochastic cycle generator.
    pub seed: u64,
    /// Auxiliary electrical load (W).
    pub aux_power_w: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt_s: 1.0,
            duration_s: 600.0,
            initial_soc: 0.6,
            controller: "rule-based".to_string(),
            cycle: "urban".to_string(),
            seed: 42,
            aux_power_w: 0.0,
        }
    }
}

/// Rule-based controller tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrategyConfig {
    /// SOC the controller steers toward, as a fraction.
    pub soc_target: f64,
    /// Extra engine power per unit SOC deficit (W).
    pub soc_gain: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        let c = RuleBasedController::default();
        Self {
            soc_target: c.soc_target,
            soc_gain: c.soc_gain,
        }
    }
}

/// Vehicle body and final drive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BodyConfig {
    /// Vehicle mass before any rescaling (kg).
    pub mass_kg: f64,
    /// Drag coefficient times frontal area (m²).
    pub drag_area_m2: f64,
    /// Rolling resistance coefficient.
    pub rolling_coef: f64,
    /// Wheel rolling radius (m).
    pub wheel_radius_m: f64,
    /// Final drive ratio.
    pub final_drive_ratio: f64,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            mass_kg: 1450.0,
            drag_area_m2: 0.62,
            rolling_coef: 0.009,
            wheel_radius_m: 0.31,
            final_drive_ratio: 7.0,
        }
    }
}

impl ScenarioConfig {
    /// Returns the compact passenger car on the reference powertrain.
    pub fn compact() -> Self {
        Self::default()
    }

    /// Returns the SUV preset: heavier body, upsized powertrain, highway-ish trapezoid.
    pub fn suv() -> Self {
        Self {
            simulation: SimulationConfig {
                cycle: "trapezoid".to_string(),
                duration_s: 900.0,
                aux_power_w: 800.0,
                ..SimulationConfig::default()
            },
            strategy: StrategyConfig {
                soc_gain: 150_000.0,
                ..StrategyConfig::default()
            },
            body: BodyConfig {
                mass_kg: 2100.0,
                drag_area_m2: 0.95,
                rolling_coef: 0.011,
                wheel_radius_m: 0.36,
                final_drive_ratio: 8.0,
            },
            ratings: Ratings {
                motor_kw: Some(150.0),
                engine_kw: Some(110.0),
                generator_kw: Some(115.0),
                battery_kwh: Some(12.0),
            },
        }
    }

    /// Returns the delivery-van preset: heavy stop-and-go with a large auxiliary load.
    pub fn delivery_van() -> Self {
        Self {
            simulation: SimulationConfig {
                duration_s: 1800.0,
                initial_soc: 0.7,
                aux_power_w: 1500.0,
                ..SimulationConfig::default()
            },
            strategy: StrategyConfig {
                soc_target: 0.55,
                soc_gain: 120_000.0,
            },
            body: BodyConfig {
                mass_kg: 2800.0,
                drag_area_m2: 1.4,
                rolling_coef: 0.012,
                wheel_radius_m: 0.35,
                final_drive_ratio: 8.5,
            },
            ratings: Ratings {
                motor_kw: Some(120.0),
                engine_kw: Some(90.0),
                generator_kw: Some(95.0),
                battery_kwh: Some(20.0),
            },
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["compact", "suv", "delivery_van"];

    /// Returns the built-in scenario called `name`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the known presets if `name` is not one.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "compact" => Ok(Self::compact()),
            "suv" => Ok(Self::suv()),
            "delivery_van" => Ok(Self::delivery_van()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Reads and parses a scenario file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for an unreadable file or malformed TOML.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses scenario TOML; missing sections and keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for malformed TOML or an unrecognised key.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Checks every section and collects all violations.
    ///
    /// Returns an empty vector if configuration is valid. Vehicle-level
    /// checks run later in [`ScenarioConfig::build_vehicle`].
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if !(s.dt_s > 0.0 && s.dt_s.is_finite()) {
            errors.push(ConfigError::new("simulation.dt_s", "must be finite and > 0"));
        }
        if !(s.duration_s >= s.dt_s && s.duration_s.is_finite()) {
            errors.push(ConfigError::new("simulation.duration_s", "must be finite and >= simulation.dt_s"));
        }
        if !(0.0..=1.0).contains(&s.initial_soc) {
            errors.push(ConfigError::new("simulation.initial_soc", "must be in [0.0, 1.0]"));
        }
        if !CONTROLLERS.contains(&s.controller.as_str()) {
            errors.push(ConfigError::new(
                "simulation.controller",
                format!("must be one of {}, got \"{}\"", CONTROLLERS.join(", "), s.controller),
            ));
        }
        if !CYCLE_NAMES.contains(&s.cycle.as_str()) {
            errors.push(ConfigError::new(
                "simulation.cycle",
                format!("must be one of {}, got \"{}\"", CYCLE_NAMES.join(", "), s.cycle),
            ));
        }
        if !(s.aux_power_w.is_finite() && s.aux_power_w >= 0.0) {
            errors.push(ConfigError::new("simulation.aux_power_w", "must be finite and >= 0"));
        }

        let st = &self.strategy;
        if !(0.0..=1.0).contains(&st.soc_target) {
            errors.push(ConfigError::new("strategy.soc_target", "must be in [0.0, 1.0]"));
        }
        if !(st.soc_gain.is_finite() && st.soc_gain >= 0.0) {
            errors.push(ConfigError::new("strategy.soc_gain", "must be finite and >= 0"));
        }

        let b = &self.body;
        for (field, value) in [
            ("body.mass_kg", b.mass_kg),
            ("body.wheel_radius_m", b.wheel_radius_m),
            ("body.final_drive_ratio", b.final_drive_ratio),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                errors.push(ConfigError::new(field, "must be finite and > 0"));
            }
        }
        if b.drag_area_m2 < 0.0 {
            errors.push(ConfigError::new("body.drag_area_m2", "must be >= 0"));
        }
        if b.rolling_coef < 0.0 {
            errors.push(ConfigError::new("body.rolling_coef", "must be >= 0"));
        }

        let r = &self.ratings;
        for (field, value) in [
            ("ratings.motor_kw", r.motor_kw),
            ("ratings.engine_kw", r.engine_kw),
            ("ratings.generator_kw", r.generator_kw),
            ("ratings.battery_kwh", r.battery_kwh),
        ] {
            if value.is_some_and(|v| !(v > 0.0 && v.is_finite())) {
                errors.push(ConfigError::new(field, "must be finite and > 0"));
            }
        }

        errors
    }

    /// Builds the vehicle: reference powertrain, this body, then any rescaling.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` from the reference build, rescaling
    /// or the final vehicle validation.
    pub fn build_vehicle(&self) -> Result<(VehicleConfig, Vec<RatingWarning>), ConfigError> {
        let mut vehicle = VehicleConfig::reference(self.simulation.dt_s)?
            .with_aux_power(self.simulation.aux_power_w);
        let b = &self.body;
        vehicle.body.mass_kg = b.mass_kg;
        vehicle.body.drag_area_m2 = b.drag_area_m2;
        vehicle.body.rolling_coef = b.rolling_coef;
        vehicle.body.wheel_radius_m = b.wheel_radius_m;
        vehicle.body.final_drive_ratio = b.final_drive_ratio;

        if self.ratings.is_empty() {
            vehicle.ensure_valid()?;
            return Ok((vehicle, Vec::new()));
        }
        let rescaled = rescale(&vehicle, &self.ratings)?;
        Ok((rescaled.config, rescaled.warnings))
    }

    /// Builds the configured drive cycle.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for an unknown cycle or invalid timing.
    pub fn drive_cycle(&self) -> Result<DriveCycle, ConfigError> {
        let s = &self.simulation;
        DriveCycle::from_name(&s.cycle, s.duration_s, s.dt_s, s.seed)
    }

    /// Rule-based controller with this scenario's tuning.
    pub fn rule_based_controller(&self) -> RuleBasedController {
        RuleBasedController::new(self.strategy.soc_target, self.strategy.soc_gain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_preset_valid() {
        let cfg = ScenarioConfig::compact();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "compact should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
dt_s = 0.5
duration_s = 120.0
initial_soc = 0.4
controller = "electric-only"
cycle = "cruise"
seed = 99
aux_power_w = 250.0

[strategy]
soc_target = 0.5
soc_gain = 80000.0

[body]
mass_kg = 1600.0
drag_area_m2 = 0.7
rolling_coef = 0.01
wheel_radius_m = 0.32
final_drive_ratio = 7.5

[ratings]
motor_kw = 100.0
battery_kwh = 8.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.simulation.dt_s), Some(0.5));
        assert_eq!(cfg.as_ref().map(|c| &*c.simulation.controller), Some("electric-only"));
        assert_eq!(cfg.as_ref().and_then(|c| c.ratings.motor_kw), Some(100.0));
        assert_eq!(cfg.as_ref().and_then(|c| c.ratings.engine_kw), None);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let toml = r#"
[simulation]
dt_s = 1.0
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn unknown_rating_is_rejected() {
        let toml = r#"
[ratings]
turbo_kw = 10.0
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_zero_dt() {
        let mut cfg = ScenarioConfig::compact();
        cfg.simulation.dt_s = 0.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.dt_s"));
    }

    #[test]
    fn out_of_range_initial_soc_is_reported() {
        let mut cfg = ScenarioConfig::compact();
        cfg.simulation.initial_soc = 1.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.initial_soc"));
    }

    #[test]
    fn validation_catches_bad_controller_and_cycle() {
        let mut cfg = ScenarioConfig::compact();
        cfg.simulation.controller = "bogus".to_string();
        cfg.simulation.cycle = "moon".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.controller"));
        assert!(errors.iter().any(|e| e.field == "simulation.cycle"));
    }

    #[test]
    fn validation_catches_negative_rating() {
        let mut cfg = ScenarioConfig::compact();
        cfg.ratings.engine_kw = Some(-5.0);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "ratings.engine_kw"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn compact_vehicle_matches_reference() {
        let (vehicle, warnings) = ScenarioConfig::compact().build_vehicle().unwrap();
        assert_eq!(vehicle, VehicleConfig::reference(1.0).unwrap());
        assert!(warnings.is_empty());
    }

    #[test]
    fn suv_is_heavier_and_stronger() {
        let (compact, _) = ScenarioConfig::compact().build_vehicle().unwrap();
        let (suv, warnings) = ScenarioConfig::suv().build_vehicle().unwrap();
        assert!(suv.body.mass_kg > compact.body.mass_kg);
        assert!(suv.motor.rated_power_w > compact.motor.rated_power_w);
        assert!(suv.battery.nominal_energy_kwh() > compact.battery.nominal_energy_kwh());
        assert_eq!(suv.aux_power_w, 800.0);
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn missing_sections_take_defaults() {
        let toml = r#"
[simulation]
seed = 99
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        // seed overridden
        assert_eq!(cfg.as_ref().map(|c| c.simulation.seed), Some(99));
        // timestep kept default
        assert_eq!(cfg.as_ref().map(|c| c.simulation.dt_s), Some(1.0));
        // body kept default
        assert_eq!(cfg.as_ref().map(|c| c.body.mass_kg), Some(1450.0));
        assert!(cfg.as_ref().is_some_and(|c| c.ratings.is_empty()));
    }
}
