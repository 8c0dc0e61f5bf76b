//! Supervisory controllers that pick the engine operating point each step.

use crate::powertrain::ShaftDemand;
use crate::vehicle::VehicleConfig;

use super::types::Control;

/// Supervisory energy-management strategy.
///
/// Implementations see the current SOC and the shaft demand of the coming
/// step and return the engine operating point. They must not mutate shared
/// state so that a run is reproducible.
pub trait Controller {
    /// Chooses the engine operating point for one step.
    fn control(&self, soc: f64, demand: &ShaftDemand, config: &VehicleConfig) -> Control;

    /// Short name for logs and reports.
    fn name(&self) -> &'static str;
}

/// Inputs of the engine power heuristic (all in W).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerContext {
    /// Engine brake power needed to cover the bus demand.
    pub demand_w: f64,
    /// Engine brake power at minimum BSFC.
    pub optimal_w: f64,
    /// Engine peak brake power.
    pub max_w: f64,
}

/// One row of the engine power heuristic.
pub struct PowerRule {
    pub name: &'static str,
    pub applies: fn(&PowerContext) -> bool,
    pub command: fn(&PowerContext) -> f64,
}

/// Ordered rule table; the first matching row decides.
pub const POWER_RULES: [PowerRule; 4] = [
    PowerRule {
        name: "engine-off",
        applies: |c| c.demand_w <= 0.2 * c.optimal_w,
        command: |_| 0.0,
    },
    PowerRule {
        name: "run-at-optimum",
        applies: |c| c.demand_w <= c.optimal_w,
        command: |c| c.optimal_w,
    },
    PowerRule {
        name: "follow-demand",
        applies: |c| c.demand_w <= c.max_w,
        command: |c| c.demand_w,
    },
    PowerRule {
        name: "full-power",
        applies: |_| true,
        command: |c| c.max_w,
    },
];

/// Evaluates the rule table and returns `(rule name, engine power command in W)`.
pub fn engine_power_rule(demand_w: f64, optimal_w: f64, max_w: f64) -> (&'static str, f64) {
    let ctx = PowerContext {
        demand_w,
        optimal_w,
        max_w,
    };
    POWER_RULES
        .iter()
        .find(|rule| (rule.applies)(&ctx))
        .map_or(("full-power", max_w), |rule| (rule.name, (rule.command)(&ctx)))
}

/// Engine power command (W) for a given demand.
pub fn engine_power_command(demand_w: f64, optimal_w: f64, max_w: f64) -> f64 {
    engine_power_rule(demand_w, optimal_w, max_w).1
}

/// Rule-based thermostat strategy with SOC feedback.
///
/// The bus demand is corrected by `soc_gain * (soc_target - soc)`, fed to the
/// rule table, and the resulting power is placed on the engine's optimal
/// operating line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleBasedController {
    /// SOC the controller steers toward.
    pub soc_target: f64,
    /// Extra engine power per unit of SOC deficit (W).
    pub soc_gain: f64,
}

impl RuleBasedController {
    pub fn new(soc_target: f64, soc_gain: f64) -> Self {
        Self {
            soc_target,
            soc_gain,
        }
    }

    /// SOC-corrected electrical demand the engine should cover (W).
    pub fn corrected_demand_w(&self, soc: f64, demand: &ShaftDemand, config: &VehicleConfig) -> f64 {
        let motor = config.motor.operate(demand.speed, demand.torque);
        motor.electrical_power_w + config.aux_power_w + self.soc_gain * (self.soc_target - soc)
    }
}

impl Default for RuleBasedController {
    fn default() -> Self {
        Self::new(0.6, 100_000.0)
    }
}

impl Controller for RuleBasedController {
    fn control(&self, soc: f64, demand: &ShaftDemand, config: &VehicleConfig) -> Control {
        let engine = &config.engine;
        let demand_w = brake_power_for_bus(self.corrected_demand_w(soc, demand, config), config);
        let power_w = engine_power_command(demand_w, engine.optimal_power_w(), engine.peak_power_w());

        let (speed, torque) = engine.operating_point_for_power(power_w);
        // the line tops out below peak power; stay on the full-load curve
        Control::new(speed, torque.min(engine.max_torque.eval(speed)))
    }

    fn name(&self) -> &'static str {
        "rule-based"
    }
}

/// Engine brake power that puts `electrical_w` on the bus.
///
/// Generator losses are taken at the engine's best-BSFC point, where the rule
/// table places the engine most of the time. Non-positive demand passes
/// through unchanged.
pub fn brake_power_for_bus(electrical_w: f64, config: &VehicleConfig) -> f64 {
    if electrical_w <= 0.0 {
        return electrical_w;
    }
    let ool = &config.engine.ool;
    let efficiency = config.generator.operate(ool.best_speed, ool.best_torque).efficiency;
    if efficiency > 0.0 {
        electrical_w / efficiency
    } else {
        electrical_w
    }
}

/// Keeps the engine off; the battery supplies everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct ElectricOnlyController;

impl Controller for ElectricOnlyController {
    fn control(&self, _soc: f64, _demand: &ShaftDemand, config: &VehicleConfig) -> Control {
        Control::engine_off(config.engine.idle_speed)
    }

    fn name(&self) -> &'static str {
        "electric-only"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::powertrain::{LoadModel, RoadLoad};

    #[test]
    fn rule_table_is_ordered() {
        assert_eq!(engine_power_rule(1_000.0, 40_000.0, 60_000.0), ("engine-off", 0.0));
        assert_eq!(engine_power_rule(-5_000.0, 40_000.0, 60_000.0).1, 0.0);
        assert_eq!(engine_power_rule(20_000.0, 40_000.0, 60_000.0), ("run-at-optimum", 40_000.0));
        assert_eq!(engine_power_rule(50_000.0, 40_000.0, 60_000.0), ("follow-demand", 50_000.0));
        assert_eq!(engine_power_rule(90_000.0, 40_000.0, 60_000.0), ("full-power", 60_000.0));
    }

    #[test]
    fn boundaries_belong_to_the_earlier_rule() {
        assert_eq!(engine_power_command(8_000.0, 40_000.0, 60_000.0), 0.0);
        assert_eq!(engine_power_command(40_000.0, 40_000.0, 60_000.0), 40_000.0);
        assert_eq!(engine_power_command(60_000.0, 40_000.0, 60_000.0), 60_000.0);
    }

    #[test]
    fn bus_demand_is_grossed_up_for_generator_losses() {
        let cfg = VehicleConfig::reference(1.0).unwrap();
        let ool = &cfg.engine.ool;
        let eta = cfg.generator.operate(ool.best_speed, ool.best_torque).efficiency;
        assert!(eta > 0.0 && eta < 1.0);

        let brake = brake_power_for_bus(30_000.0, &cfg);
        assert!(brake > 30_000.0);
        assert!((brake - 30_000.0 / eta).abs() < 1e-9);
        assert_eq!(brake_power_for_bus(-5_000.0, &cfg), -5_000.0);
        assert_eq!(brake_power_for_bus(0.0, &cfg), 0.0);
    }

    #[test]
    fn engine_covers_the_bus_demand_after_losses() {
        let cfg = VehicleConfig::reference(1.0).unwrap();
        let demand = RoadLoad.demand(0.0, 0.0, &cfg);
        // standstill, SOC pulled far below target: optimum power on the bus
        let ctrl = RuleBasedController::new(0.6, 100_000.0);
        let soc = 0.6 - cfg.engine.optimal_power_w() / 100_000.0;
        let bus_w = ctrl.corrected_demand_w(soc, &demand, &cfg);
        let c = ctrl.control(soc, &demand, &cfg);
        let engine_w = c.engine_speed_rad_s * c.engine_torque_nm;
        assert!(bus_w > 0.0);
        assert!(engine_w > bus_w, "engine {engine_w} W, bus {bus_w} W");
    }

    #[test]
    fn electric_only_keeps_engine_off() {
        let cfg = VehicleConfig::reference(1.0).unwrap();
        let demand = RoadLoad.demand(20.0, 1.0, &cfg);
        let c = ElectricOnlyController.control(0.1, &demand, &cfg);
        assert_eq!(c, Control::engine_off(cfg.engine.idle_speed));
    }

    #[test]
    fn low_soc_starts_engine_at_standstill() {
        let cfg = VehicleConfig::reference(1.0).unwrap();
        let demand = RoadLoad.demand(0.0, 0.0, &cfg);
        let ctrl = RuleBasedController::new(0.6, 100_000.0);

        let charged = ctrl.control(0.7, &demand, &cfg);
        assert_eq!(charged.engine_torque_nm, 0.0);

        let depleted = ctrl.control(0.3, &demand, &cfg);
        assert!(depleted.engine_torque_nm > 0.0);
        assert!(depleted.engine_speed_rad_s > cfg.engine.idle_speed);
    }

    #[test]
    fn commanded_point_respects_full_load() {
        let cfg = VehicleConfig::reference(1.0).unwrap();
        let demand = RoadLoad.demand(35.0, 2.0, &cfg);
        let c = RuleBasedController::default().control(0.2, &demand, &cfg);
        let limit = cfg.engine.max_torque.eval(c.engine_speed_rad_s);
        assert!(c.engine_torque_nm <= limit);
        assert!(c.engine_torque_nm > 0.0);
    }
}
