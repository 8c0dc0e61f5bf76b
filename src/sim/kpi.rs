//! Post-hoc KPI computation from cycle records.

use std::fmt;

use super::runner::StepRecord;
use super::types::OperatingMode;

/// Gasoline density used for volumetric consumption (g/L).
pub const FUEL_DENSITY_G_PER_L: f64 = 745.0;

/// Aggregate indicators derived from a complete cycle run.
///
/// Computed post-hoc from the step records so that reported numbers always
/// agree with exported telemetry.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiReport {
    pub steps: usize,
    /// Total fuel burned (g).
    pub fuel_g: f64,
    /// Distance driven (km).
    pub distance_km: f64,
    /// Volumetric consumption (L/100 km); zero if no distance was covered.
    pub fuel_l_per_100km: f64,
    pub initial_soc: f64,
    pub final_soc: f64,
    pub min_soc: f64,
    pub max_soc: f64,
    /// Steps with at least one subsystem limit breached.
    pub infeasible_steps: usize,
    /// Time spent with the engine running (s).
    pub engine_on_time_s: f64,
    /// Share of steps per mode (%), in [`OperatingMode::ALL`] order.
    pub mode_share_pct: [f64; 3],
    /// Largest discharge current (A, positive).
    pub peak_discharge_current_a: f64,
    /// Largest charge current magnitude (A, positive).
    pub peak_charge_current_a: f64,
}

impl KpiReport {
    /// Computes all KPIs from the complete record vector.
    ///
    /// # Arguments
    ///
    /// * `records` - Records of one cycle run, in step order
    /// * `dt_s` - Timestep duration (s)
    pub fn from_records(records: &[StepRecord], dt_s: f64) -> Self {
        let (Some(first), Some(last)) = (records.first(), records.last()) else {
            return Self {
                steps: 0,
                fuel_g: 0.0,
                distance_km: 0.0,
                fuel_l_per_100km: 0.0,
                initial_soc: 0.0,
                final_soc: 0.0,
                min_soc: 0.0,
                max_soc: 0.0,
                infeasible_steps: 0,
                engine_on_time_s: 0.0,
                mode_share_pct: [0.0; 3],
                peak_discharge_current_a: 0.0,
                peak_charge_current_a: 0.0,
            };
        };

        let mut fuel_g = 0.0;
        let mut distance_m = 0.0;
        let mut min_soc = first.result.profile.soc;
        let mut max_soc = min_soc;
        let mut infeasible_steps = 0;
        let mut engine_on_steps = 0;
        let mut mode_counts = [0_usize; 3];
        let mut peak_discharge = 0.0_f64;
        let mut peak_charge = 0.0_f64;

        for r in records {
            let p = &r.result.profile;
            fuel_g += r.result.fuel_rate_g_s * dt_s;
            distance_m += p.vehicle_speed_mps * dt_s;
            min_soc = min_soc.min(r.result.soc_next);
            max_soc = max_soc.max(r.result.soc_next);
            if !r.result.feasible {
                infeasible_steps += 1;
            }
            if p.engine_on {
                engine_on_steps += 1;
            }
            if let Some(slot) = OperatingMode::ALL.iter().position(|m| *m == p.mode) {
                mode_counts[slot] += 1;
            }
            peak_discharge = peak_discharge.max(p.battery_current_a);
            peak_charge = peak_charge.max(-p.battery_current_a);
        }

        let n = records.len() as f64;
        let distance_km = distance_m / 1000.0;
        let fuel_l_per_100km = if distance_km > 0.0 {
            fuel_g / FUEL_DENSITY_G_PER_L / distance_km * 100.0
        } else {
            0.0
        };

        Self {
            steps: records.len(),
            fuel_g,
            distance_km,
            fuel_l_per_100km,
            initial_soc: first.result.profile.soc,
            final_soc: last.result.soc_next,
            min_soc,
            max_soc,
            infeasible_steps,
            engine_on_time_s: engine_on_steps as f64 * dt_s,
            mode_share_pct: mode_counts.map(|c| 100.0 * c as f64 / n),
            peak_discharge_current_a: peak_discharge,
            peak_charge_current_a: peak_charge,
        }
    }

    /// Net SOC change over the run.
    pub fn soc_delta(&self) -> f64 {
        self.final_soc - self.initial_soc
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "Steps:                 {}", self.steps)?;
        writeln!(f, "Fuel burned:           {:.1} g", self.fuel_g)?;
        writeln!(f, "Distance:              {:.2} km", self.distance_km)?;
        writeln!(f, "Consumption:           {:.2} L/100km", self.fuel_l_per_100km)?;
        writeln!(
            f,
            "SOC:                   {:.1}% -> {:.1}% (min {:.1}%, max {:.1}%)",
            self.initial_soc * 100.0,
            self.final_soc * 100.0,
            self.min_soc * 100.0,
            self.max_soc * 100.0
        )?;
        writeln!(f, "Engine on:             {:.0} s", self.engine_on_time_s)?;
        for (mode, share) in OperatingMode::ALL.iter().zip(self.mode_share_pct) {
            writeln!(f, "  {:<24} {:>5.1}%", mode.label(), share)?;
        }
        writeln!(
            f,
            "Peak battery current:  {:.1} A discharge, {:.1} A charge",
            self.peak_discharge_current_a, self.peak_charge_current_a
        )?;
        write!(f, "Infeasible steps:      {}", self.infeasible_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::controller::{ElectricOnlyController, RuleBasedController};
    use crate::sim::cycle::DriveCycle;
    use crate::sim::runner::Simulation;
    use crate::vehicle::VehicleConfig;

    #[test]
    fn empty_records_give_zeroes() {
        let kpi = KpiReport::from_records(&[], 1.0);
        assert_eq!(kpi.steps, 0);
        assert_eq!(kpi.fuel_l_per_100km, 0.0);
    }

    #[test]
    fn electric_only_run_burns_no_fuel() {
        let cfg = VehicleConfig::reference(1.0).unwrap();
        let sim = Simulation::new(cfg, ElectricOnlyController);
        let cycle = DriveCycle::cruise(20.0, 100.0, 1.0).unwrap();
        let kpi = KpiReport::from_records(&sim.run(&cycle, 0.8).unwrap(), 1.0);

        assert_eq!(kpi.fuel_g, 0.0);
        assert!((kpi.distance_km - 2.0).abs() < 1e-9);
        assert_eq!(kpi.mode_share_pct[0], 100.0);
        assert_eq!(kpi.engine_on_time_s, 0.0);
        assert!(kpi.soc_delta() < 0.0);
        assert!(kpi.peak_discharge_current_a > 0.0);
    }

    #[test]
    fn mode_shares_sum_to_one_hundred() {
        let cfg = VehicleConfig::reference(1.0).unwrap();
        let sim = Simulation::new(cfg, RuleBasedController::default());
        let cycle = DriveCycle::urban(400.0, 1.0, 3).unwrap();
        let kpi = KpiReport::from_records(&sim.run(&cycle, 0.45).unwrap(), 1.0);
        let total: f64 = kpi.mode_share_pct.iter().sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!(kpi.fuel_g > 0.0);
        assert!(kpi.min_soc <= kpi.max_soc);
    }

    #[test]
    fn display_does_not_panic() {
        let kpi = KpiReport::from_records(&[], 1.0);
        assert!(format!("{kpi}").contains("KPI Report"));
    }
}
