//! Traction battery: internal-resistance current solve and SOC update.

use crate::maps::Interp1D;

/// Seconds per hour, converts Ah capacity to coulombs.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Battery pack parameters.
///
/// The pack is an open-circuit voltage source `ocv(soc)` in series with an
/// internal resistance `resistance(soc)`.
///
/// # Current Convention
/// - Positive current: discharging (SOC decreases)
/// - Negative current: charging (SOC increases)
#[derive(Debug, Clone, PartialEq)]
pub struct BatterySpec {
    /// Nominal capacity (Ah).
    pub capacity_ah: f64,
    /// Nominal pack voltage (V), used for energy ratings.
    pub nominal_voltage_v: f64,
    /// Open-circuit voltage vs SOC (V).
    pub ocv: Interp1D,
    /// Internal resistance vs SOC (Ω).
    pub resistance: Interp1D,
    /// Maximum charge current magnitude (A, positive value).
    pub max_charge_current_a: f64,
    /// Maximum discharge current (A, positive value).
    pub max_discharge_current_a: f64,
    /// Lowest admissible SOC after a step.
    pub soc_min: f64,
    /// Highest admissible SOC after a step.
    pub soc_max: f64,
    pub mass_kg: f64,
}

/// Battery evaluation for one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryOperation {
    /// Net electrical power drawn from the pack (W, positive = discharge).
    pub power_w: f64,
    pub ocv_v: f64,
    pub resistance_ohm: f64,
    /// Current from the quadratic solve, before the charge clamp (A).
    pub current_unclamped_a: f64,
    /// Current used for the SOC update (A).
    pub current_a: f64,
    /// Terminal voltage `ocv - current * resistance` (V).
    pub terminal_voltage_v: f64,
    /// `true` when the requested power exceeds `ocv² / 4R` and only the
    /// real part of the complex root was kept.
    pub power_limited: bool,
    pub soc: f64,
    pub soc_next: f64,
    pub infeasible: bool,
}

impl BatterySpec {
    /// Nominal energy (kWh).
    pub fn nominal_energy_kwh(&self) -> f64 {
        self.capacity_ah * self.nominal_voltage_v / 1000.0
    }

    /// Solves for pack current, advances SOC by `dt_s`, and checks limits.
    ///
    /// Feasibility is judged on the current before the charge clamp, so a
    /// clamped regen step still reports its limit violation.
    pub fn advance(&self, soc: f64, power_w: f64, dt_s: f64) -> BatteryOperation {
        let ocv_v = self.ocv.eval(soc);
        let resistance_ohm = self.resistance.eval(soc);
        let (current_unclamped_a, power_limited) = solve_current(ocv_v, resistance_ohm, power_w);

        let current_a = current_unclamped_a.max(-self.max_charge_current_a);
        let soc_next = soc - current_a * dt_s / (self.capacity_ah * SECONDS_PER_HOUR);

        let current_violation = if power_w <= 0.0 {
            current_unclamped_a < -self.max_charge_current_a
        } else {
            current_unclamped_a > self.max_discharge_current_a
        };
        let soc_violation = soc_next < self.soc_min || soc_next > self.soc_max;
        // NaN slips through every comparison above and `max` hides it
        let non_finite = !power_w.is_finite() || !current_unclamped_a.is_finite();

        BatteryOperation {
            power_w,
            ocv_v,
            resistance_ohm,
            current_unclamped_a,
            current_a,
            terminal_voltage_v: ocv_v - current_a * resistance_ohm,
            power_limited,
            soc,
            soc_next,
            infeasible: current_violation || power_limited || soc_violation || non_finite,
        }
    }
}

/// Solves `power = I * (ocv - I * r)` for the physical (smaller) root.
///
/// Returns the current and whether the discriminant was negative. A negative
/// discriminant means no real current can deliver `power`; the real part
/// `ocv / 2r` of the complex root is returned instead. That value is an
/// approximation and must only be used together with the infeasibility flag.
pub fn solve_current(ocv: f64, r: f64, power: f64) -> (f64, bool) {
    if power == 0.0 {
        return (0.0, false);
    }
    if r <= 0.0 {
        return (power / ocv, false);
    }
    let discriminant = ocv * ocv - 4.0 * r * power;
    if discriminant < 0.0 {
        (ocv / (2.0 * r), true)
    } else {
        ((ocv - discriminant.sqrt()) / (2.0 * r), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn battery() -> BatterySpec {
        BatterySpec {
            capacity_ah: 10.0,
            nominal_voltage_v: 200.0,
            ocv: Interp1D::new(vec![0.0, 1.0], vec![180.0, 220.0]).unwrap(),
            resistance: Interp1D::constant(0.0, 1.0, 0.2).unwrap(),
            max_charge_current_a: 50.0,
            max_discharge_current_a: 100.0,
            soc_min: 0.0,
            soc_max: 1.0,
            mass_kg: 40.0,
        }
    }

    #[test]
    fn zero_power_keeps_soc() {
        let b = battery();
        for soc in [0.01, 0.3, 0.5, 0.77, 0.99] {
            let op = b.advance(soc, 0.0, 1.0);
            assert_eq!(op.current_a, 0.0);
            assert_eq!(op.soc_next, soc);
            assert!(!op.infeasible);
        }
    }

    #[test]
    fn current_satisfies_power_balance() {
        let b = battery();
        let op = b.advance(0.5, 10_000.0, 1.0);
        let delivered = op.current_a * (op.ocv_v - op.current_a * op.resistance_ohm);
        assert!((delivered - 10_000.0).abs() < 1e-6);
        assert!(op.current_a > 0.0);
        assert!(op.soc_next < 0.5);
    }

    #[test]
    fn charging_raises_soc() {
        let op = battery().advance(0.5, -5_000.0, 10.0);
        assert!(op.current_a < 0.0);
        assert!(op.soc_next > 0.5);
        assert!(!op.infeasible);
    }

    #[test]
    fn soc_update_uses_capacity_in_amp_hours() {
        let op = battery().advance(0.5, 10_000.0, 36.0);
        let expected = 0.5 - op.current_a * 36.0 / (10.0 * 3600.0);
        assert_eq!(op.soc_next, expected);
    }

    #[test]
    fn regen_clamp_flags_but_updates_with_clamped_current() {
        let b = battery();
        // -20 kW at 200 V is about -95 A, beyond the 50 A charge limit
        let op = b.advance(0.5, -20_000.0, 1.0);
        assert!(op.current_unclamped_a < -50.0);
        assert_eq!(op.current_a, -50.0);
        assert!(op.infeasible);
        let expected = 0.5 + 50.0 * 1.0 / (10.0 * 3600.0);
        assert!((op.soc_next - expected).abs() < 1e-15);
    }

    #[test]
    fn discharge_limit_is_flagged() {
        let op = battery().advance(0.5, 30_000.0, 1.0);
        assert!(op.current_a > 100.0);
        assert!(op.infeasible);
    }

    #[test]
    fn negative_discriminant_keeps_real_part() {
        let b = battery();
        // ocv 200 V, r 0.2 Ω -> max transferable power 50 kW
        let op = b.advance(0.5, 60_000.0, 1.0);
        assert!(op.power_limited);
        assert!((op.current_unclamped_a - 200.0 / 0.4).abs() < 1e-9);
        assert!(op.infeasible);
    }

    #[test]
    fn non_finite_power_is_infeasible() {
        let b = battery();
        for p in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(b.advance(0.5, p, 1.0).infeasible, "{p}");
        }
    }

    #[test]
    fn soc_window_is_enforced() {
        let b = battery();
        let op = b.advance(0.0001, 10_000.0, 10.0);
        assert!(op.soc_next < 0.0);
        assert!(op.infeasible);
    }

    #[test]
    fn nominal_energy() {
        assert!((battery().nominal_energy_kwh() - 2.0).abs() < 1e-12);
    }
}
