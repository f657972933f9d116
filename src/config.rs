use serde::{Deserialize, Serialize};

/// The simulation parameters a host may adjust between steps.
///
/// Every option takes effect on the next [`step`](crate::Simulation::step);
/// none of them require rebuilding the simulation. Values outside the
/// ranges documented per field are programming errors and are rejected by
/// debug assertions at step entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Target arrival rate at the upstream boundary in veh/h,
    /// 500–3000, or exactly 0 to close the entry.
    pub inflow_rate: f64,
    /// Multiplier applied to the base integration step, 0.1–5.0.
    pub time_scale: f64,
    /// Probability that a spawned vehicle is a truck, 0.0–0.4.
    pub truck_ratio: f64,
    /// Host-side pause gate. The core does not consult this flag;
    /// a paused host simply stops calling `step`.
    pub paused: bool,
    /// MOBIL politeness factor `p`, 0.0–1.0.
    pub politeness: f64,
    /// IDM safe time gap `T` in s, 0.5–3.0.
    pub safe_time_gap: f64,
    /// IDM maximum acceleration in m/s².
    pub max_accel: f64,
    /// Magnitude of the uniform driver-imperfection noise in m/s²,
    /// 0.0–1.0. Applied only to vehicles travelling faster than 1 m/s.
    pub acceleration_noise: f64,
}

impl Default for SimulationConfig {
    /// A general-purpose baseline: moderate inflow, a light truck share
    /// and mild driver noise.
    fn default() -> Self {
        Self {
            inflow_rate: 1500.0,
            time_scale: 1.0,
            truck_ratio: 0.1,
            paused: false,
            politeness: 0.2,
            safe_time_gap: 1.5,
            max_accel: 1.5,
            acceleration_noise: 0.3,
        }
    }
}

impl SimulationConfig {
    /// Checks the documented option ranges. Debug builds fail fast on
    /// out-of-range values; release builds leave validation to the host.
    pub(crate) fn validate(&self) {
        debug_assert!(
            self.inflow_rate == 0.0 || (500.0..=3000.0).contains(&self.inflow_rate),
            "inflow rate outside 500-3000 veh/h and not a closed entry"
        );
        debug_assert!(
            (0.1..=5.0).contains(&self.time_scale),
            "time scale outside [0.1, 5.0]"
        );
        debug_assert!(
            (0.0..=0.4).contains(&self.truck_ratio),
            "truck ratio outside [0, 0.4]"
        );
        debug_assert!(
            (0.0..=1.0).contains(&self.politeness),
            "politeness outside [0, 1]"
        );
        debug_assert!(
            (0.5..=3.0).contains(&self.safe_time_gap),
            "safe time gap outside [0.5, 3.0] s"
        );
        debug_assert!(self.max_accel > 0.0, "non-positive maximum acceleration");
        debug_assert!(
            (0.0..=1.0).contains(&self.acceleration_noise),
            "acceleration noise outside [0, 1]"
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config_is_within_the_documented_ranges() {
        SimulationConfig::default().validate();
    }

    #[test]
    fn a_closed_entry_is_valid() {
        let config = SimulationConfig {
            inflow_rate: 0.0,
            ..Default::default()
        };
        config.validate();
    }

    #[test]
    #[should_panic(expected = "truck ratio")]
    #[cfg(debug_assertions)]
    fn excessive_truck_ratio_fails_fast() {
        let config = SimulationConfig {
            truck_ratio: 0.8,
            ..Default::default()
        };
        config.validate();
    }

    #[test]
    #[should_panic(expected = "inflow rate")]
    #[cfg(debug_assertions)]
    fn trickle_inflow_fails_fast() {
        let config = SimulationConfig {
            inflow_rate: 100.0,
            ..Default::default()
        };
        config.validate();
    }
}
