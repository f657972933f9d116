//! Longitudinal acceleration by the intelligent driver model.

/// The free-acceleration exponent.
const DELTA: i32 = 4;

/// The comfortable deceleration of all vehicles in m/s².
const COMFORT_DECEL: f64 = 2.0;

/// The minimum standstill spacing between vehicles in m.
const JAM_DISTANCE: f64 = 2.0;

/// Lower bound on the interaction gap, which keeps the interaction term
/// finite when the geometric gap collapses.
const GAP_FLOOR: f64 = 0.1;

/// The IDM parameters shared by every driver for one step.
#[derive(Clone, Copy, Debug)]
pub struct IdmParams {
    /// The maximum acceleration in m/s².
    pub max_accel: f64,
    /// The safe time gap in s.
    pub time_gap: f64,
}

/// The vehicle ahead as seen by the ego driver.
#[derive(Clone, Copy, Debug)]
pub struct LeaderState {
    /// The bumper-to-bumper gap in m. May be negative under crash
    /// conditions or at the spawn boundary.
    pub gap: f64,
    /// The leader's velocity in m/s.
    pub vel: f64,
}

/// Computes the IDM acceleration of a driver travelling at `vel` with the
/// free-flow target `desired_vel`, optionally interacting with a leader.
pub fn idm_acceleration(
    params: &IdmParams,
    vel: f64,
    desired_vel: f64,
    leader: Option<LeaderState>,
) -> f64 {
    let free = params.max_accel * (1.0 - (vel / desired_vel).powi(DELTA));
    let Some(leader) = leader else {
        return free;
    };

    let approach = vel - leader.vel;
    let factor = 1.0 / (2.0 * (params.max_accel * COMFORT_DECEL).sqrt());
    let desired_gap = JAM_DISTANCE + vel * params.time_gap + vel * approach * factor;
    let term = desired_gap / f64::max(leader.gap, GAP_FLOOR);
    free - params.max_accel * term * term
}
