use crate::road::{Point2d, Road};
use crate::VehicleId;
use serde::{Deserialize, Serialize};

pub(crate) mod acceleration;
pub(crate) mod lane_change;

use self::acceleration::LeaderState;

/// Lateral interpolation speed in lane-units per second.
const LATERAL_SPEED: f64 = 2.5;

/// Lateral distance below which a vehicle snaps onto its target lane.
const LATERAL_SNAP: f64 = 0.05;

/// The category of a vehicle, which fixes its geometry and the range
/// its desired speed is sampled from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleKind {
    Car,
    Truck,
}

impl VehicleKind {
    /// The `(length, width)` of a vehicle of this kind in m.
    pub fn dimensions(self) -> (f64, f64) {
        match self {
            VehicleKind::Car => (4.5, 2.0),
            VehicleKind::Truck => (14.0, 2.6),
        }
    }
}

/// The attributes of a vehicle at the moment it enters the road.
#[derive(Clone, Copy, Debug)]
pub struct VehicleAttributes {
    pub kind: VehicleKind,
    /// The vehicle's length in m.
    pub length: f64,
    /// The vehicle's width in m.
    pub width: f64,
    /// The initial velocity in m/s.
    pub vel: f64,
    /// The driver's free-flow target speed in m/s.
    pub desired_vel: f64,
}

/// A simulated vehicle.
///
/// The longitudinal position `pos` is the front bumper; `lat` is a
/// continuous lane coordinate used only for rendering, while the physics
/// always works on the integer `lane`.
pub struct Vehicle {
    pub(crate) key: VehicleId,
    id: u64,
    kind: VehicleKind,
    pos: f64,
    lat: f64,
    lane: usize,
    vel: f64,
    acc: f64,
    length: f64,
    width: f64,
    desired_vel: f64,
    lane_change_timer: f64,
    indicator: i8,
    crashed: bool,
}

impl Vehicle {
    pub(crate) fn new(
        key: VehicleId,
        id: u64,
        attributes: &VehicleAttributes,
        lane: usize,
        pos: f64,
    ) -> Self {
        Self {
            key,
            id,
            kind: attributes.kind,
            pos,
            lat: lane as f64,
            lane,
            vel: attributes.vel,
            acc: 0.0,
            length: attributes.length,
            width: attributes.width,
            desired_vel: attributes.desired_vel,
            lane_change_timer: 0.0,
            indicator: 0,
            crashed: false,
        }
    }

    /// The vehicle's unique id, assigned in increasing order of entry.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    /// The longitudinal position of the front of the vehicle in m.
    pub fn pos(&self) -> f64 {
        self.pos
    }

    /// The longitudinal position of the rear of the vehicle in m.
    pub fn pos_rear(&self) -> f64 {
        self.pos - self.length
    }

    /// The continuous lane coordinate, which trails `lane` during a change.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// The lane the vehicle is driving in (or moving towards).
    pub fn lane(&self) -> usize {
        self.lane
    }

    /// The vehicle's velocity in m/s.
    pub fn vel(&self) -> f64 {
        self.vel
    }

    /// The vehicle's acceleration in m/s².
    pub fn acc(&self) -> f64 {
        self.acc
    }

    /// The vehicle's length in m.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The vehicle's width in m.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// The driver's free-flow target speed in m/s.
    pub fn desired_vel(&self) -> f64 {
        self.desired_vel
    }

    /// The turn-signal state: -1 towards lane 0, +1 towards higher lanes,
    /// 0 when no change is in progress.
    pub fn indicator(&self) -> i8 {
        self.indicator
    }

    /// Whether the vehicle is pinned by an incident.
    pub fn is_crashed(&self) -> bool {
        self.crashed
    }

    /// The vehicle's world-space position for rendering.
    pub fn world_pos(&self, road: &Road) -> Point2d {
        road.world_pos(self.pos, self.lat)
    }

    /// How this vehicle appears to a follower: the bumper-to-bumper gap
    /// and the leader's velocity.
    pub(crate) fn lead_state(&self, follower: &Vehicle) -> LeaderState {
        LeaderState {
            gap: self.pos_rear() - follower.pos(),
            vel: self.vel,
        }
    }

    /// Whether MOBIL may consider this vehicle this step.
    pub(crate) fn can_change_lanes(&self) -> bool {
        !self.crashed && self.lane_change_timer <= 0.0
    }

    pub(crate) fn apply_acceleration(&mut self, acc: f64) {
        if !self.crashed {
            self.acc = acc;
        }
    }

    /// Commits a lane change decided by MOBIL: retargets the lane, starts
    /// the cooldown and sets the indicator towards the new lane.
    pub(crate) fn begin_lane_change(&mut self, lane: usize) {
        self.lane_change_timer = lane_change::COOLDOWN;
        self.indicator = if lane as f64 > self.lat { 1 } else { -1 };
        self.lane = lane;
    }

    /// Pins the vehicle in place for the duration of an incident.
    pub(crate) fn crash(&mut self) {
        self.crashed = true;
        self.vel = 0.0;
        self.acc = 0.0;
    }

    /// Releases the vehicle after an incident; normal physics resume on
    /// the next step.
    pub(crate) fn restore(&mut self) {
        self.crashed = false;
    }

    /// Advances the vehicle by `dt` seconds: semi-implicit Euler on
    /// velocity and position, plus the visual lateral interpolation.
    /// Crashed vehicles keep `vel = 0, acc = 0` and do not move.
    pub(crate) fn integrate(&mut self, dt: f64) {
        self.lane_change_timer = f64::max(self.lane_change_timer - dt, 0.0);

        if self.crashed {
            self.vel = 0.0;
            self.acc = 0.0;
        } else {
            self.vel = f64::max(self.vel + self.acc * dt, 0.0);
            self.pos += self.vel * dt;
        }

        let offset = self.lane as f64 - self.lat;
        if offset.abs() > LATERAL_SNAP {
            self.lat += offset.signum() * f64::min(LATERAL_SPEED * dt, offset.abs());
        } else {
            self.lat = self.lane as f64;
            self.indicator = 0;
        }
    }
}
