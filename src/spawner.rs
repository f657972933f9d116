//! Vehicle arrivals at the upstream boundary.

use crate::rng::SimRng;
use crate::road::LANE_COUNT;
use crate::vehicle::{VehicleAttributes, VehicleKind};
use itertools::Itertools;
use rand_distr::Uniform;

/// The clear distance required at the entry before a spawn succeeds, in m.
const MIN_CLEARANCE: f64 = 40.0;

/// Bounds of the headway regularization factor. Tighter than a Poisson
/// process so that peak throughput stays reachable.
const HEADWAY_JITTER: (f64, f64) = (0.8, 1.2);

/// The entry speed as a fraction of the driver's desired speed.
const ENTRY_SPEED_FRACTION: f64 = 0.9;

/// Desired speed ranges in km/h.
const CAR_SPEED_KMH: (f64, f64) = (100.0, 120.0);
const TRUCK_SPEED_KMH: (f64, f64) = (80.0, 90.0);

/// Schedules and classifies arrivals.
///
/// The inter-arrival target is the mean headway `3600 / Q` scaled by a
/// uniform factor drawn once per arrival interval. A triggered attempt
/// that finds insufficient clearance aborts without resetting the clock,
/// so it retries on the next tick.
pub(crate) struct Spawner {
    /// Seconds since the last successful spawn.
    elapsed: f64,
    /// The headway factor for the current arrival interval.
    headway_factor: f64,
}

impl Spawner {
    pub fn new(rng: &mut SimRng) -> Self {
        Self {
            elapsed: 0.0,
            headway_factor: rng.uniform(HEADWAY_JITTER.0, HEADWAY_JITTER.1),
        }
    }

    /// Advances the arrival clock by `dt` and attempts a spawn once the
    /// current headway has elapsed. `head_room` is the distance from the
    /// entry to the rearmost vehicle per lane (infinite for empty lanes).
    ///
    /// Returns the chosen lane and the new vehicle's attributes.
    pub fn step(
        &mut self,
        dt: f64,
        inflow_rate: f64,
        truck_ratio: f64,
        head_room: &[f64; LANE_COUNT],
        rng: &mut SimRng,
    ) -> Option<(usize, VehicleAttributes)> {
        self.elapsed += dt;
        if inflow_rate <= 0.0 {
            return None;
        }
        let mean_headway = 3600.0 / inflow_rate;
        if self.elapsed <= self.headway_factor * mean_headway {
            return None;
        }

        // The emptiest lane at the entry; ties go to the rightmost lane.
        let lane = head_room
            .iter()
            .copied()
            .position_max_by(|a, b| a.total_cmp(b))
            .expect("road has at least one lane");
        if head_room[lane] <= MIN_CLEARANCE {
            return None;
        }

        let attributes = self.classify(truck_ratio, rng);
        self.elapsed = 0.0;
        self.headway_factor = rng.uniform(HEADWAY_JITTER.0, HEADWAY_JITTER.1);
        Some((lane, attributes))
    }

    fn classify(&self, truck_ratio: f64, rng: &mut SimRng) -> VehicleAttributes {
        let kind = if rng.chance(truck_ratio) {
            VehicleKind::Truck
        } else {
            VehicleKind::Car
        };
        let (lo, hi) = match kind {
            VehicleKind::Car => CAR_SPEED_KMH,
            VehicleKind::Truck => TRUCK_SPEED_KMH,
        };
        let desired_vel = rng.sample(Uniform::new(lo, hi)) / 3.6;
        let (length, width) = kind.dimensions();
        VehicleAttributes {
            kind,
            length,
            width,
            vel: ENTRY_SPEED_FRACTION * desired_vel,
            desired_vel,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const OPEN: [f64; LANE_COUNT] = [f64::INFINITY; LANE_COUNT];

    #[test]
    fn respects_the_mean_headway() {
        let mut rng = SimRng::new(3);
        let mut spawner = Spawner::new(&mut rng);

        // 1800 veh/h is a 2 s mean headway; nothing may arrive inside
        // the lower jitter bound.
        let mut elapsed = 0.0;
        let spawned = loop {
            if let Some(spawned) = spawner.step(0.1, 1800.0, 0.0, &OPEN, &mut rng) {
                break spawned;
            }
            elapsed += 0.1;
            assert!(elapsed < 3.0, "no arrival within the jitter window");
        };
        assert!(elapsed >= 1.5);
        assert!(spawned.1.desired_vel > 0.0);
    }

    #[test]
    fn blocked_entry_aborts_without_resetting_the_clock() {
        let mut rng = SimRng::new(3);
        let mut spawner = Spawner::new(&mut rng);

        let blocked = [MIN_CLEARANCE - 1.0; LANE_COUNT];
        for _ in 0..100 {
            assert!(spawner.step(0.1, 1800.0, 0.0, &blocked, &mut rng).is_none());
        }
        // The clock kept running, so a cleared entry spawns immediately.
        assert!(spawner.step(0.1, 1800.0, 0.0, &OPEN, &mut rng).is_some());
    }

    #[test]
    fn picks_the_emptiest_lane() {
        let mut rng = SimRng::new(7);
        let mut spawner = Spawner::new(&mut rng);

        let head_room = [60.0, 300.0, 90.0];
        let (lane, _) = loop {
            if let Some(spawned) = spawner.step(0.5, 1800.0, 0.0, &head_room, &mut rng) {
                break spawned;
            }
        };
        assert_eq!(lane, 1);
    }

    #[test]
    fn classification_follows_the_truck_ratio() {
        let mut rng = SimRng::new(11);
        let spawner = Spawner::new(&mut SimRng::new(11));

        let truck = spawner.classify(1.0, &mut rng);
        assert_eq!(truck.kind, VehicleKind::Truck);
        assert_eq!(truck.length, 14.0);
        let kmh = truck.desired_vel * 3.6;
        assert!((80.0..90.0).contains(&kmh));
        assert!((truck.vel - 0.9 * truck.desired_vel).abs() < 1e-12);

        let car = spawner.classify(0.0, &mut rng);
        assert_eq!(car.kind, VehicleKind::Car);
        assert_eq!(car.length, 4.5);
        let kmh = car.desired_vel * 3.6;
        assert!((100.0..120.0).contains(&kmh));
    }

    #[test]
    fn zero_inflow_never_spawns() {
        let mut rng = SimRng::new(5);
        let mut spawner = Spawner::new(&mut rng);
        for _ in 0..1000 {
            assert!(spawner.step(1.0, 0.0, 0.0, &OPEN, &mut rng).is_none());
        }
    }
}
