use crate::config::SimulationConfig;
use crate::debug::{debug_lane_change, debug_spawn};
use crate::incident::Incident;
use crate::rng::SimRng;
use crate::road::{Road, LANE_COUNT};
use crate::spawner::Spawner;
use crate::stats::{StatsAggregator, TrafficStats};
use crate::vehicle::acceleration::{idm_acceleration, IdmParams};
use crate::vehicle::lane_change::CandidateEvaluation;
use crate::vehicle::{Vehicle, VehicleAttributes};
use crate::{VehicleId, VehicleSet};
use itertools::Itertools;
use smallvec::SmallVec;
use tracing::{debug, info, trace};

/// The base integration step in s. The effective step is scaled by
/// [`SimulationConfig::time_scale`].
pub const TIME_STEP: f64 = 1.0 / 60.0;

/// Acceleration noise is suppressed below this speed, in m/s.
const NOISE_SPEED_FLOOR: f64 = 1.0;

/// The seed used by [`Simulation::new`].
const DEFAULT_SEED: u64 = 0x00C0_FFEE;

/// A microscopic traffic simulation of one multi-lane road segment.
///
/// One [`step`](Self::step) advances simulation time by one tick through
/// five phases: sort by position, decide accelerations and lane changes,
/// integrate, apply the boundaries (despawn and inflow), and sample the
/// macroscopic flow. All mutation happens inside `step`; between steps the
/// host may freely read vehicles and statistics.
pub struct Simulation {
    /// The vehicles being simulated.
    vehicles: VehicleSet,
    /// Vehicle keys ordered by decreasing longitudinal position.
    order: Vec<VehicleId>,
    /// The road geometry.
    road: Road,
    /// The next public vehicle id.
    next_id: u64,
    /// Arrival scheduling at the upstream boundary.
    spawner: Spawner,
    /// The fundamental-diagram sampler.
    stats: StatsAggregator,
    /// The active incident, if any.
    incident: Option<Incident>,
    /// The deterministic random stream.
    rng: SimRng,
    /// The seed `rng` was built from, kept for [`reset`](Self::reset).
    seed: u64,
}

impl Simulation {
    /// Creates an empty simulation of a segment `road_length` metres long.
    pub fn new(road_length: f64) -> Self {
        Self::with_seed(road_length, DEFAULT_SEED)
    }

    /// Creates an empty simulation with an explicit random seed. Two
    /// simulations with the same seed, configuration sequence and call
    /// cadence produce identical trajectories.
    pub fn with_seed(road_length: f64, seed: u64) -> Self {
        let mut rng = SimRng::new(seed);
        let spawner = Spawner::new(&mut rng);
        Self {
            vehicles: VehicleSet::default(),
            order: Vec::new(),
            road: Road::new(road_length),
            next_id: 1,
            spawner,
            stats: StatsAggregator::new(),
            incident: None,
            rng,
            seed,
        }
    }

    /// Removes every vehicle and clears all accumulated state, restoring
    /// the simulation to its freshly constructed condition.
    pub fn reset(&mut self) {
        let mut rng = SimRng::new(self.seed);
        self.spawner = Spawner::new(&mut rng);
        self.rng = rng;
        self.vehicles.clear();
        self.order.clear();
        self.stats.reset();
        self.incident = None;
        self.next_id = 1;
    }

    /// The road being simulated.
    pub fn road(&self) -> &Road {
        &self.road
    }

    /// The active incident, if any.
    pub fn incident(&self) -> Option<&Incident> {
        self.incident.as_ref()
    }

    /// Returns an iterator over the vehicles for rendering, ordered by
    /// decreasing position as of the last step.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.order.iter().map(|key| &self.vehicles[*key])
    }

    /// Inserts a vehicle at an explicit position, returning its id.
    pub fn add_vehicle(&mut self, attributes: &VehicleAttributes, lane: usize, pos: f64) -> u64 {
        debug_assert!(lane < LANE_COUNT, "lane index out of range");
        debug_assert!(
            (0.0..=self.road.length()).contains(&pos),
            "position off the segment"
        );
        let id = self.next_id;
        self.next_id += 1;
        let key = self
            .vehicles
            .insert_with_key(|key| Vehicle::new(key, id, attributes, lane, pos));
        self.order.push(key);
        id
    }

    /// Advances the simulation by one tick.
    pub fn step(&mut self, config: &SimulationConfig) {
        config.validate();
        let dt = TIME_STEP * config.time_scale;

        self.sort_by_position();
        self.decide(config);
        self.integrate(dt);
        self.despawn_exited();
        self.spawn_inflow(dt, config);
        self.sample_flow(dt);
    }

    /// A snapshot of the macroscopic traffic state. The returned history
    /// is a copy; it never aliases the simulation's internal buffer.
    pub fn stats(&self) -> TrafficStats {
        let (count, avg_speed, density, flow) = self.flow_state();
        TrafficStats {
            count,
            avg_speed,
            density,
            flow,
            points: self.stats.points(),
        }
    }

    /// Injects an incident: the downstream-most vehicle in the incident
    /// window of the middle lane is pinned at standstill until the
    /// wall-clock deadline. No-op when no vehicle is eligible or an
    /// incident is already active.
    ///
    /// `now` is the host's wall clock in seconds.
    pub fn trigger_accident(&mut self, now: f64) -> bool {
        if self.incident.is_some() {
            return false;
        }
        let subject = self
            .vehicles
            .values()
            .filter(|v| Incident::eligible(v.lane(), v.pos()))
            .max_by(|a, b| a.pos().total_cmp(&b.pos()).then_with(|| b.id().cmp(&a.id())));
        let Some(subject) = subject else {
            return false;
        };
        let (key, id, lane, location) = (subject.key, subject.id(), subject.lane(), subject.pos());
        self.vehicles[key].crash();
        self.incident = Some(Incident::new(key, lane, location, now));
        info!(id, lane, location, "incident triggered");
        true
    }

    /// Releases the incident once its wall-clock deadline has passed.
    /// Safe to call every frame; does nothing while the incident is still
    /// active or when none exists.
    pub fn poll_incident(&mut self, now: f64) {
        if self.incident.is_some_and(|incident| incident.expired(now)) {
            self.clear_accident();
        }
    }

    /// Restores the crashed vehicle and clears the incident record. If the
    /// vehicle has already left the road the restoration no-ops, but the
    /// record is cleared regardless.
    pub fn clear_accident(&mut self) {
        let Some(incident) = self.incident.take() else {
            return;
        };
        if let Some(vehicle) = self.vehicles.get_mut(incident.vehicle) {
            vehicle.restore();
            info!(id = vehicle.id(), "incident cleared");
        }
    }

    /// Phase 1: orders vehicles by decreasing position, ids breaking ties.
    fn sort_by_position(&mut self) {
        let vehicles = &self.vehicles;
        self.order.sort_unstable_by(|a, b| {
            let (a, b) = (&vehicles[*a], &vehicles[*b]);
            b.pos()
                .total_cmp(&a.pos())
                .then_with(|| a.id().cmp(&b.id()))
        });
        debug_assert!(self
            .order
            .iter()
            .map(|key| vehicles[*key].pos())
            .tuple_windows()
            .all(|(a, b)| a >= b));
    }

    /// Phase 2: computes each driver's acceleration and stages MOBIL lane
    /// changes, which are committed only after every decision is made so
    /// that all drivers react to the same configuration.
    fn decide(&mut self, config: &SimulationConfig) {
        let params = IdmParams {
            max_accel: config.max_accel,
            time_gap: config.safe_time_gap,
        };
        let mut changes: Vec<(VehicleId, usize, f64)> = Vec::new();

        for idx in 0..self.order.len() {
            let key = self.order[idx];
            let (current_acc, vel, may_change) = {
                let subject = &self.vehicles[key];
                if subject.is_crashed() {
                    continue;
                }
                (
                    self.lane_acceleration(&params, subject, subject.lane()),
                    subject.vel(),
                    subject.can_change_lanes(),
                )
            };

            let mut acc = current_acc;
            if config.acceleration_noise > 0.0 && vel > NOISE_SPEED_FLOOR {
                let half = 0.5 * config.acceleration_noise;
                acc += self.rng.uniform(-half, half);
            }
            self.vehicles[key].apply_acceleration(acc);

            if may_change {
                let subject = &self.vehicles[key];
                if let Some((lane, advantage)) =
                    self.choose_lane(&params, config.politeness, subject, current_acc)
                {
                    changes.push((key, lane, advantage));
                }
            }
        }

        for (key, lane, advantage) in changes {
            let vehicle = &mut self.vehicles[key];
            let from = vehicle.lane();
            vehicle.begin_lane_change(lane);
            debug!(id = vehicle.id(), from, to = lane, advantage, "lane change");
            debug_lane_change(vehicle.id(), from, lane, advantage);
        }
    }

    /// Phase 3: integrates every vehicle. Order is irrelevant here since
    /// all accelerations are already fixed.
    fn integrate(&mut self, dt: f64) {
        for vehicle in self.vehicles.values_mut() {
            vehicle.integrate(dt);
        }
    }

    /// Phase 4a: removes vehicles that crossed the downstream boundary.
    fn despawn_exited(&mut self) {
        let road_length = self.road.length();
        let vehicles = &mut self.vehicles;
        self.order.retain(|key| {
            if vehicles[*key].pos() > road_length {
                trace!(id = vehicles[*key].id(), "vehicle left the segment");
                vehicles.remove(*key);
                false
            } else {
                true
            }
        });
    }

    /// Phase 4b: attempts an inflow spawn.
    fn spawn_inflow(&mut self, dt: f64, config: &SimulationConfig) {
        let head_room = self.lane_head_room();
        let spawned = self.spawner.step(
            dt,
            config.inflow_rate,
            config.truck_ratio,
            &head_room,
            &mut self.rng,
        );
        if let Some((lane, attributes)) = spawned {
            let id = self.add_vehicle(&attributes, lane, 0.0);
            debug!(id, lane, kind = ?attributes.kind, "vehicle entered");
            debug_spawn(id, lane);
        }
    }

    /// Phase 5: advances the fundamental-diagram sampler.
    fn sample_flow(&mut self, dt: f64) {
        let (count, _, density, flow) = self.flow_state();
        self.stats.step(dt, count, density, flow);
    }

    fn flow_state(&self) -> (usize, f64, f64, f64) {
        let count = self.vehicles.len();
        if count == 0 {
            return (0, 0.0, 0.0, 0.0);
        }
        let mean_vel = self.vehicles.values().map(|v| v.vel()).sum::<f64>() / count as f64;
        let avg_speed = 3.6 * mean_vel;
        let density = count as f64 / self.road.length_km();
        (count, avg_speed, density, density * avg_speed)
    }

    /// Distance from the entry to the rearmost vehicle in each lane;
    /// infinite for empty lanes.
    fn lane_head_room(&self) -> [f64; LANE_COUNT] {
        let mut head_room = [f64::INFINITY; LANE_COUNT];
        for vehicle in self.vehicles.values() {
            let entry = &mut head_room[vehicle.lane()];
            *entry = f64::min(*entry, vehicle.pos());
        }
        head_room
    }

    /// The nearest vehicle on `lane` strictly ahead of `pos`.
    /// Distance ties are broken by the smaller id.
    fn leader_in(&self, pos: f64, lane: usize) -> Option<&Vehicle> {
        self.vehicles
            .values()
            .filter(|v| v.lane() == lane && v.pos() > pos)
            .min_by(|a, b| a.pos().total_cmp(&b.pos()).then_with(|| a.id().cmp(&b.id())))
    }

    /// The nearest vehicle on `lane` strictly behind `pos`.
    /// Distance ties are broken by the smaller id.
    fn follower_in(&self, pos: f64, lane: usize) -> Option<&Vehicle> {
        self.vehicles
            .values()
            .filter(|v| v.lane() == lane && v.pos() < pos)
            .max_by(|a, b| a.pos().total_cmp(&b.pos()).then_with(|| b.id().cmp(&a.id())))
    }

    /// The subject's IDM acceleration if it were driving on `lane`.
    fn lane_acceleration(&self, params: &IdmParams, subject: &Vehicle, lane: usize) -> f64 {
        let leader = self
            .leader_in(subject.pos(), lane)
            .map(|leader| leader.lead_state(subject));
        idm_acceleration(params, subject.vel(), subject.desired_vel(), leader)
    }

    /// Evaluates the adjacent lanes for `subject`, lower index first, and
    /// returns the first candidate passing the MOBIL criteria together
    /// with its net advantage.
    fn choose_lane(
        &self,
        params: &IdmParams,
        politeness: f64,
        subject: &Vehicle,
        current_acc: f64,
    ) -> Option<(usize, f64)> {
        let lane = subject.lane();
        let mut candidates: SmallVec<[usize; 2]> = SmallVec::new();
        if lane > 0 {
            candidates.push(lane - 1);
        }
        if lane + 1 < LANE_COUNT {
            candidates.push(lane + 1);
        }

        let old_follower = self.follower_in(subject.pos(), lane);
        for target in candidates {
            let eval = self.evaluate_candidate(params, subject, current_acc, target, old_follower);
            if let Some(advantage) = eval.decide(politeness) {
                return Some((target, advantage));
            }
        }
        None
    }

    fn evaluate_candidate(
        &self,
        params: &IdmParams,
        subject: &Vehicle,
        current_acc: f64,
        target: usize,
        old_follower: Option<&Vehicle>,
    ) -> CandidateEvaluation {
        // Braking the move would impose on the target lane's follower.
        let new_follower_acc = self.follower_in(subject.pos(), target).map(|follower| {
            idm_acceleration(
                params,
                follower.vel(),
                follower.desired_vel(),
                Some(subject.lead_state(follower)),
            )
        });

        let candidate_acc = self.lane_acceleration(params, subject, target);

        // How the old follower's acceleration changes once the subject is
        // out of the way and it follows the subject's current leader.
        let old_follower_delta = old_follower
            .map(|follower| {
                let behind_subject = idm_acceleration(
                    params,
                    follower.vel(),
                    follower.desired_vel(),
                    Some(subject.lead_state(follower)),
                );
                let next_leader = self
                    .leader_in(subject.pos(), subject.lane())
                    .map(|leader| leader.lead_state(follower));
                let freed = idm_acceleration(
                    params,
                    follower.vel(),
                    follower.desired_vel(),
                    next_leader,
                );
                freed - behind_subject
            })
            .unwrap_or(0.0);

        CandidateEvaluation {
            current_acc,
            candidate_acc,
            new_follower_acc,
            old_follower_delta,
            toward_right: target > subject.lane(),
        }
    }
}
