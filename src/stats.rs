//! Macroscopic observables and the fundamental-diagram history.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The number of samples retained in the fundamental-diagram history.
const HISTORY_CAPACITY: usize = 200;

/// Simulated seconds between consecutive history samples.
const SAMPLE_INTERVAL: f64 = 1.0;

/// One point of the fundamental diagram.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowSample {
    /// Density k in veh/km.
    pub density: f64,
    /// Flow q in veh/h.
    pub flow: f64,
}

/// A snapshot of the macroscopic traffic state.
///
/// `points` is a copy of the fundamental-diagram history; the host may
/// hold on to it without aliasing the simulation's internal buffer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrafficStats {
    /// The number of vehicles on the road.
    pub count: usize,
    /// The arithmetic mean speed in km/h, zero when the road is empty.
    pub avg_speed: f64,
    /// Density in veh/km.
    pub density: f64,
    /// Flow by the hydrodynamic relation q = k·v, in veh/h.
    pub flow: f64,
    /// The fundamental-diagram history, oldest first.
    pub points: Vec<FlowSample>,
}

/// Appends a (density, flow) sample to the bounded history at 1 Hz of
/// simulated time, skipping intervals in which the road was empty.
pub(crate) struct StatsAggregator {
    timer: f64,
    history: VecDeque<FlowSample>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self {
            timer: 0.0,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    pub fn step(&mut self, dt: f64, count: usize, density: f64, flow: f64) {
        self.timer += dt;
        if self.timer < SAMPLE_INTERVAL {
            return;
        }
        self.timer = 0.0;
        if count == 0 {
            return;
        }
        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(FlowSample { density, flow });
        tracing::trace!(density, flow, "flow sample");
    }

    /// A copy of the history, oldest first.
    pub fn points(&self) -> Vec<FlowSample> {
        self.history.iter().copied().collect()
    }

    pub fn reset(&mut self) {
        self.timer = 0.0;
        self.history.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn samples_at_one_hertz() {
        let mut stats = StatsAggregator::new();
        let dt = 1.0 / 60.0;
        for _ in 0..59 {
            stats.step(dt, 10, 5.0, 500.0);
        }
        assert!(stats.points().is_empty());
        stats.step(dt, 10, 5.0, 500.0);
        assert_eq!(stats.points().len(), 1);
    }

    #[test]
    fn empty_intervals_are_skipped_but_still_reset_the_timer() {
        let mut stats = StatsAggregator::new();
        stats.step(1.0, 0, 0.0, 0.0);
        assert!(stats.points().is_empty());
        // A fresh interval begins; a non-empty sample lands a second later.
        stats.step(0.5, 3, 1.0, 100.0);
        assert!(stats.points().is_empty());
        stats.step(0.5, 3, 1.0, 100.0);
        assert_eq!(stats.points().len(), 1);
    }

    #[test]
    fn history_is_bounded_and_evicts_the_oldest() {
        let mut stats = StatsAggregator::new();
        for i in 0..HISTORY_CAPACITY + 50 {
            stats.step(1.0, 1, i as f64, 0.0);
        }
        let points = stats.points();
        assert_eq!(points.len(), HISTORY_CAPACITY);
        assert_eq!(points[0].density, 50.0);
        assert_eq!(points.last().unwrap().density, (HISTORY_CAPACITY + 49) as f64);
    }
}
