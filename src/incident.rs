//! Stop-and-release incident injection.
//!
//! An incident pins one vehicle at standstill for a fixed wall-clock
//! duration, deliberately independent of the simulation's time scale.
//! The host supplies its clock as a plain `now` argument to
//! [`Simulation::trigger_accident`](crate::Simulation::trigger_accident)
//! and [`Simulation::poll_incident`](crate::Simulation::poll_incident),
//! so tests can advance time synthetically.

use crate::VehicleId;

/// Wall-clock seconds a crashed vehicle stays pinned.
const DURATION: f64 = 8.0;

/// The lane on which incidents are staged.
const INCIDENT_LANE: usize = 1;

/// The longitudinal window eligible for incident injection, in m.
const LOCATION_RANGE: (f64, f64) = (1000.0, 4000.0);

/// An active incident. At most one exists at a time.
#[derive(Clone, Copy, Debug)]
pub struct Incident {
    pub(crate) vehicle: VehicleId,
    lane: usize,
    location: f64,
    expires_at: f64,
}

impl Incident {
    pub(crate) fn new(vehicle: VehicleId, lane: usize, location: f64, now: f64) -> Self {
        Self {
            vehicle,
            lane,
            location,
            expires_at: now + DURATION,
        }
    }

    /// Whether a vehicle at `pos` on `lane` may be the subject of an
    /// incident.
    pub(crate) fn eligible(lane: usize, pos: f64) -> bool {
        lane == INCIDENT_LANE && pos > LOCATION_RANGE.0 && pos < LOCATION_RANGE.1
    }

    /// The lane blocked by the incident.
    pub fn lane(&self) -> usize {
        self.lane
    }

    /// The longitudinal position of the blockage in m.
    pub fn location(&self) -> f64 {
        self.location
    }

    /// Whether the incident should be released at wall-clock `now`.
    pub fn expired(&self, now: f64) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use slotmap::KeyData;

    #[test]
    fn eligibility_window() {
        assert!(Incident::eligible(1, 2500.0));
        assert!(!Incident::eligible(0, 2500.0));
        assert!(!Incident::eligible(2, 2500.0));
        assert!(!Incident::eligible(1, 1000.0));
        assert!(!Incident::eligible(1, 4000.0));
    }

    #[test]
    fn expires_after_the_blockage_window() {
        let key = VehicleId::from(KeyData::from_ffi(1));
        let incident = Incident::new(key, 1, 1500.0, 100.0);
        assert!(!incident.expired(100.0));
        assert!(!incident.expired(107.9));
        assert!(incident.expired(108.0));
    }
}
