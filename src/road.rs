//! Geometry of the simulated road segment.

use cgmath::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;

/// The number of lanes on the segment.
pub const LANE_COUNT: usize = 3;

/// The width of a single lane in m.
pub const LANE_WIDTH: f64 = 3.5;

/// A straight, unidirectional road segment.
///
/// Longitudinal positions run from `0` at the entry to `length` at the exit.
/// Lateral positions are continuous lane coordinates; lane `0` is the
/// leftmost lane and increasing indices are further to the right.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Road {
    length: f64,
}

impl Road {
    pub(crate) fn new(length: f64) -> Self {
        debug_assert!(length > 0.0, "non-positive road length");
        Self { length }
    }

    /// The length of the segment in m.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The length of the segment in km.
    pub fn length_km(&self) -> f64 {
        self.length / 1000.0
    }

    /// The world-space position of a point `pos` metres along the segment
    /// at the continuous lane coordinate `lat`.
    pub fn world_pos(&self, pos: f64, lat: f64) -> Point2d {
        Point2d::new(pos, (lat + 0.5) * LANE_WIDTH)
    }

    /// The direction of travel, constant for a straight segment.
    pub fn direction(&self) -> Vector2d {
        Vector2d::new(1.0, 0.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn world_positions_are_lane_centred() {
        let road = Road::new(1000.0);
        let p = road.world_pos(250.0, 0.0);
        assert_approx_eq!(p.x, 250.0);
        assert_approx_eq!(p.y, 0.5 * LANE_WIDTH);
        let p = road.world_pos(250.0, 2.0);
        assert_approx_eq!(p.y, 2.5 * LANE_WIDTH);
    }
}
