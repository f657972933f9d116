use slotmap::{new_key_type, SlotMap};

mod config;
mod debug;
mod incident;
mod rng;
mod road;
mod simulation;
mod spawner;
mod stats;
mod vehicle;

pub use config::SimulationConfig;
#[cfg(feature = "debug")]
pub use debug::take_debug_frame;
pub use incident::Incident;
pub use road::{Point2d, Road, Vector2d, LANE_COUNT, LANE_WIDTH};
pub use simulation::{Simulation, TIME_STEP};
pub use stats::{FlowSample, TrafficStats};
pub use vehicle::{Vehicle, VehicleAttributes, VehicleKind};

new_key_type! {
    pub struct VehicleId;
}

type VehicleSet = SlotMap<VehicleId, Vehicle>;
