use std::time::Instant;

use freeway_sim::{Simulation, SimulationConfig, TIME_STEP};

fn main() {
    tracing_subscriber::fmt::init();

    let mut sim = Simulation::with_seed(5000.0, 42);
    let config = SimulationConfig::default();

    println!("Simulating...");
    let num_frames = 6000; // 100 s of simulated time per batch
    loop {
        let start = Instant::now();
        for _ in 0..num_frames {
            sim.step(&config);
        }
        let frame = start.elapsed() / num_frames;
        let stats = sim.stats();
        println!(
            "Avg. frame: {:?} --> {:.0}x real time ({} vehs, {:.0} veh/h)",
            frame,
            TIME_STEP / frame.as_secs_f64(),
            stats.count,
            stats.flow,
        );
        println!("{}", serde_json::to_string(&stats).unwrap());
    }
}
