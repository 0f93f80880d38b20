/*
 * Boid Flocking Simulation
 *
 * Headless driver: builds a default world, advances it at a fixed frame
 * rate and logs a summary once per simulated second. Log verbosity comes
 * from RUST_LOG (default "info"; "debug" prints every frame).
 */

use boid_swarm::{SimError, Simulation, SimulationParams};
use tracing::info;
use tracing_subscriber::EnvFilter;

const FRAMES: u64 = 600;
const FRAME_DT: f32 = 1.0 / 60.0;

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let params = SimulationParams {
        num_boids: 300,
        num_leaders: 2,
        ..SimulationParams::default()
    };
    let mut sim = Simulation::new(params)?;

    for frame in 1..=FRAMES {
        sim.step(FRAME_DT);
        if frame % 60 == 0 {
            let stats = sim.debug_info();
            info!(
                frame,
                mean_neighbors = stats.mean_neighbors,
                isolated = stats.isolated_boids,
                occupied_cells = stats.occupied_cells,
                frame_us = stats.frame_time.as_micros() as u64,
                "flock summary"
            );
        }
    }
    Ok(())
}
