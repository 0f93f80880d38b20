/*
 * Boid Flocking Simulation - Module Definitions
 *
 * This file defines the module structure for the headless flocking core:
 * the boid kinematics and interaction rules, the uniform spatial grid that
 * bounds neighbour search, and the simulation loop that ties them together.
 */

// Re-export key components for easier access
pub use boid::{Boid, BoidKind};
pub use debug::DebugInfo;
pub use error::SimError;
pub use params::{BoidParams, IsolationPolicy, SimulationParams};
pub use simulation::Simulation;
pub use spatial_grid::{CellCoord, SpatialGrid};

pub use glam::Vec2;

// Define modules
pub mod boid;
pub mod debug;
pub mod error;
pub mod params;
pub mod simulation;
pub mod spatial_grid;
