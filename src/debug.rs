/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct holding per-frame diagnostics
 * for the simulation. It is refreshed at the end of every step and is
 * advisory only; nothing in the update reads it back.
 */

use std::time::Duration;

use crate::boid::Boid;
use crate::spatial_grid::SpatialGrid;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugInfo {
    /// Frames completed so far.
    pub steps: u64,
    pub frame_time: Duration,
    /// Mean neighbour count over flocking boids.
    pub mean_neighbors: f32,
    /// Flocking boids that found no neighbour this frame.
    pub isolated_boids: usize,
    pub occupied_cells: usize,
    /// Boids handled per parallel task; equals the population when sequential.
    pub chunk_size: usize,
}

impl DebugInfo {
    pub(crate) fn record(&mut self, grid: &SpatialGrid, frame_time: Duration, chunk_size: usize) {
        let flocking: Vec<&Boid> = grid.boids().iter().filter(|b| !b.is_leader()).collect();
        let total: usize = flocking.iter().map(|b| b.neighbors).sum();

        self.steps += 1;
        self.frame_time = frame_time;
        self.mean_neighbors = if flocking.is_empty() {
            0.0
        } else {
            total as f32 / flocking.len() as f32
        };
        self.isolated_boids = flocking.iter().filter(|b| b.neighbors == 0).count();
        self.occupied_cells = grid.occupied_cells();
        self.chunk_size = chunk_size;
    }
}
