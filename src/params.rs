/*
 * Simulation Parameters Module
 *
 * This module defines the parameter sets for the simulation: the per-kind
 * behavioural constants shared by every boid of a kind, and the world-level
 * settings used to build a Simulation. Both are serde-friendly so a driver
 * can load them from any format it likes; missing fields take the defaults.
 */

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Behavioural constants for one kind of boid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoidParams {
    /// Radius within which another boid counts as a neighbour.
    pub influence_range: f32,
    /// Distance below which separation is weighted by 1/d and arrival slows down.
    pub min_separation: f32,
    pub max_force: f32,
    pub max_speed: f32,
    /// Declared but not used by the integrator.
    pub drag: f32,
    pub cohesion_strength: f32,
    pub align_strength: f32,
    pub separation_strength: f32,
}

impl Default for BoidParams {
    fn default() -> Self {
        Self {
            influence_range: 90.0,
            min_separation: 25.0,
            max_force: 20.0,
            max_speed: 180.0,
            drag: 0.9,
            cohesion_strength: 1.5,
            align_strength: 1.4,
            separation_strength: 1.0,
        }
    }
}

impl BoidParams {
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.influence_range.is_finite() && self.influence_range > 0.0) {
            return Err(SimError::InvalidConfig("influence_range must be positive"));
        }
        if !(self.min_separation.is_finite() && self.min_separation > 0.0) {
            return Err(SimError::InvalidConfig("min_separation must be positive"));
        }
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(SimError::InvalidConfig("max_speed must be positive"));
        }
        if !(self.max_force.is_finite() && self.max_force >= 0.0) {
            return Err(SimError::InvalidConfig("max_force must be non-negative"));
        }
        Ok(())
    }
}

/// What an agent does with its acceleration on a frame where it has no neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationPolicy {
    /// Keep the acceleration computed on the last frame that had neighbours.
    #[default]
    RetainLast,
    /// Drop the acceleration to zero so isolated boids coast.
    ResetToZero,
}

/// World-level settings for a Simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub num_boids: usize,
    pub num_leaders: usize,
    /// Side length of the square field.
    pub world_size: f32,
    /// Margin inside the field edge at which boids wrap around.
    pub padding: f32,
    /// Added to the flocking influence range to get the grid cell width.
    pub cell_margin: f32,
    /// Boids spawn uniformly in `[spawn_min, spawn_max]` on both axes.
    pub spawn_min: f32,
    pub spawn_max: f32,
    /// Seed for initial placement; `None` draws one from entropy.
    pub rng_seed: Option<u64>,
    pub isolation_policy: IsolationPolicy,
    pub enable_parallel: bool,
    pub flocking: BoidParams,
    pub leader: BoidParams,
    pub leader_velocity: [f32; 2],
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            num_boids: 100,
            num_leaders: 0,
            world_size: 800.0,
            padding: 40.0,
            cell_margin: 5.0,
            spawn_min: 100.0,
            spawn_max: 400.0,
            rng_seed: None,
            isolation_policy: IsolationPolicy::RetainLast,
            enable_parallel: false,
            flocking: BoidParams::default(),
            leader: BoidParams::default(),
            leader_velocity: [60.0, 60.0],
        }
    }
}

impl SimulationParams {
    /// Side length of the square covered by the spatial grid.
    pub fn grid_extent(&self) -> f32 {
        self.world_size + 2.0 * self.padding
    }

    pub fn cell_width(&self) -> f32 {
        self.flocking.influence_range + self.cell_margin
    }

    /// Wrap bounds as `(top, bottom, left, right)`.
    pub fn borders(&self) -> (f32, f32, f32, f32) {
        let near = self.padding;
        let far = self.world_size - self.padding;
        (near, far, near, far)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.world_size.is_finite() && self.world_size > 0.0) {
            return Err(SimError::InvalidConfig("world_size must be positive"));
        }
        if !(self.padding.is_finite() && self.padding >= 0.0) {
            return Err(SimError::InvalidConfig("padding must be non-negative"));
        }
        if self.world_size <= 2.0 * self.padding {
            return Err(SimError::InvalidConfig("padding must leave a non-empty field"));
        }
        if !(self.spawn_min.is_finite()
            && self.spawn_max.is_finite()
            && self.spawn_min < self.spawn_max)
        {
            return Err(SimError::InvalidConfig("spawn_min must be below spawn_max"));
        }
        if !self.leader_velocity.iter().all(|v| v.is_finite()) {
            return Err(SimError::InvalidConfig("leader_velocity must be finite"));
        }
        self.flocking.validate()?;
        self.leader.validate()?;
        // Grid geometry (cell width and divisions) is checked by SpatialGrid::new.
        Ok(())
    }
}
