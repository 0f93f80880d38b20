/*
 * Simulation Module
 *
 * Ties the SpatialGrid to the boids. The grid only holds membership, the
 * boids know how to interact with each other; this module drives the
 * per-frame pipeline between them:
 *
 *   find_near -> interact -> update -> borders   (every boid)
 *   rebuild                                      (once, after all boids)
 *
 * Every boid in a frame reads the positions and velocities settled at the end
 * of the previous frame, so the result does not depend on iteration order and
 * the per-boid phase can run in parallel.
 */

use std::time::Instant;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::boid::Boid;
use crate::debug::DebugInfo;
use crate::error::SimError;
use crate::params::{IsolationPolicy, SimulationParams};
use crate::spatial_grid::SpatialGrid;

#[derive(Debug, Clone)]
pub struct Simulation {
    params: SimulationParams,
    grid: SpatialGrid,
    seed: Option<u64>,
    debug_info: DebugInfo,
}

impl Simulation {
    /// Build a world populated with `num_boids` flocking boids and
    /// `num_leaders` leaders at random positions in the spawn square.
    pub fn new(params: SimulationParams) -> Result<Self, SimError> {
        params.validate()?;

        let seed = params.rng_seed.unwrap_or_else(rand::random::<u64>);
        let mut rng = StdRng::seed_from_u64(seed);
        let spawn = params.spawn_min..params.spawn_max;

        let mut boids = Vec::with_capacity(params.num_boids + params.num_leaders);
        for _ in 0..params.num_boids {
            let x = rng.gen_range(spawn.clone());
            let y = rng.gen_range(spawn.clone());
            boids.push(Boid::new(x, y, params.flocking, &mut rng));
        }
        let leader_velocity = Vec2::from(params.leader_velocity);
        for _ in 0..params.num_leaders {
            let x = rng.gen_range(spawn.clone());
            let y = rng.gen_range(spawn.clone());
            boids.push(Boid::leader(x, y, leader_velocity, params.leader));
        }

        let mut sim = Self::assemble(params, boids)?;
        sim.seed = Some(seed);
        info!(
            seed,
            boids = sim.params.num_boids,
            leaders = sim.params.num_leaders,
            divisions = sim.grid.divisions(),
            cell_width = sim.grid.cell_width(),
            "simulation created"
        );
        Ok(sim)
    }

    /// Default world of side `world_size` holding `num_boids` flocking boids.
    pub fn with_population(num_boids: usize, world_size: f32) -> Result<Self, SimError> {
        Self::new(SimulationParams {
            num_boids,
            world_size,
            ..SimulationParams::default()
        })
    }

    /// Build a world from explicit boids; the population fields of `params` are ignored.
    pub fn from_boids(params: SimulationParams, boids: Vec<Boid>) -> Result<Self, SimError> {
        params.validate()?;
        let sim = Self::assemble(params, boids)?;
        info!(
            boids = sim.grid.len(),
            divisions = sim.grid.divisions(),
            "simulation created from explicit boids"
        );
        Ok(sim)
    }

    fn assemble(params: SimulationParams, boids: Vec<Boid>) -> Result<Self, SimError> {
        let mut grid = SpatialGrid::new(params.grid_extent(), params.cell_width())?;
        for boid in boids {
            grid.add(boid);
        }
        grid.rebuild();

        Ok(Self {
            params,
            grid,
            seed: None,
            debug_info: DebugInfo::default(),
        })
    }

    /// Advance every boid by `dt` seconds, then rebuild the grid once.
    pub fn step(&mut self, dt: f32) {
        let started = Instant::now();
        let (top, bottom, left, right) = self.params.borders();
        let policy = self.params.isolation_policy;

        // Snapshot of the previous frame; neighbour indices point into it
        let frozen: Vec<Boid> = self.grid.boids().to_vec();
        let neighbor_data: Vec<Vec<usize>> = frozen
            .iter()
            .map(|boid| {
                if boid.is_leader() {
                    return Vec::new();
                }
                self.grid.find_near(
                    boid.position.x,
                    boid.position.y,
                    boid.params().influence_range,
                )
            })
            .collect();

        let advance = |boid: &mut Boid, candidates: &[usize]| {
            let count = boid.interact(candidates.iter().map(|&i| &frozen[i]));
            if count == 0 && policy == IsolationPolicy::ResetToZero {
                boid.acceleration = Vec2::ZERO;
            }
            boid.update(dt);
            boid.borders(top, bottom, left, right);
        };

        let chunk_size = if self.params.enable_parallel {
            let chunk_size = std::cmp::max(frozen.len() / rayon::current_num_threads(), 1);
            self.grid
                .boids_mut()
                .par_chunks_mut(chunk_size)
                .zip(neighbor_data.par_chunks(chunk_size))
                .for_each(|(boids, candidates)| {
                    for (boid, near) in boids.iter_mut().zip(candidates) {
                        advance(boid, near);
                    }
                });
            chunk_size
        } else {
            for (boid, near) in self.grid.boids_mut().iter_mut().zip(&neighbor_data) {
                advance(boid, near);
            }
            frozen.len()
        };

        // Only after every boid has read the old grid
        self.grid.rebuild();

        self.debug_info.record(&self.grid, started.elapsed(), chunk_size);
        debug!(
            step = self.debug_info.steps,
            mean_neighbors = self.debug_info.mean_neighbors,
            isolated = self.debug_info.isolated_boids,
            occupied_cells = self.debug_info.occupied_cells,
            elapsed_us = self.debug_info.frame_time.as_micros() as u64,
            "frame advanced"
        );
    }

    pub fn boids(&self) -> &[Boid] {
        self.grid.boids()
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Seed used for initial placement, if this world was randomly populated.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn debug_info(&self) -> &DebugInfo {
        &self.debug_info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::BoidParams;

    fn seeded(num_boids: usize, seed: u64) -> SimulationParams {
        SimulationParams {
            num_boids,
            rng_seed: Some(seed),
            ..SimulationParams::default()
        }
    }

    #[test]
    fn grid_is_sized_from_world_and_influence() {
        let sim = Simulation::new(seeded(10, 1)).unwrap();
        // (800 + 2 * 40) / (90 + 5)
        assert_eq!(sim.grid().divisions(), 9);
        assert_eq!(sim.grid().cell_width(), 95.0);
        assert_eq!(sim.seed(), Some(1));
    }

    #[test]
    fn spawns_inside_the_spawn_square() {
        let sim = Simulation::new(seeded(200, 9)).unwrap();
        assert_eq!(sim.boids().len(), 200);
        for boid in sim.boids() {
            assert!((100.0..400.0).contains(&boid.position.x));
            assert!((100.0..400.0).contains(&boid.position.y));
            assert!(boid.speed() <= boid.params().max_speed + 1e-3);
        }
    }

    #[test]
    fn leaders_are_appended_with_fixed_velocity() {
        let params = SimulationParams {
            num_leaders: 2,
            ..seeded(5, 4)
        };
        let sim = Simulation::new(params).unwrap();
        let leaders: Vec<&Boid> = sim.boids().iter().filter(|b| b.is_leader()).collect();
        assert_eq!(leaders.len(), 2);
        assert!(sim.boids()[5..].iter().all(|b| b.is_leader()));
        assert!(leaders.iter().all(|b| b.velocity == Vec2::new(60.0, 60.0)));
    }

    #[test]
    fn invalid_geometry_fails_fast() {
        let mut params = seeded(3, 1);
        params.cell_margin = -200.0;
        assert!(matches!(
            Simulation::new(params),
            Err(SimError::InvalidConfig(_))
        ));
        assert!(Simulation::with_population(3, -1.0).is_err());
    }

    #[test]
    fn step_reads_the_previous_frame() {
        let params = SimulationParams::default();
        let bp = BoidParams::default();
        let boids = vec![
            Boid::with_velocity(300.0, 300.0, Vec2::new(50.0, 0.0), bp),
            Boid::with_velocity(320.0, 300.0, Vec2::new(0.0, 40.0), bp),
            Boid::with_velocity(310.0, 330.0, Vec2::new(-20.0, 10.0), bp),
        ];

        // Every boid interacts against the untouched starting states
        let dt = 0.1;
        let (top, bottom, left, right) = params.borders();
        let mut expected = boids.clone();
        for boid in &mut expected {
            boid.interact(&boids);
            boid.update(dt);
            boid.borders(top, bottom, left, right);
        }

        let mut sim = Simulation::from_boids(params, boids).unwrap();
        sim.step(dt);
        for (got, want) in sim.boids().iter().zip(&expected) {
            assert_eq!(got.position, want.position);
            assert_eq!(got.velocity, want.velocity);
            assert_eq!(got.acceleration, want.acceleration);
            assert_eq!(got.neighbors, 2);
        }
    }

    #[test]
    fn leaders_with_huge_influence_range_step() {
        let mut params = SimulationParams {
            num_leaders: 2,
            ..seeded(20, 6)
        };
        params.leader.influence_range = 1.0e30;
        let mut sim = Simulation::new(params).unwrap();
        sim.step(0.1);
        assert_eq!(sim.debug_info().steps, 1);
        assert!(sim.boids()[20..].iter().all(|b| b.velocity == Vec2::new(60.0, 60.0)));
    }

    #[test]
    fn reset_policy_zeroes_isolated_boids() {
        let bp = BoidParams::default();
        let mut lonely = Boid::with_velocity(200.0, 200.0, Vec2::new(10.0, 0.0), bp);
        lonely.acceleration = Vec2::new(5.0, 5.0);

        let mut retain =
            Simulation::from_boids(SimulationParams::default(), vec![lonely.clone()]).unwrap();
        retain.step(0.1);
        assert_eq!(retain.boids()[0].acceleration, Vec2::new(5.0, 5.0));

        let params = SimulationParams {
            isolation_policy: IsolationPolicy::ResetToZero,
            ..SimulationParams::default()
        };
        let mut reset = Simulation::from_boids(params, vec![lonely]).unwrap();
        reset.step(0.1);
        assert_eq!(reset.boids()[0].acceleration, Vec2::ZERO);
        assert_eq!(reset.boids()[0].velocity, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn debug_info_tracks_frames() {
        let mut sim = Simulation::new(seeded(50, 2)).unwrap();
        sim.step(0.05);
        sim.step(0.05);
        let info = sim.debug_info();
        assert_eq!(info.steps, 2);
        assert_eq!(info.chunk_size, 50);
        assert!(info.occupied_cells >= 1);
        assert!(info.isolated_boids <= 50);
    }
}
