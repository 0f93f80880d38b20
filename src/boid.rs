/*
 * Boid Module
 *
 * This module defines the Boid struct and its behavior.
 * Each flocking boid follows three main rules:
 * 1. Separation: Avoid crowding neighbors
 * 2. Alignment: Steer towards the average heading of neighbors
 * 3. Cohesion: Steer towards the average position of neighbors
 *
 * Leaders are a second kind of boid: they keep the velocity they were built
 * with, ignore every force, and are still visible to ordinary boids.
 */

use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

use crate::params::BoidParams;

/// The closed set of agent kinds sharing the kinematic interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoidKind {
    Flocking,
    Leader,
}

#[derive(Debug, Clone)]
pub struct Boid {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Neighbours found inside the influence range on the last `interact`.
    pub neighbors: usize,
    kind: BoidKind,
    params: BoidParams,
}

impl Boid {
    /// A flocking boid at (x, y) with a random heading and a speed no greater than `max_speed`.
    pub fn new<R: Rng + ?Sized>(x: f32, y: f32, params: BoidParams, rng: &mut R) -> Self {
        let heading = rng.gen_range(0.0..TAU);
        let speed = rng.gen_range(0.0..=params.max_speed);
        Self::with_velocity(x, y, Vec2::from_angle(heading) * speed, params)
    }

    pub fn with_velocity(x: f32, y: f32, velocity: Vec2, params: BoidParams) -> Self {
        Self {
            position: Vec2::new(x, y),
            velocity,
            acceleration: Vec2::ZERO,
            neighbors: 0,
            kind: BoidKind::Flocking,
            params,
        }
    }

    /// A leader moving with a fixed velocity for its whole life.
    pub fn leader(x: f32, y: f32, velocity: Vec2, params: BoidParams) -> Self {
        Self {
            kind: BoidKind::Leader,
            ..Self::with_velocity(x, y, velocity, params)
        }
    }

    #[inline]
    pub fn kind(&self) -> BoidKind {
        self.kind
    }

    #[inline]
    pub fn params(&self) -> &BoidParams {
        &self.params
    }

    #[inline]
    pub fn is_leader(&self) -> bool {
        self.kind == BoidKind::Leader
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Rescale velocity to `speed`, keeping the heading. A stationary boid is
    /// first pointed along +x. Leaders ignore this.
    pub fn set_speed(&mut self, speed: f32) {
        if self.is_leader() {
            return;
        }
        if self.velocity.length() == 0.0 {
            self.velocity = Vec2::X;
        }
        self.velocity = self.velocity.normalize() * speed;
    }

    /// Heading angle in radians, as used for drawing.
    pub fn rotation(&self) -> f32 {
        self.velocity.y.atan2(self.velocity.x)
    }

    pub fn set_rotation(&mut self, angle: f32) {
        let speed = self.speed();
        self.velocity = Vec2::from_angle(angle);
        self.set_speed(speed);
    }

    /// Wrap the boid to the opposite bound when it leaves the field.
    pub fn borders(&mut self, top: f32, bottom: f32, left: f32, right: f32) {
        if self.position.x < left {
            self.position.x = right;
        }
        if self.position.x > right {
            self.position.x = left;
        }
        if self.position.y < top {
            self.position.y = bottom;
        }
        if self.position.y > bottom {
            self.position.y = top;
        }
    }

    // Integrate motion over `dt` seconds; acceleration is kept for the next frame
    pub fn update(&mut self, dt: f32) {
        match self.kind {
            BoidKind::Flocking => {
                self.velocity += self.acceleration * dt;
                self.velocity = self.velocity.clamp_length_max(self.params.max_speed);
                self.position += self.velocity * dt;
            }
            BoidKind::Leader => {
                self.position += self.velocity * dt;
            }
        }
    }

    /// Combine separation, alignment and cohesion from `others` in a single pass.
    ///
    /// Candidates at distance zero (including the boid itself) or outside the
    /// influence range are ignored. When no candidate qualifies, acceleration
    /// is left as it was. Returns the number of qualifying neighbours.
    pub fn interact<'a, I>(&mut self, others: I) -> usize
    where
        I: IntoIterator<Item = &'a Boid>,
    {
        if self.is_leader() {
            return 0;
        }

        let p = &self.params;
        let mut separation = Vec2::ZERO;
        let mut alignment = Vec2::ZERO;
        let mut cohesion_sum = Vec2::ZERO;
        let mut count = 0usize;

        for other in others {
            // Vector pointing from the neighbour to self
            let diff = self.position - other.position;
            let d = diff.length();

            if d > 0.0 && d < p.influence_range {
                count += 1;

                let mut push = diff / d;
                if d < p.min_separation {
                    push /= d;
                }
                separation += push;
                cohesion_sum += other.position;
                alignment += other.velocity;
            }
        }

        self.neighbors = count;
        if count == 0 {
            return 0;
        }

        let separation = (separation.normalize_or_zero() * p.max_speed - self.velocity)
            .clamp_length_max(p.max_force);
        let alignment = (alignment.normalize_or_zero() * p.max_speed - self.velocity)
            .clamp_length_max(p.max_force);
        let cohesion = self.steer(cohesion_sum / count as f32, true);

        self.acceleration = separation * p.separation_strength
            + alignment * p.align_strength
            + cohesion * p.cohesion_strength;
        count
    }

    /// Steering force towards `target`: desired velocity minus current velocity,
    /// clamped to `max_force`. With `slowdown` the desired speed ramps down
    /// linearly inside `min_separation`. Zero when already at the target.
    pub fn steer(&self, target: Vec2, slowdown: bool) -> Vec2 {
        let p = &self.params;
        let offset = target - self.position;
        let d = offset.length();
        if d <= 0.0 {
            return Vec2::ZERO;
        }

        let desired_speed = if slowdown && d < p.min_separation {
            p.max_speed * d / p.min_separation
        } else {
            p.max_speed
        };
        let desired = offset / d * desired_speed;
        (desired - self.velocity).clamp_length_max(p.max_force)
    }
}
