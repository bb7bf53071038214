//! Particle collection and per-tick physics.
//!
//! One tick moves every particle through the same fixed pipeline:
//! integrate → wrap → pointer attraction → damping → lifecycle →
//! oscillation → trail capture. Delta time is measured in frame units
//! (16ms) and clamped to [0, 2] so a stalled host cannot fling particles
//! across the surface.

use rand::Rng;

use crate::constants::{
    DAMPING_XY, DAMPING_Z, DEPTH_LIMIT, MAX_DELTA, MAX_ENERGY, POINTER_ENERGY_GAIN, POINTER_GAIN,
    POINTER_RADIUS, PULSE_RATE, TRAIL_ALPHA_SCALE, TRAIL_LENGTH, WRAP_MARGIN,
};
use crate::particle::{Particle, TrailPool, random_energy, random_hue, trail_pool};
use crate::quality::QualityConfig;
use crate::vector::{Point, Vec3};

/// Drawing-surface extent in surface units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Inputs shared by every particle during one tick.
#[derive(Clone, Copy, Debug)]
pub struct StepContext<'a> {
    pub delta: f64,
    pub bounds: Bounds,
    pub pointer: Option<Point>,
    pub quality: &'a QualityConfig,
}

/// Clamp a raw frame delta into the [0, MAX_DELTA] frame-unit range.
pub fn clamp_delta(delta: f64) -> f64 {
    if delta.is_finite() {
        delta.clamp(0.0, MAX_DELTA)
    } else {
        0.0
    }
}

/// Owns the particles and the trail-point pool that feeds their trails.
#[derive(Debug)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    trail_pool: TrailPool,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            trail_pool: trail_pool(),
        }
    }

    /// Replace the population with `count` freshly spawned particles spread
    /// over `bounds` and the depth range [-500, 500).
    pub fn populate(&mut self, count: usize, bounds: Bounds, rng: &mut impl Rng) {
        self.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            let position = Vec3::new(
                rng.random::<f64>() * bounds.width,
                rng.random::<f64>() * bounds.height,
                rng.random::<f64>() * 1000.0 - 500.0,
            );
            self.particles.push(Particle::spawn(position, rng));
        }
    }

    /// Drop every particle, returning their trail points to the pool.
    pub fn clear(&mut self) {
        for p in &mut self.particles {
            p.release_trail(&mut self.trail_pool);
        }
        self.particles.clear();
    }

    /// Add an externally built particle.
    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn trail_pool(&self) -> &TrailPool {
        &self.trail_pool
    }

    /// Advance every particle by one tick.
    pub fn tick(
        &mut self,
        delta: f64,
        bounds: Bounds,
        pointer: Option<Point>,
        quality: &QualityConfig,
        rng: &mut impl Rng,
    ) {
        let ctx = StepContext {
            delta: clamp_delta(delta),
            bounds,
            pointer,
            quality,
        };
        for particle in &mut self.particles {
            step_particle(particle, &ctx, &mut self.trail_pool, rng);
        }
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Advance one particle by one tick.
pub fn step_particle(
    p: &mut Particle,
    ctx: &StepContext<'_>,
    pool: &mut TrailPool,
    rng: &mut impl Rng,
) {
    let dt = ctx.delta;
    let speed = ctx.quality.animation_speed;
    let previous = p.position;

    p.position.x += p.velocity.x * dt * speed;
    p.position.y += p.velocity.y * dt * speed;
    p.position.z += p.velocity.z * dt * speed;

    wrap_position(&mut p.position, ctx.bounds);

    if let Some(pointer) = ctx.pointer {
        let distance = p.position.distance_2d(Vec3::new(pointer.x, pointer.y, 0.0));
        if distance < POINTER_RADIUS {
            let attraction = POINTER_GAIN * (POINTER_RADIUS - distance) * dt * speed;
            p.velocity.x += (pointer.x - p.position.x) * attraction;
            p.velocity.y += (pointer.y - p.position.y) * attraction;
            p.energy = (p.energy + POINTER_ENERGY_GAIN).min(MAX_ENERGY);
        }
    }

    p.velocity.x *= DAMPING_XY;
    p.velocity.y *= DAMPING_XY;
    p.velocity.z *= DAMPING_Z;

    p.life += dt;
    if p.life > p.max_life {
        p.life = 0.0;
        p.energy = random_energy(rng);
        p.hue = random_hue(rng);
        p.release_trail(pool);
    }

    p.pulse += PULSE_RATE * dt * speed;
    p.rotation += p.rotation_speed * dt * speed;
    p.size = p.base_size * (1.0 + p.pulse.sin() * 0.4);
    p.alpha = 0.4 + (p.pulse * 0.7).sin() * 0.3;

    if !ctx.quality.enable_trails {
        if !p.trail().is_empty() {
            p.release_trail(pool);
        }
        return;
    }

    // Trails fill to capacity, then hold until the particle recycles.
    if p.trail().len() < TRAIL_LENGTH {
        let mut point = pool.acquire();
        point.x = previous.x;
        point.y = previous.y;
        point.alpha = p.alpha * TRAIL_ALPHA_SCALE;
        p.push_trail(point, pool);
    }
}

/// Screen axes wrap past a 100-unit margin; depth cycles at ±600.
fn wrap_position(position: &mut Vec3, bounds: Bounds) {
    if position.x < -WRAP_MARGIN {
        position.x = bounds.width + WRAP_MARGIN;
    } else if position.x > bounds.width + WRAP_MARGIN {
        position.x = -WRAP_MARGIN;
    }

    if position.y < -WRAP_MARGIN {
        position.y = bounds.height + WRAP_MARGIN;
    } else if position.y > bounds.height + WRAP_MARGIN {
        position.y = -WRAP_MARGIN;
    }

    if position.z < -DEPTH_LIMIT {
        position.z = DEPTH_LIMIT;
    } else if position.z > DEPTH_LIMIT {
        position.z = -DEPTH_LIMIT;
    }
}
