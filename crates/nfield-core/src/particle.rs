use std::collections::VecDeque;
use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{TRAIL_LENGTH, TRAIL_POOL_SEED, TRAIL_POOL_SOFT_CAP};
use crate::pool::ObjectPool;
use crate::vector::Vec3;

/// Render style of a particle body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleVariant {
    /// Glowing node with a solid core.
    Neural,
    /// Ring of rotating bars with flickering brightness.
    Quantum,
    /// Ten-point star.
    Star,
}

impl ParticleVariant {
    pub const ALL: [ParticleVariant; 3] = [Self::Neural, Self::Quantum, Self::Star];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// A captured past position of a particle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrailPoint {
    pub x: f64,
    pub y: f64,
    pub alpha: f64,
}

impl TrailPoint {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

pub type TrailPool = ObjectPool<TrailPoint>;

/// Pool of trail points, seeded for a typical scene.
pub fn trail_pool() -> TrailPool {
    ObjectPool::new(
        TrailPoint::default,
        TrailPoint::reset,
        TRAIL_POOL_SEED,
        TRAIL_POOL_SOFT_CAP,
    )
}

/// Draw a fresh hue from the cyan-to-violet band.
pub fn random_hue(rng: &mut impl Rng) -> f64 {
    180.0 + rng.random::<f64>() * 80.0
}

/// Draw a fresh energy level in [0, 100).
pub fn random_energy(rng: &mut impl Rng) -> f64 {
    rng.random::<f64>() * 100.0
}

/// A simulated point in the field.
///
/// Particles are never destroyed during a scene. When `life` passes
/// `max_life` the particle is recycled in place.
#[derive(Clone, Debug)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub size: f64,
    pub base_size: f64,
    pub alpha: f64,
    pub hue: f64,
    pub life: f64,
    pub max_life: f64,
    pub rotation: f64,
    pub rotation_speed: f64,
    pub pulse: f64,
    pub energy: f64,
    pub magnetic_field: f64,
    pub variant: ParticleVariant,
    trail: VecDeque<TrailPoint>,
}

impl Particle {
    /// Spawn a particle at `position` with randomized motion and lifetime.
    pub fn spawn(position: Vec3, rng: &mut impl Rng) -> Self {
        let base_size = rng.random::<f64>() * 4.0 + 2.0;
        Self {
            position,
            velocity: Vec3::new(
                (rng.random::<f64>() - 0.5) * 0.8,
                (rng.random::<f64>() - 0.5) * 0.8,
                (rng.random::<f64>() - 0.5) * 0.4,
            ),
            size: base_size,
            base_size,
            alpha: rng.random::<f64>() * 0.7 + 0.3,
            hue: random_hue(rng),
            life: rng.random::<f64>() * 1000.0,
            max_life: 1500.0 + rng.random::<f64>() * 2500.0,
            rotation: rng.random::<f64>() * TAU,
            rotation_speed: (rng.random::<f64>() - 0.5) * 0.03,
            pulse: rng.random::<f64>() * TAU,
            energy: random_energy(rng),
            magnetic_field: rng.random::<f64>() * 0.15,
            variant: ParticleVariant::random(rng),
            trail: VecDeque::with_capacity(TRAIL_LENGTH + 1),
        }
    }

    /// Trail points, newest first.
    pub fn trail(&self) -> &VecDeque<TrailPoint> {
        &self.trail
    }

    /// Insert `point` as the newest trail entry, evicting the oldest into
    /// `pool` if the buffer overflows.
    pub fn push_trail(&mut self, point: TrailPoint, pool: &mut TrailPool) {
        self.trail.push_front(point);
        if self.trail.len() > TRAIL_LENGTH
            && let Some(oldest) = self.trail.pop_back()
        {
            pool.release(oldest);
        }
    }

    /// Return every trail point to `pool`.
    pub fn release_trail(&mut self, pool: &mut TrailPool) {
        for point in self.trail.drain(..) {
            pool.release(point);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn test_spawn_ranges() {
        let mut rng = rng();
        for _ in 0..500 {
            let p = Particle::spawn(Vec3::ZERO, &mut rng);
            assert!((2.0..6.0).contains(&p.base_size));
            assert!((180.0..260.0).contains(&p.hue));
            assert!((1500.0..4000.0).contains(&p.max_life));
            assert!(p.life < p.max_life);
            assert!((0.0..100.0).contains(&p.energy));
            assert!((0.0..0.15).contains(&p.magnetic_field));
            assert!(p.velocity.x.abs() <= 0.4 && p.velocity.y.abs() <= 0.4);
            assert!(p.velocity.z.abs() <= 0.2);
            assert!(p.trail().is_empty());
        }
    }

    #[test]
    fn test_spawn_covers_all_variants() {
        let mut rng = rng();
        let variants: Vec<_> = (0..200)
            .map(|_| Particle::spawn(Vec3::ZERO, &mut rng).variant)
            .collect();
        for v in ParticleVariant::ALL {
            assert!(variants.contains(&v), "{v:?} never spawned");
        }
    }

    #[test]
    fn test_push_trail_evicts_oldest_into_pool() {
        let mut rng = rng();
        let mut pool = trail_pool();
        let mut p = Particle::spawn(Vec3::ZERO, &mut rng);

        for i in 0..(TRAIL_LENGTH + 3) {
            let mut point = pool.acquire();
            point.x = i as f64;
            p.push_trail(point, &mut pool);
            assert!(p.trail().len() <= TRAIL_LENGTH);
        }

        assert_eq!(p.trail().len(), TRAIL_LENGTH);
        assert_eq!(p.trail()[0].x, (TRAIL_LENGTH + 2) as f64, "newest first");
        assert_eq!(pool.stats().live(), TRAIL_LENGTH);
    }

    #[test]
    fn test_release_trail_returns_everything() {
        let mut rng = rng();
        let mut pool = trail_pool();
        let mut p = Particle::spawn(Vec3::ZERO, &mut rng);
        for _ in 0..5 {
            let point = pool.acquire();
            p.push_trail(point, &mut pool);
        }
        p.release_trail(&mut pool);
        assert!(p.trail().is_empty());
        assert_eq!(pool.stats().live(), 0);
        assert_eq!(pool.idle(), TRAIL_POOL_SEED);
    }
}
