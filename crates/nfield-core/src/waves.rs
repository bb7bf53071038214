use std::f64::consts::TAU;

use rand::Rng;

use crate::constants::WAVE_FIELD_COUNT;
use crate::particles::Bounds;
use crate::vector::Point;

/// A stationary ambient oscillator. Only `phase` changes after creation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveField {
    pub position: Point,
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
}

impl WaveField {
    pub fn random(bounds: Bounds, rng: &mut impl Rng) -> Self {
        Self {
            position: Point::new(
                rng.random::<f64>() * bounds.width,
                rng.random::<f64>() * bounds.height,
            ),
            amplitude: rng.random::<f64>() * 25.0 + 15.0,
            frequency: rng.random::<f64>() * 0.025 + 0.015,
            phase: rng.random::<f64>() * TAU,
        }
    }

    /// Glow radius: |sin(phase)| * amplitude * 4.
    pub fn glow_radius(&self) -> f64 {
        self.phase.sin().abs() * self.amplitude * 4.0
    }
}

#[derive(Clone, Debug, Default)]
pub struct WaveFieldSystem {
    fields: Vec<WaveField>,
}

impl WaveFieldSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all fields with a fresh set spread over `bounds`.
    pub fn reseed(&mut self, bounds: Bounds, rng: &mut impl Rng) {
        self.fields.clear();
        self.fields
            .extend((0..WAVE_FIELD_COUNT).map(|_| WaveField::random(bounds, rng)));
    }

    pub fn advance(&mut self, delta: f64) {
        for field in &mut self.fields {
            field.phase += field.frequency * delta;
        }
    }

    pub fn fields(&self) -> &[WaveField] {
        &self.fields
    }
}
