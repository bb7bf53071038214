//! Proximity graph over the particle field.
//!
//! The graph is rebuilt from scratch on a coarse cadence, never merged.
//! Pairs are scanned in index order `(i, j), i < j` and the scan stops the
//! moment the cap is reached, so lower-indexed particles are favored when
//! the field is dense. That bias is deterministic for a given particle
//! order.

use std::f64::consts::TAU;

use rand::Rng;

use crate::constants::{CONNECTION_DISTANCE, CONNECTION_WINDOW_MS};
use crate::particle::Particle;

/// Edge between two particles, referenced by index into the particle list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
    pub from: usize,
    pub to: usize,
    /// 1 at zero distance, approaching 0 at the connection threshold.
    pub strength: f64,
    pub pulse_phase: f64,
    /// Seed for the traveling data dot, in [0, 1).
    pub data: f64,
}

/// Whether the graph should be rebuilt at `time_ms`.
///
/// Rebuilds happen throughout every even one-second window and never in
/// odd ones.
pub fn should_rebuild(time_ms: f64) -> bool {
    (time_ms / CONNECTION_WINDOW_MS).floor().rem_euclid(2.0) == 0.0
}

/// Scan all pairs in index order and emit up to `max_connections` edges.
pub fn build_connections(
    particles: &[Particle],
    max_connections: usize,
    rng: &mut impl Rng,
) -> Vec<Connection> {
    let mut connections = Vec::with_capacity(max_connections);
    if max_connections == 0 {
        return connections;
    }

    'outer: for (i, a) in particles.iter().enumerate() {
        for (j, b) in particles.iter().enumerate().skip(i + 1) {
            let distance = a.position.distance_2d(b.position);
            if distance < CONNECTION_DISTANCE {
                connections.push(Connection {
                    from: i,
                    to: j,
                    strength: 1.0 - distance / CONNECTION_DISTANCE,
                    pulse_phase: rng.random::<f64>() * TAU,
                    data: rng.random::<f64>(),
                });
                if connections.len() == max_connections {
                    break 'outer;
                }
            }
        }
    }

    connections
}

/// The current connection set plus rebuild bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct ConnectionGraph {
    connections: Vec<Connection>,
    rebuilds: u64,
}

impl ConnectionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild if `time_ms` falls in a rebuild window. Returns whether a
    /// rebuild happened.
    pub fn refresh(
        &mut self,
        time_ms: f64,
        particles: &[Particle],
        max_connections: usize,
        rng: &mut impl Rng,
    ) -> bool {
        if !should_rebuild(time_ms) {
            return false;
        }
        self.rebuild(particles, max_connections, rng);
        true
    }

    /// Replace the whole connection set unconditionally.
    pub fn rebuild(&mut self, particles: &[Particle], max_connections: usize, rng: &mut impl Rng) {
        self.connections = build_connections(particles, max_connections, rng);
        self.rebuilds += 1;
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Number of rebuilds since creation.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn clear(&mut self) {
        self.connections.clear();
    }
}
