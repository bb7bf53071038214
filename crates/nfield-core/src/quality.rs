use serde::{Deserialize, Serialize};

use crate::capability::DeviceCapabilities;

/// Per-scene quality settings. Recomputed only when capabilities or the
/// motion preference change, never per frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityConfig {
    pub particle_count: usize,
    pub enable_trails: bool,
    pub enable_complex_shapes: bool,
    pub max_connections: usize,
    pub animation_speed: f64,
}

impl QualityConfig {
    /// Map a capability tier and motion preference to quality settings.
    ///
    /// Reduced motion halves the particle count (floored), disables trails
    /// and slows animation to 0.3x.
    pub fn from_tier(is_high_performance: bool, reduced_motion: bool) -> Self {
        let base_count: usize = if is_high_performance { 150 } else { 50 };
        let particle_count = if reduced_motion {
            base_count / 2
        } else {
            base_count
        };

        Self {
            particle_count,
            enable_trails: is_high_performance && !reduced_motion,
            enable_complex_shapes: is_high_performance,
            max_connections: if is_high_performance { 10 } else { 5 },
            animation_speed: if reduced_motion { 0.3 } else { 1.0 },
        }
    }

    pub fn for_device(capabilities: &DeviceCapabilities, reduced_motion: bool) -> Self {
        Self::from_tier(capabilities.is_high_performance, reduced_motion)
    }
}
