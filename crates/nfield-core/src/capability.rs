//! One-shot device capability probe.
//!
//! The host hands over whatever it knows about the device as [`HostHints`];
//! anything it could not determine is `None` and falls back to a
//! conservative value.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HARDWARE_CONCURRENCY, HIGH_PERFORMANCE_CORES, MAX_DEVICE_PIXEL_RATIO,
};

/// Raw capability hints reported by the host. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostHints {
    pub hardware_concurrency: Option<u32>,
    pub accelerated_drawing: Option<bool>,
    pub device_pixel_ratio: Option<f64>,
    pub max_texture_size: Option<u32>,
}

impl HostHints {
    /// Hints for the machine this process runs on.
    ///
    /// Only core count is observable from a headless process; the drawing
    /// hints stay unreported.
    pub fn from_system() -> Self {
        Self {
            hardware_concurrency: std::thread::available_parallelism()
                .ok()
                .map(|n| u32::try_from(n.get()).unwrap_or(u32::MAX)),
            ..Self::default()
        }
    }

    /// Overlay `other` on top of `self`; reported fields in `other` win.
    pub fn merged(self, other: &HostHints) -> Self {
        Self {
            hardware_concurrency: other.hardware_concurrency.or(self.hardware_concurrency),
            accelerated_drawing: other.accelerated_drawing.or(self.accelerated_drawing),
            device_pixel_ratio: other.device_pixel_ratio.or(self.device_pixel_ratio),
            max_texture_size: other.max_texture_size.or(self.max_texture_size),
        }
    }
}

/// Resolved device capabilities. Computed once per scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCapabilities {
    pub is_high_performance: bool,
    pub supports_accelerated_drawing: bool,
    pub device_pixel_ratio: f64,
    pub hardware_concurrency: u32,
    pub max_texture_size: u32,
}

impl DeviceCapabilities {
    /// Resolve hints into capabilities. Never fails.
    pub fn probe(hints: &HostHints) -> Self {
        let hardware_concurrency = hints
            .hardware_concurrency
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_HARDWARE_CONCURRENCY);

        let device_pixel_ratio = hints
            .device_pixel_ratio
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(1.0)
            .min(MAX_DEVICE_PIXEL_RATIO);

        Self {
            is_high_performance: hardware_concurrency >= HIGH_PERFORMANCE_CORES,
            supports_accelerated_drawing: hints.accelerated_drawing.unwrap_or(false),
            device_pixel_ratio,
            hardware_concurrency,
            max_texture_size: hints.max_texture_size.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreported_defaults_are_conservative() {
        let caps = DeviceCapabilities::probe(&HostHints::default());
        assert_eq!(caps.hardware_concurrency, 2);
        assert!(!caps.is_high_performance);
        assert!(!caps.supports_accelerated_drawing);
        assert_eq!(caps.device_pixel_ratio, 1.0);
        assert_eq!(caps.max_texture_size, 0);
    }

    #[test]
    fn test_high_performance_threshold() {
        let at = |n| {
            DeviceCapabilities::probe(&HostHints {
                hardware_concurrency: Some(n),
                ..HostHints::default()
            })
            .is_high_performance
        };
        assert!(!at(3));
        assert!(at(4));
        assert!(at(16));
    }

    #[test]
    fn test_zero_cores_treated_as_unreported() {
        let caps = DeviceCapabilities::probe(&HostHints {
            hardware_concurrency: Some(0),
            ..HostHints::default()
        });
        assert_eq!(caps.hardware_concurrency, 2);
    }

    #[test]
    fn test_pixel_ratio_capped() {
        let caps = DeviceCapabilities::probe(&HostHints {
            device_pixel_ratio: Some(3.5),
            ..HostHints::default()
        });
        assert_eq!(caps.device_pixel_ratio, 2.0);

        let caps = DeviceCapabilities::probe(&HostHints {
            device_pixel_ratio: Some(1.5),
            ..HostHints::default()
        });
        assert_eq!(caps.device_pixel_ratio, 1.5);
    }

    #[test]
    fn test_merged_prefers_overrides() {
        let base = HostHints {
            hardware_concurrency: Some(8),
            device_pixel_ratio: Some(1.0),
            ..HostHints::default()
        };
        let overrides = HostHints {
            hardware_concurrency: Some(2),
            ..HostHints::default()
        };
        let merged = base.merged(&overrides);
        assert_eq!(merged.hardware_concurrency, Some(2));
        assert_eq!(merged.device_pixel_ratio, Some(1.0));
    }

    #[test]
    fn test_serializes_camel_case() {
        let caps = DeviceCapabilities::probe(&HostHints::default());
        let json = serde_json::to_string(&caps).unwrap();
        assert!(json.contains("\"isHighPerformance\":false"), "{json}");
        assert!(json.contains("\"hardwareConcurrency\":2"), "{json}");
    }
}
