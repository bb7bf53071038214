use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::constants::{FRAME_WINDOW, MAX_GOOD_FRAME_TIME_MS, METRICS_PERIOD_MS, TARGET_FPS};

/// Read-only metrics snapshot handed to the embedding application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Frames counted in the last completed one-second window.
    pub fps: f64,
    /// Mean of the rolling frame deltas, in ms.
    pub frame_time: f64,
    /// Wall time of the most recent draw pass, in ms.
    pub render_time: f64,
    pub particle_count: usize,
    pub connection_count: usize,
}

/// Measures frame cadence and render cost.
#[derive(Clone, Debug)]
pub struct PerformanceMonitor {
    metrics: PerformanceMetrics,
    target_fps: f64,
    frame_count: u32,
    window_start_ms: Option<f64>,
    last_frame_ms: Option<f64>,
    frame_deltas: VecDeque<f64>,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::with_target_fps(TARGET_FPS)
    }

    pub fn with_target_fps(target_fps: f64) -> Self {
        Self {
            metrics: PerformanceMetrics::default(),
            target_fps,
            frame_count: 0,
            window_start_ms: None,
            last_frame_ms: None,
            frame_deltas: VecDeque::with_capacity(FRAME_WINDOW + 1),
        }
    }

    /// Record a frame callback at `now_ms`. Returns true when the one-second
    /// window closed and `fps`/`frame_time` were refreshed.
    pub fn record_frame(&mut self, now_ms: f64) -> bool {
        let (Some(window_start), Some(last)) = (self.window_start_ms, self.last_frame_ms) else {
            self.window_start_ms = Some(now_ms);
            self.last_frame_ms = Some(now_ms);
            return false;
        };

        self.frame_deltas.push_back((now_ms - last).max(0.0));
        if self.frame_deltas.len() > FRAME_WINDOW {
            self.frame_deltas.pop_front();
        }
        self.last_frame_ms = Some(now_ms);
        self.frame_count += 1;

        if now_ms - window_start < METRICS_PERIOD_MS {
            return false;
        }

        self.metrics.fps = f64::from(self.frame_count);
        self.metrics.frame_time =
            self.frame_deltas.iter().sum::<f64>() / self.frame_deltas.len() as f64;
        self.frame_count = 0;
        self.window_start_ms = Some(now_ms);
        true
    }

    /// Record the cost and size of the latest draw pass.
    pub fn record_render(
        &mut self,
        render_ms: f64,
        particle_count: usize,
        connection_count: usize,
    ) {
        self.metrics.render_time = render_ms;
        self.metrics.particle_count = particle_count;
        self.metrics.connection_count = connection_count;
    }

    pub fn metrics(&self) -> PerformanceMetrics {
        self.metrics
    }

    /// True iff fps ≥ 80% of target and mean frame time ≤ 20ms.
    pub fn is_performance_good(&self) -> bool {
        self.metrics.fps >= self.target_fps * 0.8
            && self.metrics.frame_time <= MAX_GOOD_FRAME_TIME_MS
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn drive(monitor: &mut PerformanceMonitor, frames: usize, interval_ms: f64) -> f64 {
        let mut t = 0.0;
        for _ in 0..frames {
            t += interval_ms;
            monitor.record_frame(t);
        }
        t
    }

    #[test]
    fn test_first_frame_only_anchors() {
        let mut m = PerformanceMonitor::new();
        assert!(!m.record_frame(5000.0));
        assert_eq!(m.metrics(), PerformanceMetrics::default());
        assert!(!m.is_performance_good());
    }

    #[test]
    fn test_steady_sixty_fps_is_good() {
        let mut m = PerformanceMonitor::new();
        drive(&mut m, 200, 1000.0 / 60.0);
        let metrics = m.metrics();
        assert!((59.0..=61.0).contains(&metrics.fps), "fps = {}", metrics.fps);
        assert_relative_eq!(metrics.frame_time, 1000.0 / 60.0, epsilon = 1e-6);
        assert!(m.is_performance_good());
    }

    #[test]
    fn test_slow_frames_are_not_good() {
        let mut m = PerformanceMonitor::new();
        drive(&mut m, 100, 33.0);
        assert!(m.metrics().fps <= 31.0);
        assert!(m.metrics().frame_time > 20.0);
        assert!(!m.is_performance_good());
    }

    #[test]
    fn test_metrics_only_refresh_once_per_second() {
        let mut m = PerformanceMonitor::new();
        m.record_frame(0.0);
        let refreshed: Vec<bool> = (1..=70).map(|i| m.record_frame(i as f64 * 16.0)).collect();
        // 1008ms is the first timestamp at or past one second.
        assert_eq!(refreshed.iter().filter(|r| **r).count(), 1);
        assert!(refreshed[62]);
        assert_eq!(m.metrics().fps, 63.0);
    }

    #[test]
    fn test_rolling_window_capped() {
        let mut m = PerformanceMonitor::new();
        let t = drive(&mut m, 500, 10.0);
        // Slow tail dominates the 60-sample mean once the window rolls over.
        let mut t2 = t;
        for _ in 0..100 {
            t2 += 30.0;
            m.record_frame(t2);
        }
        assert_relative_eq!(m.metrics().frame_time, 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_record_render() {
        let mut m = PerformanceMonitor::new();
        m.record_render(2.5, 50, 4);
        let metrics = m.metrics();
        assert_eq!(metrics.render_time, 2.5);
        assert_eq!(metrics.particle_count, 50);
        assert_eq!(metrics.connection_count, 4);
    }

    #[test]
    fn test_custom_target() {
        let mut m = PerformanceMonitor::with_target_fps(30.0);
        drive(&mut m, 100, 19.0);
        assert!(m.is_performance_good());
    }
}
