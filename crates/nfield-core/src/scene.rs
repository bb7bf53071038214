//! Scene lifecycle and the per-frame loop.
//!
//! ```text
//! Uninitialized --initialize--> Ready --start--> Running --dispose--> Disposed
//!       ^  (surface missing: stay)                 |  ^
//!                                                  +--+ on_frame / on_resize
//! ```
//!
//! The host owns the drawing surface, the frame scheduler and the event
//! listeners; the controller only talks to it through [`Host`]. Nothing on
//! the per-frame path returns an error: a missing surface skips the tick and
//! asks for another frame.

use std::fmt;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info, trace, warn};

use crate::capability::DeviceCapabilities;
use crate::connections::{Connection, ConnectionGraph};
use crate::constants::FRAME_MS;
use crate::error::{Result, SceneError};
use crate::input::{InputTracker, PointerWriter};
use crate::particle::Particle;
use crate::particles::{Bounds, ParticleSystem, clamp_delta};
use crate::performance::{PerformanceMetrics, PerformanceMonitor};
use crate::quality::QualityConfig;
use crate::renderer::{FrameView, RenderStats, Renderer};
use crate::surface::DrawingSurface;
use crate::vector::Point;
use crate::waves::{WaveField, WaveFieldSystem};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneState {
    Uninitialized,
    Ready,
    Running,
    Disposed,
}

impl fmt::Display for SceneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SceneState::Uninitialized => "uninitialized",
            SceneState::Ready => "ready",
            SceneState::Running => "running",
            SceneState::Disposed => "disposed",
        };
        f.write_str(s)
    }
}

/// Surface geometry as measured by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceInfo {
    /// Extent in surface units.
    pub width: f64,
    pub height: f64,
    /// Host-space position of the surface's top-left corner.
    pub origin: Point,
}

/// Token for a pending frame request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Urgency of a host announcement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Politeness {
    Polite,
    Assertive,
}

/// Services the embedding application provides to a scene.
pub trait Host {
    type Surface: DrawingSurface;

    /// Measure the drawing surface. `None` means no surface can be obtained.
    fn surface_info(&mut self) -> Option<SurfaceInfo>;

    /// The live drawing surface. May be momentarily `None`, e.g. mid-resize.
    fn surface(&mut self) -> Option<&mut Self::Surface>;

    /// Ask for `SceneController::on_frame` to be called before the next paint.
    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Start delivering pointer moves through `pointer` and resize
    /// notifications through `SceneController::on_resize`.
    fn register_listeners(&mut self, pointer: PointerWriter);

    fn unregister_listeners(&mut self);

    fn announce(&mut self, message: &str, politeness: Politeness);
}

/// Result of one frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered(RenderStats),
    /// The surface was missing; nothing moved, another frame was requested.
    Skipped,
    /// The scene is not running; no frame was requested.
    Inactive,
}

pub struct SceneController<H: Host> {
    host: H,
    state: SceneState,
    capabilities: DeviceCapabilities,
    reduced_motion: bool,
    quality: QualityConfig,
    bounds: Bounds,
    particles: ParticleSystem,
    connections: ConnectionGraph,
    waves: WaveFieldSystem,
    input: InputTracker,
    monitor: PerformanceMonitor,
    renderer: Renderer,
    rng: SmallRng,
    last_time_ms: f64,
    pending_frame: Option<FrameHandle>,
    frames: u64,
}

impl<H: Host> SceneController<H> {
    pub fn new(host: H, capabilities: DeviceCapabilities, reduced_motion: bool) -> Self {
        Self::with_rng(host, capabilities, reduced_motion, SmallRng::from_os_rng())
    }

    /// Construct with an explicit RNG, for reproducible scenes.
    pub fn with_rng(
        host: H,
        capabilities: DeviceCapabilities,
        reduced_motion: bool,
        rng: SmallRng,
    ) -> Self {
        let quality = QualityConfig::for_device(&capabilities, reduced_motion);
        Self {
            host,
            state: SceneState::Uninitialized,
            capabilities,
            reduced_motion,
            quality,
            bounds: Bounds::new(0.0, 0.0),
            particles: ParticleSystem::new(),
            connections: ConnectionGraph::new(),
            waves: WaveFieldSystem::new(),
            input: InputTracker::new(),
            monitor: PerformanceMonitor::new(),
            renderer: Renderer::new(),
            rng,
            last_time_ms: 0.0,
            pending_frame: None,
            frames: 0,
        }
    }

    /// Replace the performance monitor, e.g. to change the target frame rate.
    pub fn with_monitor(mut self, monitor: PerformanceMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Acquire the drawing surface. On failure the scene stays
    /// `Uninitialized`, the host is told once, and no frame is scheduled.
    pub fn initialize(&mut self) -> Result<()> {
        self.expect_state(SceneState::Uninitialized, "initialize")?;

        let Some(info) = self.host.surface_info() else {
            warn!("drawing surface unavailable; scene stays uninitialized");
            self.host
                .announce("Background initialization failed", Politeness::Assertive);
            return Err(SceneError::SurfaceUnavailable);
        };

        self.apply_surface(info);
        self.state = SceneState::Ready;
        info!(
            width = info.width,
            height = info.height,
            high_performance = self.capabilities.is_high_performance,
            "scene initialized"
        );
        Ok(())
    }

    /// Populate the field, register listeners and schedule the first frame.
    pub fn start(&mut self) -> Result<()> {
        self.expect_state(SceneState::Ready, "start")?;

        self.populate();
        self.last_time_ms = 0.0;
        self.host.register_listeners(self.input.writer());
        self.pending_frame = Some(self.host.request_frame());
        self.state = SceneState::Running;

        info!(
            particles = self.particles.len(),
            max_connections = self.quality.max_connections,
            trails = self.quality.enable_trails,
            "scene running"
        );
        self.host
            .announce("Background animation started", Politeness::Polite);
        Ok(())
    }

    /// Frame callback. `time_ms` is the host's monotonic frame timestamp.
    pub fn on_frame(&mut self, time_ms: f64) -> FrameOutcome {
        if self.state != SceneState::Running {
            return FrameOutcome::Inactive;
        }
        self.pending_frame = None;

        if self.host.surface().is_none() {
            trace!(time_ms, "surface missing; skipping frame");
            self.pending_frame = Some(self.host.request_frame());
            return FrameOutcome::Skipped;
        }

        let delta = clamp_delta((time_ms - self.last_time_ms) / FRAME_MS);
        self.last_time_ms = time_ms;

        self.waves.advance(delta);
        self.particles.tick(
            delta,
            self.bounds,
            self.input.latest(),
            &self.quality,
            &mut self.rng,
        );
        if self.connections.refresh(
            time_ms,
            self.particles.particles(),
            self.quality.max_connections,
            &mut self.rng,
        ) {
            trace!(time_ms, connections = self.connections.len(), "connections rebuilt");
        }

        let stats = match self.host.surface() {
            Some(surface) => {
                let view = FrameView {
                    particles: self.particles.particles(),
                    connections: self.connections.connections(),
                    waves: self.waves.fields(),
                    quality: &self.quality,
                    bounds: self.bounds,
                    time_ms,
                };
                let started = Instant::now();
                let stats = self.renderer.render(surface, &view);
                let render_ms = started.elapsed().as_secs_f64() * 1000.0;
                self.monitor
                    .record_render(render_ms, self.particles.len(), self.connections.len());
                stats
            }
            None => RenderStats::default(),
        };

        if self.monitor.record_frame(time_ms) {
            let m = self.monitor.metrics();
            debug!(
                fps = m.fps,
                frame_time = m.frame_time,
                render_time = m.render_time,
                particles = m.particle_count,
                connections = m.connection_count,
                "metrics refreshed"
            );
        }

        self.frames += 1;
        self.pending_frame = Some(self.host.request_frame());
        FrameOutcome::Rendered(stats)
    }

    /// Re-measure the surface. While running, wave fields are regenerated
    /// for the new extent; particles keep their state.
    pub fn on_resize(&mut self) {
        if !matches!(self.state, SceneState::Ready | SceneState::Running) {
            return;
        }
        let Some(info) = self.host.surface_info() else {
            trace!("surface missing during resize; keeping previous geometry");
            return;
        };
        self.apply_surface(info);
        if self.state == SceneState::Running {
            self.waves.reseed(self.bounds, &mut self.rng);
        }
        info!(width = info.width, height = info.height, "scene resized");
    }

    /// Change the reduced-motion preference. A running scene is
    /// re-populated under the new quality settings.
    pub fn set_reduced_motion(&mut self, reduced_motion: bool) {
        if reduced_motion == self.reduced_motion {
            return;
        }
        self.reduced_motion = reduced_motion;
        self.quality = QualityConfig::for_device(&self.capabilities, reduced_motion);
        if self.state == SceneState::Running {
            self.populate();
        }
        info!(reduced_motion, particles = self.quality.particle_count, "quality updated");
    }

    /// Stop the loop and release host registrations. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.state == SceneState::Disposed {
            return;
        }
        if self.state == SceneState::Running {
            self.host.unregister_listeners();
        }
        if let Some(handle) = self.pending_frame.take() {
            self.host.cancel_frame(handle);
        }
        self.particles.clear();
        self.connections.clear();
        self.input.clear();
        let previous = self.state;
        self.state = SceneState::Disposed;
        info!(from = %previous, frames = self.frames, "scene disposed");
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    pub fn quality(&self) -> &QualityConfig {
        &self.quality
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn metrics(&self) -> PerformanceMetrics {
        self.monitor.metrics()
    }

    pub fn is_performance_good(&self) -> bool {
        self.monitor.is_performance_good()
    }

    pub fn particles(&self) -> &[Particle] {
        self.particles.particles()
    }

    pub fn particle_system(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn connections(&self) -> &[Connection] {
        self.connections.connections()
    }

    /// Connection-graph rebuilds since the scene was created.
    pub fn connection_rebuilds(&self) -> u64 {
        self.connections.rebuilds()
    }

    pub fn waves(&self) -> &[WaveField] {
        self.waves.fields()
    }

    /// Reader side of the pointer cell.
    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    /// Frames rendered (skipped frames excluded).
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn expect_state(&self, expected: SceneState, action: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SceneError::InvalidTransition {
                from: self.state,
                action,
            })
        }
    }

    fn apply_surface(&mut self, info: SurfaceInfo) {
        self.bounds = Bounds::new(info.width.max(0.0), info.height.max(0.0));
        self.input.set_origin(info.origin);
    }

    fn populate(&mut self) {
        self.particles
            .populate(self.quality.particle_count, self.bounds, &mut self.rng);
        self.waves.reseed(self.bounds, &mut self.rng);
        self.connections.clear();
    }
}

impl<H: Host> Drop for SceneController<H> {
    fn drop(&mut self) {
        self.dispose();
    }
}
