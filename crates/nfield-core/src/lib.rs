//! Adaptive neural particle-field engine.
//!
//! A few dozen to a few hundred particles drift through a
//! pseudo-3D volume, are pulled toward the pointer, leave pooled trails, and
//! are joined by a periodically rebuilt proximity graph. Six ambient wave
//! fields glow underneath. Quality adapts once, from a device-capability
//! probe and the reduced-motion preference.
//!
//! Zero I/O. The embedding host supplies the drawing surface, the frame
//! clock and pointer events through [`scene::Host`].

pub mod capability;
pub mod connections;
pub mod constants;
pub mod error;
pub mod input;
pub mod particle;
pub mod particles;
pub mod performance;
pub mod pool;
pub mod quality;
pub mod raster;
pub mod renderer;
pub mod scene;
pub mod surface;
pub mod vector;
pub mod waves;

pub use capability::{DeviceCapabilities, HostHints};
pub use connections::{Connection, ConnectionGraph, build_connections, should_rebuild};
pub use constants::{CONNECTION_DISTANCE, FRAME_MS, TARGET_FPS, TRAIL_LENGTH, WAVE_FIELD_COUNT};
pub use error::{Result, SceneError};
pub use input::{InputTracker, PointerWriter};
pub use particle::{Particle, ParticleVariant, TrailPoint, TrailPool};
pub use particles::{Bounds, ParticleSystem, StepContext, step_particle};
pub use performance::{PerformanceMetrics, PerformanceMonitor};
pub use pool::{ObjectPool, PoolStats};
pub use quality::QualityConfig;
pub use raster::RasterSurface;
pub use renderer::{FrameView, RenderStats, Renderer};
pub use scene::{
    FrameHandle, FrameOutcome, Host, Politeness, SceneController, SceneState, SurfaceInfo,
};
pub use surface::{Color, DrawCommand, DrawKind, DrawingSurface, GradientStop, RecordingSurface};
pub use vector::{Point, Vec3};
pub use waves::{WaveField, WaveFieldSystem};
