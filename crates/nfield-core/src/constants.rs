/// Reference frame length in milliseconds. One "frame unit" of delta time.
pub const FRAME_MS: f64 = 16.0;

/// Upper clamp for a single tick's delta time, in frame units.
pub const MAX_DELTA: f64 = 2.0;

/// Target frame rate used by the performance predicate.
pub const TARGET_FPS: f64 = 60.0;

/// Worst acceptable mean frame time (ms) for the performance predicate.
pub const MAX_GOOD_FRAME_TIME_MS: f64 = 20.0;

/// Rolling window of frame deltas kept by the performance monitor.
pub const FRAME_WINDOW: usize = 60;

/// Metrics refresh period in milliseconds.
pub const METRICS_PERIOD_MS: f64 = 1000.0;

/// Screen-space margin beyond which particles wrap to the opposite edge.
pub const WRAP_MARGIN: f64 = 100.0;

/// Depth axis cycles at ±DEPTH_LIMIT.
pub const DEPTH_LIMIT: f64 = 600.0;

/// Pointer attraction radius (surface units).
pub const POINTER_RADIUS: f64 = 250.0;

/// Pointer attraction gain per unit of distance inside the radius.
pub const POINTER_GAIN: f64 = 0.0002;

/// Energy gained per tick while inside the pointer radius.
pub const POINTER_ENERGY_GAIN: f64 = 0.5;

/// Energy ceiling.
pub const MAX_ENERGY: f64 = 100.0;

/// Per-tick velocity damping on the screen-space axes.
pub const DAMPING_XY: f64 = 0.998;

/// Per-tick velocity damping on the depth axis.
pub const DAMPING_Z: f64 = 0.999;

/// Pulse advance per frame unit.
pub const PULSE_RATE: f64 = 0.08;

/// Maximum trail points held by one particle.
pub const TRAIL_LENGTH: usize = 12;

/// Trail point alpha relative to the particle alpha at capture time.
pub const TRAIL_ALPHA_SCALE: f64 = 0.6;

/// Trail-point instances pre-built when the pool is created.
pub const TRAIL_POOL_SEED: usize = 200;

/// Idle trail-point instances the pool retains before dropping releases.
pub const TRAIL_POOL_SOFT_CAP: usize = 4096;

/// Particles farther apart than this never connect.
pub const CONNECTION_DISTANCE: f64 = 180.0;

/// Connection cadence window in milliseconds (rebuild on even windows).
pub const CONNECTION_WINDOW_MS: f64 = 1000.0;

/// Ambient wave fields per scene.
pub const WAVE_FIELD_COUNT: usize = 6;

/// Pointer updates are coalesced to at most one per this many ms.
pub const POINTER_THROTTLE_MS: f64 = 16.0;

/// Particles whose depth-scaled size falls below this are not drawn.
pub const MIN_RENDER_SIZE: f64 = 0.8;

/// Fraction of size lost at the depth limit.
pub const DEPTH_SHRINK: f64 = 0.6;

/// Cores at or above which a device counts as high performance.
pub const HIGH_PERFORMANCE_CORES: u32 = 4;

/// Assumed core count when the host does not report one.
pub const DEFAULT_HARDWARE_CONCURRENCY: u32 = 2;

/// Device pixel ratio ceiling.
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;
