//! End-to-end scene tests: probe → quality → lifecycle → frame loop → draw,
//! through the public API only.

use nfield_core::{
    Bounds, Color, DeviceCapabilities, DrawKind, DrawingSurface, FrameHandle, FrameOutcome, Host,
    HostHints, Point, Politeness, PointerWriter, RasterSurface, RecordingSurface, SceneController,
    SceneError, SceneState, SurfaceInfo, should_rebuild,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn rng() -> SmallRng {
    SmallRng::seed_from_u64(42)
}

/// Headless host over any surface, with a switchable surface slot.
struct TestHost<S> {
    width: f64,
    height: f64,
    surface: Option<S>,
    next_frame: u64,
    writer: Option<PointerWriter>,
    announcements: Vec<(String, Politeness)>,
}

impl<S> TestHost<S> {
    fn new(width: f64, height: f64, surface: Option<S>) -> Self {
        Self {
            width,
            height,
            surface,
            next_frame: 0,
            writer: None,
            announcements: Vec::new(),
        }
    }
}

impl<S: DrawingSurface> Host for TestHost<S> {
    type Surface = S;

    fn surface_info(&mut self) -> Option<SurfaceInfo> {
        self.surface.as_ref().map(|_| SurfaceInfo {
            width: self.width,
            height: self.height,
            origin: Point::new(0.0, 0.0),
        })
    }

    fn surface(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    fn request_frame(&mut self) -> FrameHandle {
        self.next_frame += 1;
        FrameHandle(self.next_frame)
    }

    fn cancel_frame(&mut self, _handle: FrameHandle) {}

    fn register_listeners(&mut self, pointer: PointerWriter) {
        self.writer = Some(pointer);
    }

    fn unregister_listeners(&mut self) {
        self.writer = None;
    }

    fn announce(&mut self, message: &str, politeness: Politeness) {
        self.announcements.push((message.to_string(), politeness));
    }
}

fn caps(cores: u32) -> DeviceCapabilities {
    DeviceCapabilities::probe(&HostHints {
        hardware_concurrency: Some(cores),
        ..HostHints::default()
    })
}

/// Low-end device, 120 frames at 16ms spacing.
#[test]
fn low_end_scene_runs_two_seconds() {
    let host = TestHost::new(800.0, 600.0, Some(RecordingSurface::new()));
    let mut scene = SceneController::with_rng(host, caps(2), false, rng());
    scene.initialize().unwrap();
    scene.start().unwrap();
    assert_eq!(scene.particles().len(), 50);

    let mut expected_rebuilds = 0;
    for k in 1..=120u32 {
        let t = 16.0 * f64::from(k);
        if should_rebuild(t) {
            expected_rebuilds += 1;
        }
        let outcome = scene.on_frame(t);
        assert!(matches!(outcome, FrameOutcome::Rendered(_)), "frame {k}");

        assert_eq!(scene.metrics().particle_count, 50);
        assert!(scene.connections().len() <= scene.quality().max_connections);
        for p in scene.particles() {
            assert!(p.size >= 0.0, "size went negative at frame {k}");
            assert!(p.trail().is_empty(), "low-end devices draw no trails");
        }
    }

    // Every tick in [0, 1000) rebuilds; none in [1000, 2000).
    assert_eq!(expected_rebuilds, 62);
    assert_eq!(scene.connection_rebuilds(), expected_rebuilds);

    // The first metrics window closes at t=1024 (anchored at t=16).
    let m = scene.metrics();
    assert!(m.fps > 0.0);
    assert!((m.frame_time - 16.0).abs() < 1e-9);
}

#[test]
fn high_end_scene_keeps_trails_bounded_and_pooled() {
    let host = TestHost::new(1024.0, 768.0, Some(RecordingSurface::new()));
    let mut scene = SceneController::with_rng(host, caps(8), false, rng());
    scene.initialize().unwrap();
    scene.start().unwrap();
    assert_eq!(scene.particles().len(), 150);

    for k in 1..=40u32 {
        scene.on_frame(16.0 * f64::from(k));
    }

    let held: usize = scene.particles().iter().map(|p| p.trail().len()).sum();
    assert!(held > 0);
    assert!(scene.particles().iter().all(|p| p.trail().len() <= 12));
    assert_eq!(scene.particle_system().trail_pool().stats().live(), held);

    scene.dispose();
    assert_eq!(scene.particle_system().trail_pool().stats().live(), 0);
}

/// Low-end devices draw plain discs, so the only rect is the fade fill and
/// the only gradients are wave glows.
#[test]
fn draw_order_is_fade_then_field() {
    let host = TestHost::new(400.0, 300.0, Some(RecordingSurface::new()));
    let mut scene = SceneController::with_rng(host, caps(2), false, rng());
    scene.initialize().unwrap();
    scene.start().unwrap();

    let FrameOutcome::Rendered(stats) = scene.on_frame(16.0) else {
        panic!("expected a rendered frame");
    };
    let surface = scene.host_mut().surface().unwrap();
    let commands = surface.commands();

    assert_eq!(commands[0].kind, DrawKind::Rect);
    assert_eq!(surface.count(DrawKind::Rect), 1);
    assert_eq!(surface.depth(), 0, "save/restore balanced");
    assert_eq!(surface.global_alpha(), 1.0);
    assert_eq!(stats.particles_drawn + stats.particles_culled, 50);
    assert_eq!(surface.count(DrawKind::Polygon), 0);
    assert_eq!(surface.count(DrawKind::RadialGradient), stats.waves_drawn);
}

#[test]
fn missing_surface_fails_init_once() {
    let host: TestHost<RecordingSurface> = TestHost::new(800.0, 600.0, None);
    let mut scene = SceneController::with_rng(host, caps(8), false, rng());

    assert_eq!(scene.initialize(), Err(SceneError::SurfaceUnavailable));
    assert_eq!(scene.state(), SceneState::Uninitialized);
    assert_eq!(scene.host().announcements.len(), 1);
    assert_eq!(scene.host().next_frame, 0);
    assert_eq!(scene.on_frame(16.0), FrameOutcome::Inactive);
}

#[test]
fn surface_lost_mid_run_skips_frames() {
    let host = TestHost::new(800.0, 600.0, Some(RecordingSurface::new()));
    let mut scene = SceneController::with_rng(host, caps(2), false, rng());
    scene.initialize().unwrap();
    scene.start().unwrap();
    scene.on_frame(16.0);

    let parked = scene.host_mut().surface.take();
    let before: Vec<_> = scene.particles().iter().map(|p| p.position).collect();
    assert_eq!(scene.on_frame(32.0), FrameOutcome::Skipped);
    assert_eq!(scene.on_frame(48.0), FrameOutcome::Skipped);
    let after: Vec<_> = scene.particles().iter().map(|p| p.position).collect();
    assert_eq!(before, after);

    scene.host_mut().surface = parked;
    assert!(matches!(scene.on_frame(64.0), FrameOutcome::Rendered(_)));
    assert_eq!(scene.frames(), 2);
}

#[test]
fn pointer_pulls_the_field() {
    let host = TestHost::new(800.0, 600.0, Some(RecordingSurface::new()));
    let mut scene = SceneController::with_rng(host, caps(2), false, rng());
    scene.initialize().unwrap();
    scene.start().unwrap();

    let mut writer = scene.host_mut().writer.take().unwrap();
    assert!(writer.pointer_moved(400.0, 300.0, 0.0));
    assert!(!writer.pointer_moved(10.0, 10.0, 5.0), "throttled");
    assert_eq!(scene.input().latest(), Some(Point::new(400.0, 300.0)));
    assert_eq!(scene.bounds(), Bounds::new(800.0, 600.0));

    let before = scene.particles().to_vec();
    scene.on_frame(16.0);
    assert_eq!(scene.frames(), 1);

    let mut pulled = 0;
    for (old, new) in before.iter().zip(scene.particles()) {
        let (dx, dy) = (400.0 - new.position.x, 300.0 - new.position.y);
        let recycled = new.life < old.life;
        if recycled || dx.hypot(dy) >= 250.0 {
            continue;
        }
        // Undo damping to isolate the impulse this frame added.
        let ix = new.velocity.x / 0.998 - old.velocity.x;
        let iy = new.velocity.y / 0.998 - old.velocity.y;
        assert!(ix * dx >= -1e-12 && iy * dy >= -1e-12, "impulse points away");
        assert!(ix * dx + iy * dy > 0.0);
        assert_eq!(new.energy, (old.energy + 0.5).min(100.0));
        pulled += 1;
    }
    assert!(pulled > 0, "no particle near the pointer");
}

#[test]
fn raster_host_paints_pixels() {
    let surface = RasterSurface::new(160.0, 120.0, 2.0, Color::rgba(0, 0, 0, 1.0));
    let host = TestHost::new(160.0, 120.0, Some(surface));
    let mut scene = SceneController::with_rng(host, caps(8), false, rng());
    scene.initialize().unwrap();
    scene.start().unwrap();
    for k in 1..=30u32 {
        scene.on_frame(16.0 * f64::from(k));
    }

    let raster = scene.host_mut().surface().unwrap();
    assert_eq!(raster.pixel_width(), 320);
    assert_eq!(raster.pixel_height(), 240);
    let lit = (0..240)
        .flat_map(|y| (0..320).map(move |x| (x, y)))
        .filter(|&(x, y)| raster.pixel(x, y).is_some_and(|px| px != [0, 0, 0]))
        .count();
    assert!(lit > 0, "something should have been drawn");

    let ppm = raster.to_ppm();
    assert!(ppm.starts_with(b"P6\n320 240\n255\n"));
}
