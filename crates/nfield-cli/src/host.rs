//! Headless host: a raster surface, a frame-request flag and a parked
//! pointer writer, with announcements routed to the log.

use nfield_core::{
    Color, FrameHandle, Host, Point, PointerWriter, Politeness, RasterSurface, SurfaceInfo,
};

pub struct HeadlessHost {
    width: f64,
    height: f64,
    surface: Option<RasterSurface>,
    next_frame: u64,
    pending: Option<FrameHandle>,
    pointer: Option<PointerWriter>,
    announcements: Vec<String>,
}

impl HeadlessHost {
    /// A host with a `width`x`height` surface at `pixel_ratio`. A surface
    /// with no area cannot be created and initialization will fail.
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        let surface = (width > 0.0 && height > 0.0)
            .then(|| RasterSurface::new(width, height, pixel_ratio, Color::rgba(0, 0, 0, 1.0)));
        Self {
            width,
            height,
            surface,
            next_frame: 0,
            pending: None,
            pointer: None,
            announcements: Vec::new(),
        }
    }

    /// Whether the scene has asked for another frame.
    pub fn frame_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Hand the registered pointer writer to an input source.
    pub fn take_pointer(&mut self) -> Option<PointerWriter> {
        self.pointer.take()
    }

    pub fn raster(&self) -> Option<&RasterSurface> {
        self.surface.as_ref()
    }

    pub fn announcements(&self) -> &[String] {
        &self.announcements
    }
}

impl Host for HeadlessHost {
    type Surface = RasterSurface;

    fn surface_info(&mut self) -> Option<SurfaceInfo> {
        self.surface.as_ref().map(|_| SurfaceInfo {
            width: self.width,
            height: self.height,
            origin: Point::new(0.0, 0.0),
        })
    }

    fn surface(&mut self) -> Option<&mut RasterSurface> {
        self.surface.as_mut()
    }

    fn request_frame(&mut self) -> FrameHandle {
        self.next_frame += 1;
        let handle = FrameHandle(self.next_frame);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }

    fn register_listeners(&mut self, pointer: PointerWriter) {
        self.pointer = Some(pointer);
    }

    fn unregister_listeners(&mut self) {
        self.pointer = None;
    }

    fn announce(&mut self, message: &str, politeness: Politeness) {
        match politeness {
            Politeness::Polite => tracing::info!("announce: {message}"),
            Politeness::Assertive => tracing::warn!("announce: {message}"),
        }
        self.announcements.push(message.to_string());
    }
}

/// Pointer position at `time_ms` on a slow Lissajous sweep over the surface.
pub fn sweep(time_ms: f64, width: f64, height: f64) -> Point {
    Point::new(
        width * (0.5 + 0.4 * (time_ms * 0.0011).sin()),
        height * (0.5 + 0.35 * (time_ms * 0.0017).cos()),
    )
}
