//! Pointer tracking shared between the input side and the simulation.
//!
//! The latest pointer position lives in a single atomic cell so the host may
//! deliver pointer events from a different thread than the one running
//! ticks. The writer coalesces events to at most one per 16ms of host event
//! time and translates host coordinates into surface-local ones. The physics
//! step reads the cell once per tick. Neither side ever waits on the other.
//!
//! The cell starts at the surface-local origin, so particles near the
//! top-left corner are attracted before the pointer has ever moved.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::POINTER_THROTTLE_MS;
use crate::vector::Point;

const EMPTY: u64 = u64::MAX;

fn pack(p: Point) -> u64 {
    let x = (p.x as f32).to_bits() as u64;
    let y = (p.y as f32).to_bits() as u64;
    (x << 32) | y
}

fn unpack(bits: u64) -> Option<Point> {
    if bits == EMPTY {
        return None;
    }
    let x = f32::from_bits((bits >> 32) as u32);
    let y = f32::from_bits(bits as u32);
    Some(Point::new(x as f64, y as f64))
}

#[derive(Debug)]
struct PointerCell {
    latest: AtomicU64,
    origin: AtomicU64,
}

/// Reader half: owned by the scene, sampled once per tick.
#[derive(Debug, Clone)]
pub struct InputTracker {
    cell: Arc<PointerCell>,
}

impl InputTracker {
    pub fn new() -> Self {
        Self {
            cell: Arc::new(PointerCell {
                latest: AtomicU64::new(pack(Point::default())),
                origin: AtomicU64::new(pack(Point::default())),
            }),
        }
    }

    /// A writer for the input side. Hosts should keep a single writer alive.
    pub fn writer(&self) -> PointerWriter {
        PointerWriter {
            cell: Arc::clone(&self.cell),
            last_accepted_ms: None,
        }
    }

    /// Latest surface-local pointer position; `None` only after `clear`.
    pub fn latest(&self) -> Option<Point> {
        unpack(self.cell.latest.load(Ordering::Acquire))
    }

    /// Host-space position of the surface's top-left corner.
    pub fn set_origin(&self, origin: Point) {
        self.cell.origin.store(pack(origin), Ordering::Release);
    }

    pub fn origin(&self) -> Point {
        unpack(self.cell.origin.load(Ordering::Acquire)).unwrap_or_default()
    }

    /// Forget the pointer on dispose, disabling attraction until the next move.
    pub fn clear(&self) {
        self.cell.latest.store(EMPTY, Ordering::Release);
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer half: fed with host pointer events.
#[derive(Debug)]
pub struct PointerWriter {
    cell: Arc<PointerCell>,
    last_accepted_ms: Option<f64>,
}

impl PointerWriter {
    /// Record a pointer move at host coordinates `(client_x, client_y)`
    /// observed at `event_time_ms`. Returns false if the event was
    /// coalesced away by the throttle.
    pub fn pointer_moved(&mut self, client_x: f64, client_y: f64, event_time_ms: f64) -> bool {
        if !client_x.is_finite() || !client_y.is_finite() {
            return false;
        }
        if let Some(last) = self.last_accepted_ms
            && event_time_ms - last < POINTER_THROTTLE_MS
            && event_time_ms >= last
        {
            return false;
        }
        self.last_accepted_ms = Some(event_time_ms);

        let origin = unpack(self.cell.origin.load(Ordering::Acquire)).unwrap_or_default();
        let local = Point::new(client_x - origin.x, client_y - origin.y);
        self.cell.latest.store(pack(local), Ordering::Release);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_surface_origin() {
        let tracker = InputTracker::new();
        assert_eq!(tracker.latest(), Some(Point::new(0.0, 0.0)));
        let mut writer = tracker.writer();
        assert!(writer.pointer_moved(10.0, 20.0, 0.0));
        assert_eq!(tracker.latest(), Some(Point::new(10.0, 20.0)));
    }

    #[test]
    fn test_translates_to_surface_local() {
        let tracker = InputTracker::new();
        tracker.set_origin(Point::new(100.0, 50.0));
        let mut writer = tracker.writer();
        writer.pointer_moved(130.0, 75.0, 0.0);
        assert_eq!(tracker.latest(), Some(Point::new(30.0, 25.0)));
    }

    #[test]
    fn test_throttle_coalesces_bursts() {
        let tracker = InputTracker::new();
        let mut writer = tracker.writer();
        assert!(writer.pointer_moved(1.0, 1.0, 100.0));
        assert!(!writer.pointer_moved(2.0, 2.0, 105.0));
        assert!(!writer.pointer_moved(3.0, 3.0, 115.9));
        assert_eq!(tracker.latest(), Some(Point::new(1.0, 1.0)));
        assert!(writer.pointer_moved(4.0, 4.0, 116.0));
        assert_eq!(tracker.latest(), Some(Point::new(4.0, 4.0)));
    }

    #[test]
    fn test_clock_going_backwards_is_accepted() {
        let tracker = InputTracker::new();
        let mut writer = tracker.writer();
        assert!(writer.pointer_moved(1.0, 1.0, 500.0));
        assert!(writer.pointer_moved(2.0, 2.0, 10.0));
    }

    #[test]
    fn test_rejects_non_finite() {
        let tracker = InputTracker::new();
        let mut writer = tracker.writer();
        assert!(!writer.pointer_moved(f64::NAN, 1.0, 0.0));
        assert_eq!(tracker.latest(), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_clear() {
        let tracker = InputTracker::new();
        tracker.writer().pointer_moved(5.0, 5.0, 0.0);
        tracker.clear();
        assert_eq!(tracker.latest(), None);
    }

    #[test]
    fn test_writer_on_another_thread() {
        let tracker = InputTracker::new();
        let mut writer = tracker.writer();
        let handle = std::thread::spawn(move || {
            for i in 0..10 {
                writer.pointer_moved(i as f64, 0.0, i as f64 * 20.0);
            }
        });
        handle.join().unwrap();
        assert_eq!(tracker.latest(), Some(Point::new(9.0, 0.0)));
    }
}
