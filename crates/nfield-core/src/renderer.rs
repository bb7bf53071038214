//! Draws one frame of the field onto a [`DrawingSurface`].
//!
//! Fixed order per frame: fade fill, particles (each with its trail
//! beneath it), connections with their traveling data dots, wave glows.

use std::f64::consts::{FRAC_PI_4, TAU};

use crate::connections::Connection;
use crate::constants::{DEPTH_LIMIT, DEPTH_SHRINK, MIN_RENDER_SIZE};
use crate::particle::{Particle, ParticleVariant};
use crate::particles::Bounds;
use crate::quality::QualityConfig;
use crate::surface::{Color, DrawingSurface, GradientStop};
use crate::vector::Point;
use crate::waves::WaveField;

const CONNECTION_WIDTH: f64 = 1.5;
const DATA_DOT_RADIUS: f64 = 2.5;
const WAVE_ALPHA: f64 = 0.15;

/// Everything the renderer reads for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    pub particles: &'a [Particle],
    pub connections: &'a [Connection],
    pub waves: &'a [WaveField],
    pub quality: &'a QualityConfig,
    pub bounds: Bounds,
    pub time_ms: f64,
}

/// What a render pass actually drew.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub particles_drawn: usize,
    pub particles_culled: usize,
    pub trail_points_drawn: usize,
    pub connections_drawn: usize,
    pub waves_drawn: usize,
}

/// Size multiplier for a particle at depth `z`: 1 at the focal plane,
/// 0.4 at the depth limit.
pub fn depth_scale(z: f64) -> f64 {
    1.0 - z.abs() / DEPTH_LIMIT * DEPTH_SHRINK
}

/// Connection pulse in [0, 1] at `time_ms`.
pub fn connection_pulse(time_ms: f64, phase: f64) -> f64 {
    (time_ms * 0.006 + phase).sin() * 0.5 + 0.5
}

/// Position of a connection's data dot along its segment, in [0, 1).
pub fn data_progress(time_ms: f64, data: f64) -> f64 {
    (time_ms * 0.003 + data).rem_euclid(1.0)
}

#[derive(Clone, Debug)]
pub struct Renderer {
    fade: Color,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            fade: Color::rgba(0, 0, 0, 0.08),
        }
    }

    /// Override the translucent fill that produces the motion-fade effect.
    pub fn with_fade(fade: Color) -> Self {
        Self { fade }
    }

    pub fn render<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        view: &FrameView<'_>,
    ) -> RenderStats {
        let mut stats = RenderStats::default();

        surface.set_global_alpha(1.0);
        surface.fill_rect(0.0, 0.0, view.bounds.width, view.bounds.height, self.fade);

        for particle in view.particles {
            match draw_particle(surface, particle, view.quality.enable_complex_shapes) {
                Some(trail) => {
                    stats.particles_drawn += 1;
                    stats.trail_points_drawn += trail;
                }
                None => stats.particles_culled += 1,
            }
        }

        for conn in view.connections {
            let (Some(a), Some(b)) = (view.particles.get(conn.from), view.particles.get(conn.to))
            else {
                continue;
            };
            draw_connection(surface, conn, a.position.into(), b.position.into(), view.time_ms);
            stats.connections_drawn += 1;
        }

        surface.set_global_alpha(WAVE_ALPHA);
        for wave in view.waves {
            let radius = wave.glow_radius();
            if radius <= 0.0 {
                continue;
            }
            let stops = [
                GradientStop::new(0.0, Color::rgba(100, 220, 255, 0.4)),
                GradientStop::new(0.7, Color::rgba(100, 220, 255, 0.1)),
                GradientStop::new(1.0, Color::TRANSPARENT),
            ];
            surface.fill_radial_gradient(wave.position, radius, &stops);
            stats.waves_drawn += 1;
        }

        surface.set_global_alpha(1.0);
        stats
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw one particle and its trail. Returns the number of trail points
/// drawn, or `None` if the particle was too small to draw.
fn draw_particle<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    p: &Particle,
    complex_shapes: bool,
) -> Option<usize> {
    let depth = depth_scale(p.position.z);
    let size = p.size * depth;
    if size < MIN_RENDER_SIZE {
        return None;
    }
    let color = Color::hsl(p.hue, 75.0, 65.0);

    // Oldest first so newer points paint over older ones.
    let trail = p.trail();
    let n = trail.len() as f64;
    for (k, point) in trail.iter().enumerate().rev() {
        let fade = 1.0 - k as f64 / n;
        surface.set_global_alpha(fade * 0.4 * depth);
        surface.fill_circle(Point::new(point.x, point.y), size * fade * 0.6, color);
    }

    surface.set_global_alpha(p.alpha * depth);
    let center = Point::from(p.position);

    if !complex_shapes {
        surface.fill_circle(center, size, color);
        return Some(trail.len());
    }

    match p.variant {
        ParticleVariant::Neural => {
            let stops = [
                GradientStop::new(0.0, Color::hsl(p.hue, 90.0, 75.0)),
                GradientStop::new(0.6, Color::hsl(p.hue, 70.0, 50.0)),
                GradientStop::new(1.0, Color::TRANSPARENT),
            ];
            surface.fill_radial_gradient(center, size * 3.0, &stops);
            surface.fill_circle(center, size, Color::hsl(p.hue, 100.0, 85.0));
        }
        ParticleVariant::Quantum => {
            surface.save();
            surface.translate(center.x, center.y);
            surface.rotate(p.rotation);
            let uncertainty = (p.pulse * 3.0).sin() * 0.5 + 0.5;
            let lightness = 40.0 + uncertainty * 40.0;
            for i in 0..8 {
                surface.rotate(FRAC_PI_4);
                surface.fill_rect(
                    -size * 0.6,
                    -size * 0.6,
                    size * 1.2,
                    size * 0.3,
                    Color::hsl(p.hue + f64::from(i) * 8.0, 80.0, lightness),
                );
            }
            surface.restore();
        }
        ParticleVariant::Star => {
            surface.save();
            surface.translate(center.x, center.y);
            surface.rotate(p.rotation);
            let points: Vec<Point> = (0..10)
                .map(|i| {
                    let angle = f64::from(i) / 10.0 * TAU;
                    let radius = if i % 2 == 0 { size * 2.0 } else { size * 0.8 };
                    Point::new(angle.cos() * radius, angle.sin() * radius)
                })
                .collect();
            surface.fill_polygon(&points, color);
            surface.restore();
        }
    }

    Some(trail.len())
}

fn draw_connection<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    conn: &Connection,
    a: Point,
    b: Point,
    time_ms: f64,
) {
    let pulse = connection_pulse(time_ms, conn.pulse_phase);

    surface.set_global_alpha(conn.strength * pulse * 0.7);
    surface.stroke_line(a, b, CONNECTION_WIDTH, Color::rgba(100, 200, 255, 0.4));

    let dot = a.lerp(b, data_progress(time_ms, conn.data));
    surface.set_global_alpha(pulse * 0.8);
    surface.fill_circle(dot, DATA_DOT_RADIUS, Color::hsl(200.0, 100.0, 70.0 + pulse * 30.0));
}
