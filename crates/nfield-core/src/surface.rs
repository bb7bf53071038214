//! The minimal 2D vector-drawing contract the renderer needs, plus a
//! recording implementation for tests and headless hosts.
//!
//! Coordinates are surface units. Every fill is multiplied by the current
//! global alpha. `translate`/`rotate` compose onto the current transform;
//! `save`/`restore` push and pop it together with the global alpha.

use crate::vector::Point;

/// A fill or stroke color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Color {
    /// sRGB channels with straight alpha in [0, 1].
    Rgba { r: u8, g: u8, b: u8, a: f64 },
    /// Hue in degrees, saturation and lightness in percent.
    Hsl { h: f64, s: f64, l: f64 },
}

impl Color {
    pub const TRANSPARENT: Color = Color::Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0.0,
    };

    pub fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self::Rgba { r, g, b, a }
    }

    pub fn hsl(h: f64, s: f64, l: f64) -> Self {
        Self::Hsl { h, s, l }
    }

    /// Channels as `[r, g, b, a]`, each in [0, 1].
    pub fn to_linear_rgba(self) -> [f64; 4] {
        match self {
            Color::Rgba { r, g, b, a } => [
                f64::from(r) / 255.0,
                f64::from(g) / 255.0,
                f64::from(b) / 255.0,
                a.clamp(0.0, 1.0),
            ],
            Color::Hsl { h, s, l } => {
                let [r, g, b] = hsl_to_rgb(h, s / 100.0, l / 100.0);
                [r, g, b, 1.0]
            }
        }
    }
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [f64; 3] {
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let h = h.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    [r + m, g + m, b + m]
}

/// A color stop of a radial gradient; `offset` runs 0 (center) to 1 (rim).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f64, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Backend-agnostic 2D drawing target.
pub trait DrawingSurface {
    fn set_global_alpha(&mut self, alpha: f64);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color);
    fn fill_circle(&mut self, center: Point, radius: f64, color: Color);
    fn fill_polygon(&mut self, points: &[Point], color: Color);
    fn fill_radial_gradient(&mut self, center: Point, radius: f64, stops: &[GradientStop]);
    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Color);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f64, dy: f64);
    fn rotate(&mut self, radians: f64);
}

/// Which primitive a recorded command used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawKind {
    Rect,
    Circle,
    Polygon,
    RadialGradient,
    Line,
}

/// One recorded fill or stroke, with the global alpha in force.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub kind: DrawKind,
    pub alpha: f64,
    /// Representative point in the current (untransformed) coordinates.
    pub anchor: Point,
    /// Radius for circles/gradients, width for lines and rects.
    pub extent: f64,
}

/// Drawing surface that records commands instead of producing pixels.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    alpha: f64,
    stack: Vec<f64>,
    max_depth: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            alpha: 1.0,
            stack: Vec::new(),
            max_depth: 0,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn count(&self, kind: DrawKind) -> usize {
        self.commands.iter().filter(|c| c.kind == kind).count()
    }

    /// Unmatched `save` calls outstanding.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn global_alpha(&self) -> f64 {
        self.alpha
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    fn record(&mut self, kind: DrawKind, anchor: Point, extent: f64) {
        self.commands.push(DrawCommand {
            kind,
            alpha: self.alpha,
            anchor,
            extent,
        });
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingSurface for RecordingSurface {
    fn set_global_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, _height: f64, _color: Color) {
        self.record(DrawKind::Rect, Point::new(x, y), width);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, _color: Color) {
        self.record(DrawKind::Circle, center, radius);
    }

    fn fill_polygon(&mut self, points: &[Point], _color: Color) {
        let anchor = points.first().copied().unwrap_or_default();
        self.record(DrawKind::Polygon, anchor, points.len() as f64);
    }

    fn fill_radial_gradient(&mut self, center: Point, radius: f64, _stops: &[GradientStop]) {
        self.record(DrawKind::RadialGradient, center, radius);
    }

    fn stroke_line(&mut self, from: Point, _to: Point, width: f64, _color: Color) {
        self.record(DrawKind::Line, from, width);
    }

    fn save(&mut self) {
        self.stack.push(self.alpha);
        self.max_depth = self.max_depth.max(self.stack.len());
    }

    fn restore(&mut self) {
        if let Some(alpha) = self.stack.pop() {
            self.alpha = alpha;
        }
    }

    fn translate(&mut self, _dx: f64, _dy: f64) {}

    fn rotate(&mut self, _radians: f64) {}
}
