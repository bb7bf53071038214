//! Software [`DrawingSurface`] backend on `tiny-skia`.
//!
//! Surface units are multiplied by the device pixel ratio, so a 400x300
//! surface at ratio 2 owns an 800x600 pixmap. Global alpha is folded into
//! each paint color; `save`/`restore` push and pop the transform together
//! with it.

use std::fmt;

use tiny_skia::{
    FillRule, LineCap, Paint, PathBuilder, Pixmap, RadialGradient, Rect, SpreadMode, Stroke,
    Transform,
};

use crate::surface::{Color, DrawingSurface, GradientStop};
use crate::vector::Point;

#[derive(Clone, Copy, Debug)]
struct State {
    transform: Transform,
    alpha: f64,
}

/// An in-memory raster target.
#[derive(Clone)]
pub struct RasterSurface {
    pixmap: Option<Pixmap>,
    state: State,
    stack: Vec<State>,
}

impl RasterSurface {
    /// A surface of `width`x`height` surface units at `pixel_ratio` pixels
    /// per unit, cleared to `background`. A surface with no pixels accepts
    /// every call and draws nothing.
    pub fn new(width: f64, height: f64, pixel_ratio: f64, background: Color) -> Self {
        let ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        let px_w = (width.max(0.0) * ratio).round() as u32;
        let px_h = (height.max(0.0) * ratio).round() as u32;
        let mut pixmap = Pixmap::new(px_w, px_h);
        if let Some(pixmap) = pixmap.as_mut() {
            pixmap.fill(skia_color(background, 1.0));
        }
        Self {
            pixmap,
            state: State {
                transform: Transform::from_scale(ratio as f32, ratio as f32),
                alpha: 1.0,
            },
            stack: Vec::new(),
        }
    }

    pub fn pixel_width(&self) -> usize {
        self.pixmap.as_ref().map_or(0, |p| p.width() as usize)
    }

    pub fn pixel_height(&self) -> usize {
        self.pixmap.as_ref().map_or(0, |p| p.height() as usize)
    }

    /// Pixel at `(x, y)` as 8-bit straight RGB.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        let pixmap = self.pixmap.as_ref()?;
        let px = pixmap
            .pixel(u32::try_from(x).ok()?, u32::try_from(y).ok()?)?
            .demultiply();
        Some([px.red(), px.green(), px.blue()])
    }

    /// Encode as a binary PPM (P6).
    pub fn to_ppm(&self) -> Vec<u8> {
        let (w, h) = (self.pixel_width(), self.pixel_height());
        let header = format!("P6\n{w} {h}\n255\n");
        let mut out = Vec::with_capacity(header.len() + w * h * 3);
        out.extend_from_slice(header.as_bytes());
        if let Some(pixmap) = self.pixmap.as_ref() {
            for px in pixmap.pixels() {
                let c = px.demultiply();
                out.extend_from_slice(&[c.red(), c.green(), c.blue()]);
            }
        }
        out
    }

    /// Encode as PNG. `None` for an empty surface or an encoder failure.
    pub fn to_png(&self) -> Option<Vec<u8>> {
        self.pixmap.as_ref()?.encode_png().ok()
    }

    fn paint(&self, color: Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(skia_color(color, self.state.alpha));
        paint.anti_alias = true;
        paint
    }
}

impl fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.pixel_width())
            .field("height", &self.pixel_height())
            .field("alpha", &self.state.alpha)
            .field("depth", &self.stack.len())
            .finish()
    }
}

fn skia_color(color: Color, global_alpha: f64) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_linear_rgba();
    let a = (a * global_alpha).clamp(0.0, 1.0);
    tiny_skia::Color::from_rgba(r as f32, g as f32, b as f32, a as f32)
        .unwrap_or(tiny_skia::Color::TRANSPARENT)
}

impl DrawingSurface for RasterSurface {
    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.alpha = if alpha.is_nan() {
            0.0
        } else {
            alpha.clamp(0.0, 1.0)
        };
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        let Some(rect) = Rect::from_xywh(x as f32, y as f32, width as f32, height as f32) else {
            return;
        };
        let paint = self.paint(color);
        let transform = self.state.transform;
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill_rect(rect, &paint, transform, None);
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        if radius.is_nan() || radius <= 0.0 {
            return;
        }
        let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32)
        else {
            return;
        };
        let paint = self.paint(color);
        let transform = self.state.transform;
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        let [first, rest @ ..] = points else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(first.x as f32, first.y as f32);
        for p in rest {
            pb.line_to(p.x as f32, p.y as f32);
        }
        pb.close();
        let Some(path) = pb.finish() else {
            return;
        };
        let paint = self.paint(color);
        let transform = self.state.transform;
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }
    }

    fn fill_radial_gradient(&mut self, center: Point, radius: f64, stops: &[GradientStop]) {
        if radius.is_nan() || radius <= 0.0 {
            return;
        }
        let c = tiny_skia::Point::from_xy(center.x as f32, center.y as f32);
        let alpha = self.state.alpha;
        let skia_stops = stops
            .iter()
            .map(|s| tiny_skia::GradientStop::new(s.offset as f32, skia_color(s.color, alpha)))
            .collect();
        let Some(shader) = RadialGradient::new(
            c,
            c,
            radius as f32,
            skia_stops,
            SpreadMode::Pad,
            Transform::identity(),
        ) else {
            return;
        };
        let Some(path) = PathBuilder::from_circle(c.x, c.y, radius as f32) else {
            return;
        };

        let mut paint = Paint::default();
        paint.shader = shader;
        paint.anti_alias = true;
        let transform = self.state.transform;
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Color) {
        if width.is_nan() || width <= 0.0 {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        let Some(path) = pb.finish() else {
            return;
        };
        let stroke = Stroke {
            width: width as f32,
            line_cap: LineCap::Round,
            ..Default::default()
        };
        let paint = self.paint(color);
        let transform = self.state.transform;
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.stroke_path(&path, &paint, &stroke, transform, None);
        }
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.state.transform = self.state.transform.pre_translate(dx as f32, dy as f32);
    }

    fn rotate(&mut self, radians: f64) {
        self.state.transform = self
            .state
            .transform
            .pre_rotate(radians.to_degrees() as f32);
    }
}
