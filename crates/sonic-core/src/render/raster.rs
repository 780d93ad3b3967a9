//! CPU implementation of [`Surface`], used by the native front-end.
//!
//! Pixels are stored premultiplied so source-over and blur are plain linear
//! operations. Lines and outlines are single-sample (no anti-aliasing);
//! strokes thinner than a pixel scale their coverage instead. Text has no
//! glyphs here: `fill_text` draws nothing and widths are a monospace estimate.

use super::surface::{Rgba, Surface};
use glam::Vec2;

#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    px: Vec<[f32; 4]>,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            px: vec![[0.0; 4]; width as usize * height as usize],
        }
    }

    /// Premultiplied pixel at `(x, y)`, if inside.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        (x < self.width && y < self.height).then(|| self.px[self.index(x, y)])
    }

    /// Sum of alpha over all pixels, handy for coverage checks.
    pub fn total_alpha(&self) -> f32 {
        self.px.iter().map(|p| p[3]).sum()
    }

    /// Unpremultiplied 8-bit RGBA, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.px.len() * 4);
        for p in &self.px {
            let a = p[3].clamp(0.0, 1.0);
            let un = |c: f32| {
                if a > 0.0 {
                    ((c / a).clamp(0.0, 1.0) * 255.0).round() as u8
                } else {
                    0
                }
            };
            out.extend_from_slice(&[un(p[0]), un(p[1]), un(p[2]), (a * 255.0).round() as u8]);
        }
        out
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    fn blend_px(&mut self, x: i64, y: i64, color: Rgba, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let a = (color.a * coverage).clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let i = self.index(x as u32, y as u32);
        let d = &mut self.px[i];
        let keep = 1.0 - a;
        d[0] = color.r * a + d[0] * keep;
        d[1] = color.g * a + d[1] * keep;
        d[2] = color.b * a + d[2] * keep;
        d[3] = a + d[3] * keep;
    }

    /// Square brush of side `width` (at least one pixel) centred on `p`.
    fn stamp(&mut self, p: Vec2, color: Rgba, width: f32) {
        let coverage = width.min(1.0);
        let side = width.round().max(1.0) as i64;
        let x0 = p.x.round() as i64 - side / 2;
        let y0 = p.y.round() as i64 - side / 2;
        for dy in 0..side {
            for dx in 0..side {
                self.blend_px(x0 + dx, y0 + dy, color, coverage);
            }
        }
    }

    /// Walk `points`, stamping each distinct pixel once.
    fn stamp_path(&mut self, points: impl Iterator<Item = Vec2>, color: Rgba, width: f32) {
        let mut last: Option<(i64, i64)> = None;
        for p in points {
            let key = (p.x.round() as i64, p.y.round() as i64);
            if last == Some(key) {
                continue;
            }
            last = Some(key);
            self.stamp(p, color, width);
        }
    }

    fn box_blur(&mut self, radius: usize) {
        if radius == 0 {
            return;
        }
        let w = self.width as usize;
        let h = self.height as usize;
        let mut tmp = vec![[0.0f32; 4]; self.px.len()];
        blur_lines(&self.px, &mut tmp, h, w, 1, w, radius);
        blur_lines(&tmp, &mut self.px, w, h, w, 1, radius);
    }
}

/// One-dimensional running-sum box blur over `lines` lines of `len` pixels.
/// `step` is the stride between neighbours along a line, `line_stride`
/// between line starts. Edges are clamped.
fn blur_lines(
    src: &[[f32; 4]],
    dst: &mut [[f32; 4]],
    lines: usize,
    len: usize,
    step: usize,
    line_stride: usize,
    radius: usize,
) {
    if len == 0 {
        return;
    }
    let norm = 1.0 / (2 * radius + 1) as f32;
    let at = |line: usize, i: isize| {
        let i = i.clamp(0, len as isize - 1) as usize;
        line * line_stride + i * step
    };
    for line in 0..lines {
        let mut acc = [0.0f32; 4];
        for i in -(radius as isize)..=(radius as isize) {
            let p = src[at(line, i)];
            for c in 0..4 {
                acc[c] += p[c];
            }
        }
        for i in 0..len as isize {
            let out = &mut dst[at(line, i)];
            for c in 0..4 {
                out[c] = acc[c] * norm;
            }
            let add = src[at(line, i + radius as isize + 1)];
            let sub = src[at(line, i - radius as isize)];
            for c in 0..4 {
                acc[c] += add[c] - sub[c];
            }
        }
    }
}

impl Surface for Raster {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.px.fill([0.0; 4]);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        let x0 = x.max(0.0).round() as i64;
        let y0 = y.max(0.0).round() as i64;
        let x1 = (x + w).min(self.width as f32).round() as i64;
        let y1 = (y + h).min(self.height as f32).round() as i64;
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_px(px, py, color, 1.0);
            }
        }
    }

    fn stroke_line(&mut self, a: Vec2, b: Vec2, color: Rgba, width: f32) {
        let steps = (b - a).abs().max_element().ceil().max(1.0) as usize;
        let points = (0..=steps).map(|i| a.lerp(b, i as f32 / steps as f32));
        self.stamp_path(points, color, width);
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgba, width: f32) {
        if radius <= 0.0 {
            return;
        }
        let steps = (std::f32::consts::TAU * radius).ceil().max(8.0) as usize;
        let points = (0..steps).map(|i| {
            let th = i as f32 / steps as f32 * std::f32::consts::TAU;
            center + Vec2::new(th.cos(), th.sin()) * radius
        });
        self.stamp_path(points, color, width);
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba) {
        if points.len() < 3 {
            return;
        }
        let (mut lo, mut hi) = (points[0], points[0]);
        for p in points {
            lo = lo.min(*p);
            hi = hi.max(*p);
        }
        let n = points.len();
        let inside = |q: Vec2| {
            let mut sign = 0.0f32;
            for i in 0..n {
                let a = points[i];
                let b = points[(i + 1) % n];
                let cross = (b - a).perp_dot(q - a);
                if cross != 0.0 {
                    if sign != 0.0 && cross.signum() != sign {
                        return false;
                    }
                    sign = cross.signum();
                }
            }
            true
        };
        for y in lo.y.floor() as i64..=hi.y.ceil() as i64 {
            for x in lo.x.floor() as i64..=hi.x.ceil() as i64 {
                if inside(Vec2::new(x as f32 + 0.5, y as f32 + 0.5)) {
                    self.blend_px(x, y, color, 1.0);
                }
            }
        }
    }

    fn fill_text(&mut self, _text: &str, _x: f32, _y: f32, _size_px: f32, _color: Rgba) {}

    fn text_width(&self, text: &str, size_px: f32) -> f32 {
        text.chars().count() as f32 * size_px * 0.6
    }

    fn draw_surface(&mut self, src: &Self, alpha: f32, blur_px: f32) {
        if src.width != self.width || src.height != self.height {
            log::warn!(
                "[raster] size mismatch {}x{} onto {}x{}",
                src.width,
                src.height,
                self.width,
                self.height
            );
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let blurred;
        let source = if blur_px > 0.0 {
            let mut copy = src.clone();
            // two box passes approximate a gaussian of the requested radius
            let r = (blur_px * 0.5).round() as usize;
            copy.box_blur(r);
            copy.box_blur(r);
            blurred = copy;
            &blurred
        } else {
            src
        };
        for (d, s) in self.px.iter_mut().zip(&source.px) {
            let sa = s[3] * alpha;
            if sa <= 0.0 {
                continue;
            }
            let keep = 1.0 - sa;
            for c in 0..3 {
                d[c] = s[c] * alpha + d[c] * keep;
            }
            d[3] = sa + d[3] * keep;
        }
    }
}
