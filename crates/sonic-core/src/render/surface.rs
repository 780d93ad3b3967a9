//! Drawing seam shared by the canvas (web) and raster (native) targets.

use glam::Vec2;

/// Straight (non-premultiplied) colour, every channel in [0,1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Channels given on the 0..=255 scale.
    pub fn from_255(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::new(r / 255.0, g / 255.0, b / 255.0, (a / 255.0).clamp(0.0, 1.0))
    }

    /// An 8-bit colour with an alpha on the 0..=255 scale.
    pub fn rgb8(rgb: [u8; 3], alpha_255: f32) -> Self {
        Self::from_255(rgb[0] as f32, rgb[1] as f32, rgb[2] as f32, alpha_255)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba()` notation.
    pub fn to_css(self) -> String {
        format!(
            "rgba({},{},{},{:.4})",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            self.a.clamp(0.0, 1.0)
        )
    }
}

pub trait Surface {
    /// Size in pixels.
    fn size(&self) -> (u32, u32);

    /// Make every pixel fully transparent.
    fn clear(&mut self);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba);

    fn fill_round_rect(&mut self, x: f32, y: f32, w: f32, h: f32, _radius: f32, color: Rgba) {
        self.fill_rect(x, y, w, h, color);
    }

    fn stroke_line(&mut self, a: Vec2, b: Vec2, color: Rgba, width: f32);

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgba, width: f32);

    /// Fill a convex polygon.
    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba);

    /// Left-aligned text whose baseline sits at `y`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, size_px: f32, color: Rgba);

    fn text_width(&self, text: &str, size_px: f32) -> f32;

    /// Composite `src` over this surface at `alpha`, blurred by `blur_px`
    /// (0 for none).
    fn draw_surface(&mut self, src: &Self, alpha: f32, blur_px: f32)
    where
        Self: Sized;

    fn width(&self) -> f32 {
        self.size().0 as f32
    }

    fn height(&self) -> f32 {
        self.size().1 as f32
    }
}
