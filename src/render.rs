use crate::constants::FONT_FAMILY;
use crate::dom;
use glam::Vec2;
use sonic_core::render::{Rgba, Surface};
use std::f64::consts::TAU;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Canvas 2D implementation of [`Surface`]. The screen and both offscreen
/// buffers are all `CanvasSurface`s; offscreen ones are never attached to
/// the document.
pub struct CanvasSurface {
    canvas: web::HtmlCanvasElement,
    ctx: web::CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| anyhow::anyhow!("get_context failed: {:?}", e))?
            .ok_or_else(|| anyhow::anyhow!("2d context unavailable"))?
            .dyn_into::<web::CanvasRenderingContext2d>()
            .map_err(|e| anyhow::anyhow!("not a 2d context: {:?}", e))?;
        ctx.set_line_cap("round");
        Ok(Self { canvas, ctx })
    }

    /// Detached canvas of the given backing size.
    pub fn offscreen(document: &web::Document, width: u32, height: u32) -> anyhow::Result<Self> {
        let canvas = dom::create_canvas(document)?;
        canvas.set_width(width.max(1));
        canvas.set_height(height.max(1));
        Self::new(canvas)
    }

    pub fn canvas(&self) -> &web::HtmlCanvasElement {
        &self.canvas
    }

    fn set_font(&self, size_px: f32) {
        self.ctx.set_font(&format!("{size_px}px {FONT_FAMILY}"));
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn fill_round_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Rgba) {
        let (x, y, w, h) = (x as f64, y as f64, w as f64, h as f64);
        let r = (radius as f64).min(w * 0.5).min(h * 0.5).max(0.0);
        let c = &self.ctx;
        c.begin_path();
        c.move_to(x + r, y);
        _ = c.arc_to(x + w, y, x + w, y + h, r);
        _ = c.arc_to(x + w, y + h, x, y + h, r);
        _ = c.arc_to(x, y + h, x, y, r);
        _ = c.arc_to(x, y, x + w, y, r);
        c.close_path();
        c.set_fill_style_str(&color.to_css());
        c.fill();
    }

    fn stroke_line(&mut self, a: Vec2, b: Vec2, color: Rgba, width: f32) {
        let c = &self.ctx;
        c.begin_path();
        c.move_to(a.x as f64, a.y as f64);
        c.line_to(b.x as f64, b.y as f64);
        c.set_line_width(width as f64);
        c.set_stroke_style_str(&color.to_css());
        c.stroke();
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgba, width: f32) {
        if radius <= 0.0 {
            return;
        }
        let c = &self.ctx;
        c.begin_path();
        _ = c.arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU);
        c.set_line_width(width as f64);
        c.set_stroke_style_str(&color.to_css());
        c.stroke();
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let c = &self.ctx;
        c.begin_path();
        c.move_to(first.x as f64, first.y as f64);
        for p in rest {
            c.line_to(p.x as f64, p.y as f64);
        }
        c.close_path();
        c.set_fill_style_str(&color.to_css());
        c.fill();
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size_px: f32, color: Rgba) {
        self.set_font(size_px);
        self.ctx.set_text_baseline("alphabetic");
        self.ctx.set_fill_style_str(&color.to_css());
        _ = self.ctx.fill_text(text, x as f64, y as f64);
    }

    fn text_width(&self, text: &str, size_px: f32) -> f32 {
        self.set_font(size_px);
        match self.ctx.measure_text(text) {
            Ok(m) => m.width() as f32,
            Err(_) => text.chars().count() as f32 * size_px * 0.6,
        }
    }

    fn draw_surface(&mut self, src: &Self, alpha: f32, blur_px: f32) {
        let c = &self.ctx;
        c.save();
        c.set_global_alpha(alpha.clamp(0.0, 1.0) as f64);
        if blur_px > 0.0 {
            c.set_filter(&format!("blur({blur_px}px)"));
        }
        _ = c.draw_image_with_html_canvas_element(&src.canvas, 0.0, 0.0);
        c.restore();
    }
}
